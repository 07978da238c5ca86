use common::model::guide::GroupView;
use common::model::property::PropertyDraft;
use common::save::SaveReport;

use super::state::UploadTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Title,
    Slug,
    WelcomeMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteField {
    Name,
    Description,
    Url,
    Category,
    Latitude,
    Longitude,
}

/// A card is addressed by its group index and its index within the group.
pub type CardIndex = (usize, usize);

pub enum Msg {
    /// `Ok(None)` means the slug has no property.
    Loaded(Result<Option<(PropertyDraft, Vec<GroupView>)>, String>),

    SetProperty(PropertyField, String),
    SetSectionTitle(CardIndex, String),
    SetSectionContent(CardIndex, String),
    TogglePreview(CardIndex),

    AddFavourite,
    RemoveFavourite(usize),
    SetFavourite(usize, FavouriteField, String),

    Upload(UploadTarget, web_sys::File),
    Uploaded(UploadTarget, Result<String, String>),
    SetImageCaption(CardIndex, usize, String),
    RemoveImage(CardIndex, usize),
    ClearHero,

    Save,
    Saved(Result<SaveReport, String>),

    Back,
    ViewGuide,
}
