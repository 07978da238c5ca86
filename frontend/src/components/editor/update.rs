//! Message handling for the guide editor.

use common::model::favourite::Favourite;
use common::model::guide::ImageView;
use common::model::section::SectionContent;
use common::router::{Action, EditorTarget};
use common::template::build_write_shape;
use gloo_console::{error, log};
use yew::platform::spawn_local;
use yew::prelude::*;

use super::helpers::{image_folder, set_favourite_field, upload_file};
use super::messages::{Msg, PropertyField};
use super::state::{EditorComponent, LoadStatus, UploadTarget};
use crate::helpers::show_toast;

pub fn update(component: &mut EditorComponent, ctx: &Context<EditorComponent>, msg: Msg) -> bool {
    match msg {
        Msg::Loaded(Ok(Some((draft, groups)))) => {
            component.reset(draft, groups);
            true
        }
        Msg::Loaded(Ok(None)) => {
            component.status = LoadStatus::NotFound;
            true
        }
        Msg::Loaded(Err(e)) => {
            error!(format!("could not load guide: {}", e));
            component.status = LoadStatus::Failed(e);
            true
        }

        Msg::SetProperty(field, value) => {
            match field {
                PropertyField::Title => component.draft.title = value,
                PropertyField::Slug => component.draft.slug = value,
                PropertyField::WelcomeMessage => component.draft.welcome_message = value,
            }
            component.touch();
            true
        }
        Msg::SetSectionTitle(at, value) => {
            if let Some(card) = component.card_mut(at) {
                card.title = value;
            }
            component.touch();
            true
        }
        Msg::SetSectionContent(at, value) => {
            if let Some(card) = component.card_mut(at) {
                if let SectionContent::RichText(text) = &mut card.content {
                    *text = value;
                }
            }
            component.touch();
            true
        }
        Msg::TogglePreview(at) => {
            if !component.previews.remove(&at) {
                component.previews.insert(at);
            }
            true
        }

        Msg::AddFavourite => {
            if let Some(list) = component.favourites_mut() {
                list.push(Favourite::default());
            }
            component.touch();
            true
        }
        Msg::RemoveFavourite(index) => {
            if let Some(list) = component.favourites_mut() {
                if index < list.len() {
                    list.remove(index);
                }
            }
            component.touch();
            true
        }
        Msg::SetFavourite(index, field, value) => {
            if let Some(favourite) = component.favourites_mut().and_then(|l| l.get_mut(index)) {
                set_favourite_field(favourite, field, value);
            }
            component.touch();
            true
        }

        Msg::Upload(target, file) => {
            if component.uploading.contains(&target) {
                return false;
            }
            component.uploading.insert(target);
            component.upload_errors.remove(&target);

            let storage = ctx.props().services.storage.clone();
            let folder = image_folder(&component.draft);
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = upload_file(storage.as_ref(), &folder, file).await;
                link.send_message(Msg::Uploaded(target, result));
            });
            true
        }
        Msg::Uploaded(target, result) => {
            component.uploading.remove(&target);
            match result {
                Ok(url) => match target {
                    UploadTarget::Hero => component.draft.hero_image_url = url,
                    UploadTarget::Section(at) => {
                        if let Some(card) = component.card_mut(at) {
                            if !card.images.iter().any(|img| img.image_url == url) {
                                card.images.push(ImageView {
                                    id: None,
                                    image_url: url,
                                    caption: String::new(),
                                });
                            }
                        }
                    }
                },
                Err(e) => {
                    error!(format!("upload failed: {}", e));
                    component.upload_errors.insert(target, e);
                }
            }
            component.touch();
            true
        }
        Msg::SetImageCaption(at, image, value) => {
            if let Some(img) = component.card_mut(at).and_then(|c| c.images.get_mut(image)) {
                img.caption = value;
            }
            component.touch();
            true
        }
        Msg::RemoveImage(at, image) => {
            if let Some(card) = component.card_mut(at) {
                if image < card.images.len() {
                    card.images.remove(image);
                }
            }
            component.touch();
            true
        }
        Msg::ClearHero => {
            component.draft.hero_image_url.clear();
            component.touch();
            true
        }

        Msg::Save => {
            if component.saving || component.status != LoadStatus::Ready {
                return false;
            }
            let guide = match build_write_shape(&component.draft, &component.groups) {
                Ok(guide) => guide,
                Err(e) => {
                    show_toast(&format!("Cannot save: {}", e));
                    return false;
                }
            };
            component.saving = true;
            component.in_flight = Some((component.draft.clone(), component.groups.clone()));

            let services = ctx.props().services.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = services.save(&guide).await;
                link.send_message(Msg::Saved(result));
            });
            true
        }
        Msg::Saved(Ok(report)) => {
            component.saving = false;
            component.finish_save(&report);
            log!(format!(
                "saved guide {} ({} images written, {} removed)",
                report.property.slug, report.images_written, report.images_deleted
            ));
            show_toast("Guide saved.");

            let moved = match &ctx.props().target {
                EditorTarget::New => true,
                EditorTarget::Existing(slug) => *slug != report.property.slug,
            };
            if moved {
                ctx.props()
                    .on_navigate
                    .emit(Action::EditProperty(report.property.slug));
            }
            true
        }
        Msg::Saved(Err(e)) => {
            component.saving = false;
            component.in_flight = None;
            error!(format!("save failed: {}", e));
            show_toast(&format!("Save failed: {}", e));
            true
        }

        Msg::Back => {
            if component.is_dirty() && !confirm_discard() {
                return false;
            }
            ctx.props().on_navigate.emit(Action::BackToDashboard);
            false
        }
        Msg::ViewGuide => {
            if component.is_dirty() && !confirm_discard() {
                return false;
            }
            ctx.props()
                .on_navigate
                .emit(Action::SelectProperty(component.draft.slug.clone()));
            false
        }
    }
}

fn confirm_discard() -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message("Discard unsaved changes?").ok())
        .unwrap_or(true)
}
