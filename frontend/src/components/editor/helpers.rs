//! Pure helpers for the editor's update logic, plus the upload pipeline.

use common::gateway::ObjectStorage;
use common::model::favourite::Favourite;
use common::model::guide::GroupView;
use common::model::property::PropertyDraft;
use common::model::section::SectionContent;
use common::save::SaveReport;
use common::template::resolve_slug;
use gloo_file::futures::read_as_bytes;
use gloo_file::Blob;

use super::messages::FavouriteField;
use crate::helpers::{fingerprint, upload_path};

/// The favourites list of the guide, wherever the template put its card.
pub fn favourites_of(groups: &mut [GroupView]) -> Option<&mut Vec<Favourite>> {
    groups
        .iter_mut()
        .flat_map(|g| g.items.iter_mut())
        .find_map(|card| match &mut card.content {
            SectionContent::Favourites(list) => Some(list),
            SectionContent::RichText(_) => None,
        })
}

/// Copies the ids a save assigned back onto the cards. `ids` follows the
/// write shape's section order: every card in group order, favourites
/// card excluded.
pub fn assign_section_ids(groups: &mut [GroupView], ids: &[String]) {
    let cards = groups
        .iter_mut()
        .flat_map(|g| g.items.iter_mut())
        .filter(|card| !card.content.is_favourites());
    for (card, id) in cards.zip(ids) {
        card.id = Some(id.clone());
    }
}

/// Editor content as it was sent to a save.
pub type SavedContent = (PropertyDraft, Vec<GroupView>);

/// Copies a finished save's identities onto the live content and returns
/// the fingerprint of what was actually saved. Edits made while the save
/// was in flight keep the live content dirty. A slug edited in that window
/// is kept as typed.
pub fn settle_save(
    draft: &mut PropertyDraft,
    groups: &mut [GroupView],
    sent: Option<SavedContent>,
    report: &SaveReport,
) -> String {
    let (mut sent_draft, mut sent_groups) =
        sent.unwrap_or_else(|| (draft.clone(), groups.to_vec()));
    let slug_untouched = draft.slug == sent_draft.slug;

    for (copy, cards) in [
        (&mut sent_draft, &mut sent_groups[..]),
        (&mut *draft, &mut *groups),
    ] {
        copy.id = Some(report.property.id.clone());
        assign_section_ids(cards, &report.section_ids);
    }
    sent_draft.slug = report.property.slug.clone();
    if slug_untouched {
        draft.slug = report.property.slug.clone();
    }
    fingerprint(&(&sent_draft, &sent_groups))
}

/// Folder uploaded images of this property are stored under. Matches the
/// slug the next save will write.
pub fn image_folder(draft: &PropertyDraft) -> String {
    resolve_slug(draft)
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses a typed coordinate. Blank or unparsable input clears it.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn set_favourite_field(favourite: &mut Favourite, field: FavouriteField, value: String) {
    match field {
        FavouriteField::Name => favourite.name = value,
        FavouriteField::Description => favourite.description = value,
        FavouriteField::Url => favourite.url = optional(value),
        FavouriteField::Category => favourite.category = optional(value),
        FavouriteField::Latitude => favourite.latitude = parse_coordinate(&value),
        FavouriteField::Longitude => favourite.longitude = parse_coordinate(&value),
    }
}

/// Reads a picked file and uploads it. Returns the public URL.
pub async fn upload_file(
    storage: &dyn ObjectStorage,
    folder: &str,
    file: web_sys::File,
) -> Result<String, String> {
    let content_type = file.type_();
    if !content_type.starts_with("image/") {
        return Err("Only image files can be uploaded.".to_string());
    }
    let name = file.name();
    let blob = Blob::from(file);
    let bytes = read_as_bytes(&blob)
        .await
        .map_err(|e| format!("could not read {}: {}", name, e))?;
    let path = upload_path(folder, &name, &bytes);
    storage
        .upload(&path, bytes, &content_type)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::guide::SectionCard;
    use common::template::derive_slug;

    fn card(title: &str, content: SectionContent) -> SectionCard {
        SectionCard {
            id: None,
            title: title.to_string(),
            icon_name: String::new(),
            content,
            images: Vec::new(),
        }
    }

    fn groups() -> Vec<GroupView> {
        vec![
            GroupView {
                group: "Arrival".to_string(),
                items: vec![card("Welcome", SectionContent::RichText(String::new()))],
            },
            GroupView {
                group: "Local Area".to_string(),
                items: vec![
                    card("Local Favourites", SectionContent::Favourites(Vec::new())),
                    card("Transport", SectionContent::RichText(String::new())),
                ],
            },
        ]
    }

    #[test]
    fn section_ids_skip_the_favourites_card() {
        let mut groups = groups();
        assign_section_ids(&mut groups, &["s1".to_string(), "s2".to_string()]);
        assert_eq!(groups[0].items[0].id.as_deref(), Some("s1"));
        assert_eq!(groups[1].items[0].id, None);
        assert_eq!(groups[1].items[1].id.as_deref(), Some("s2"));
    }

    #[test]
    fn favourites_are_found_in_any_group() {
        let mut groups = groups();
        favourites_of(&mut groups).unwrap().push(Favourite {
            name: "Bakery".to_string(),
            ..Favourite::default()
        });
        match &groups[1].items[0].content {
            SectionContent::Favourites(list) => assert_eq!(list[0].name, "Bakery"),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn favourite_fields_normalise_blank_and_numeric_input() {
        let mut favourite = Favourite::default();
        set_favourite_field(&mut favourite, FavouriteField::Url, "  ".to_string());
        set_favourite_field(&mut favourite, FavouriteField::Category, " food ".to_string());
        set_favourite_field(&mut favourite, FavouriteField::Latitude, "43,5".to_string());
        set_favourite_field(&mut favourite, FavouriteField::Longitude, "east".to_string());
        assert_eq!(favourite.url, None);
        assert_eq!(favourite.category.as_deref(), Some("food"));
        assert_eq!(favourite.latitude, Some(43.5));
        assert_eq!(favourite.longitude, None);
    }

    #[test]
    fn image_folder_falls_back_to_title() {
        let mut draft = PropertyDraft {
            title: "Sea View Flat".to_string(),
            ..PropertyDraft::default()
        };
        assert_eq!(image_folder(&draft), derive_slug("Sea View Flat"));
        draft.slug = "sea-view".to_string();
        assert_eq!(image_folder(&draft), "sea-view");
    }

    fn report(slug: &str) -> SaveReport {
        SaveReport {
            property: common::model::property::Property {
                id: "p1".to_string(),
                title: "Sea View Flat".to_string(),
                slug: slug.to_string(),
                welcome_message: String::new(),
                hero_image_url: String::new(),
                owner_id: "u1".to_string(),
                created_at: String::new(),
            },
            section_ids: vec!["s1".to_string(), "s2".to_string()],
            images_deleted: 0,
            images_written: 0,
            favourites_written: 0,
        }
    }

    #[test]
    fn settled_save_without_later_edits_is_clean() {
        let mut draft = PropertyDraft {
            title: "Sea View Flat".to_string(),
            ..PropertyDraft::default()
        };
        let mut groups = groups();
        let sent = (draft.clone(), groups.clone());

        let saved = settle_save(&mut draft, &mut groups, Some(sent), &report("sea-view-flat"));

        assert_eq!(draft.id.as_deref(), Some("p1"));
        assert_eq!(draft.slug, "sea-view-flat");
        assert_eq!(groups[1].items[1].id.as_deref(), Some("s2"));
        assert_eq!(saved, fingerprint(&(&draft, &groups)));
    }

    #[test]
    fn edits_during_a_save_stay_dirty() {
        let mut draft = PropertyDraft {
            title: "Sea View Flat".to_string(),
            ..PropertyDraft::default()
        };
        let mut groups = groups();
        let sent = (draft.clone(), groups.clone());
        draft.welcome_message = "Typed while saving".to_string();
        draft.slug = "harbour-flat".to_string();

        let saved = settle_save(&mut draft, &mut groups, Some(sent), &report("sea-view-flat"));

        assert_eq!(draft.id.as_deref(), Some("p1"));
        assert_eq!(draft.slug, "harbour-flat");
        assert_eq!(groups[0].items[0].id.as_deref(), Some("s1"));
        assert_ne!(saved, fingerprint(&(&draft, &groups)));
    }

    #[test]
    fn image_folder_normalises_a_typed_slug() {
        let draft = PropertyDraft {
            title: "Sea View Flat".to_string(),
            slug: "Sunny Condo".to_string(),
            ..PropertyDraft::default()
        };
        let folder = image_folder(&draft);
        assert_eq!(folder, derive_slug("Sunny Condo"));
        assert!(!folder.contains(' '));
    }
}
