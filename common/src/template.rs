//! Section template and the merge engine.
//!
//! Every guide exposes the same set of editable slots, whether or not rows
//! exist for them yet. [`merge_with_defaults`] lays stored rows over the
//! template to build the editor's view model, and [`build_write_shape`]
//! turns an edited view model back into the payloads the gateway writes.

use std::collections::{HashMap, HashSet};

use crate::error::MergeError;
use crate::model::favourite::{Favourite, FavouriteRow};
use crate::model::guide::{GroupView, ImageView, SectionCard};
use crate::model::image::ImageRow;
use crate::model::property::PropertyDraft;
use crate::model::section::{SectionContent, SectionRow};
use crate::requests::{GuideWrite, ImageWrite, PropertyPayload, SectionWrite};

/// URL segments the router reserves. A derived slug never equals one.
pub const RESERVED_SLUGS: [&str; 2] = ["editor", "login"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    RichText,
    Favourites,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSlot {
    pub title: &'static str,
    pub icon_name: &'static str,
    pub kind: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGroup {
    pub group: &'static str,
    pub slots: Vec<TemplateSlot>,
}

const fn text(title: &'static str, icon_name: &'static str) -> TemplateSlot {
    TemplateSlot {
        title,
        icon_name,
        kind: SlotKind::RichText,
    }
}

/// The canonical guide layout. "Main Details" has no slots; the editor puts
/// the property's own fields there.
pub fn default_template() -> Vec<TemplateGroup> {
    vec![
        TemplateGroup {
            group: "Main Details",
            slots: vec![],
        },
        TemplateGroup {
            group: "Arrival & Essentials",
            slots: vec![
                text("Welcome", "home"),
                text("Directions & Parking", "map"),
                text("Check-in & Check-out", "key"),
                text("Wi-Fi & Internet", "wifi"),
                text("House Rules", "book"),
                text("Safety Info", "shield"),
            ],
        },
        TemplateGroup {
            group: "About the Home",
            slots: vec![
                text("Appliances & Controls", "tools"),
                text("Kitchen & Dining", "utensils"),
                text("Laundry", "laundry"),
                text("Heating & Cooling", "thermo"),
                text("Outdoor Areas", "garden"),
            ],
        },
        TemplateGroup {
            group: "Local Guide & Help",
            slots: vec![
                TemplateSlot {
                    title: "Local Favourites",
                    icon_name: "pin",
                    kind: SlotKind::Favourites,
                },
                text("Emergency Contacts", "phone"),
            ],
        },
    ]
}

/// The view model of a guide with no stored rows.
pub fn empty_guide(template: &[TemplateGroup]) -> Result<Vec<GroupView>, MergeError> {
    merge_with_defaults(template, &[], &[], &[])
}

fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

fn validate_template(template: &[TemplateGroup]) -> Result<(), MergeError> {
    let mut favourites_slot: Option<&str> = None;
    for group in template {
        for slot in &group.slots {
            if slot.title.trim().is_empty() {
                return Err(MergeError::EmptyTemplateTitle {
                    group: group.group.to_string(),
                });
            }
            if slot.kind == SlotKind::Favourites {
                if let Some(first) = favourites_slot {
                    return Err(MergeError::DuplicateFavouritesSlot {
                        first: first.to_string(),
                        second: slot.title.to_string(),
                    });
                }
                favourites_slot = Some(slot.title);
            }
        }
    }
    Ok(())
}

fn project_section(row: &SectionRow, images: Option<&Vec<&ImageRow>>) -> SectionCard {
    SectionCard {
        id: Some(row.id.clone()),
        title: row.title.clone(),
        icon_name: row.icon_name.clone(),
        content: SectionContent::RichText(row.content.clone()),
        images: images
            .map(|list| {
                list.iter()
                    .map(|img| ImageView {
                        id: Some(img.id.clone()),
                        image_url: img.image_url.clone(),
                        caption: img.caption.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Lays stored rows over the template.
///
/// - The favourites slot receives `favourites` sorted by display order.
/// - Every other slot takes the first stored section, in display order, whose
///   trimmed lower-cased title equals the slot title and that no earlier slot
///   took. Slots without a match become empty placeholders.
/// - Stored sections no slot took are appended to the last group, in display
///   order, after its template cards.
///
/// Each stored section appears exactly once in the output.
pub fn merge_with_defaults(
    template: &[TemplateGroup],
    sections: &[SectionRow],
    images: &[ImageRow],
    favourites: &[FavouriteRow],
) -> Result<Vec<GroupView>, MergeError> {
    validate_template(template)?;

    let mut ordered_sections: Vec<&SectionRow> = sections.iter().collect();
    ordered_sections.sort_by_key(|s| s.display_order);

    let mut images_by_section: HashMap<&str, Vec<&ImageRow>> = HashMap::new();
    for image in images {
        images_by_section
            .entry(image.section_id.as_str())
            .or_default()
            .push(image);
    }
    for list in images_by_section.values_mut() {
        list.sort_by_key(|img| img.display_order);
    }

    let mut ordered_favourites: Vec<&FavouriteRow> = favourites.iter().collect();
    ordered_favourites.sort_by_key(|f| f.display_order);
    let favourite_entries: Vec<Favourite> = ordered_favourites
        .into_iter()
        .map(|row| row.favourite.clone())
        .collect();

    let mut consumed: HashSet<&str> = HashSet::new();
    let mut groups: Vec<GroupView> = Vec::with_capacity(template.len());

    for group in template {
        let mut items = Vec::with_capacity(group.slots.len());
        for slot in &group.slots {
            if slot.kind == SlotKind::Favourites {
                items.push(SectionCard {
                    id: None,
                    title: slot.title.to_string(),
                    icon_name: slot.icon_name.to_string(),
                    content: SectionContent::Favourites(favourite_entries.clone()),
                    images: vec![],
                });
                continue;
            }

            let key = title_key(slot.title);
            let matched = ordered_sections
                .iter()
                .find(|s| !consumed.contains(s.id.as_str()) && title_key(&s.title) == key);

            match matched {
                Some(row) => {
                    consumed.insert(row.id.as_str());
                    items.push(project_section(row, images_by_section.get(row.id.as_str())));
                }
                None => items.push(SectionCard {
                    id: None,
                    title: slot.title.to_string(),
                    icon_name: slot.icon_name.to_string(),
                    content: SectionContent::default(),
                    images: vec![],
                }),
            }
        }
        groups.push(GroupView {
            group: group.group.to_string(),
            items,
        });
    }

    let extras: Vec<SectionCard> = ordered_sections
        .iter()
        .filter(|s| !consumed.contains(s.id.as_str()))
        .map(|row| project_section(row, images_by_section.get(row.id.as_str())))
        .collect();

    if !extras.is_empty() {
        match groups.last_mut() {
            Some(last) => last.items.extend(extras),
            None => groups.push(GroupView {
                group: "More".to_string(),
                items: extras,
            }),
        }
    }

    Ok(groups)
}

/// Derives a URL slug from a title: lower-cased, non-alphanumeric characters
/// stripped.
///
/// Falls back to `property` when nothing is left, and suffixes `-guide` when
/// the result is a reserved router segment.
pub fn derive_slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if slug.is_empty() {
        "property".to_string()
    } else if RESERVED_SLUGS.contains(&slug.as_str()) {
        format!("{}-guide", slug)
    } else {
        slug
    }
}

/// Keeps an explicit slug as long as it is URL safe, otherwise derives one.
pub fn resolve_slug(property: &PropertyDraft) -> String {
    let explicit = property.slug.trim();
    let url_safe = !explicit.is_empty()
        && explicit
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !RESERVED_SLUGS.contains(&explicit);

    if url_safe {
        explicit.to_string()
    } else if explicit.is_empty() {
        derive_slug(&property.title)
    } else {
        derive_slug(explicit)
    }
}

/// Turns an edited view model into the gateway's write shape.
///
/// Sections are flattened across groups and numbered by their position in
/// that flat list; the guest view renders in this order. The favourites card
/// is left out of the section list and its entries are emitted on their own.
pub fn build_write_shape(
    property: &PropertyDraft,
    groups: &[GroupView],
) -> Result<GuideWrite, MergeError> {
    let mut sections = Vec::new();
    let mut favourites: Option<(&str, Vec<Favourite>)> = None;

    for group in groups {
        for (index, card) in group.items.iter().enumerate() {
            if card.title.trim().is_empty() {
                return Err(MergeError::MissingTitle {
                    group: group.group.clone(),
                    index,
                });
            }

            let content = match &card.content {
                SectionContent::Favourites(list) => {
                    if let Some((first, _)) = &favourites {
                        return Err(MergeError::DuplicateFavouritesList {
                            first: first.to_string(),
                            second: card.title.clone(),
                        });
                    }
                    favourites = Some((card.title.as_str(), list.clone()));
                    continue;
                }
                SectionContent::RichText(text) => text.clone(),
            };

            sections.push(SectionWrite {
                id: card.id.clone(),
                title: card.title.clone(),
                icon_name: card.icon_name.clone(),
                content,
                display_order: sections.len() as i64,
                images: card
                    .images
                    .iter()
                    .enumerate()
                    .map(|(position, img)| ImageWrite {
                        image_url: img.image_url.clone(),
                        caption: img.caption.clone(),
                        display_order: position as i64,
                    })
                    .collect(),
            });
        }
    }

    Ok(GuideWrite {
        property: PropertyPayload {
            id: property.id.clone(),
            title: property.title.clone(),
            slug: resolve_slug(property),
            welcome_message: property.welcome_message.clone(),
            hero_image_url: property.hero_image_url.clone(),
        },
        sections,
        favourites: favourites.map(|(_, list)| list).unwrap_or_default(),
    })
}
