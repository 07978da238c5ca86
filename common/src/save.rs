//! Save orchestration: one edited guide to a sequence of gateway writes.
//!
//! The steps run strictly in order because later ones need identities
//! produced by earlier ones:
//!
//! 1. upsert the property;
//! 2. upsert every section under the property id;
//! 3. per section, delete stored images whose URL is gone from the edited
//!    list, then upsert the current list with positional order;
//! 4. replace the property's favourites (delete all, insert the list).
//!
//! The first failure stops the sequence. Nothing written before it is
//! undone, so a failed save can leave stale or orphaned rows; callers must
//! tell the user. The backend's transactional save endpoint runs this same
//! function inside one database transaction.

use std::collections::HashSet;
use std::slice;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{SaveError, SaveStep};
use crate::gateway::Gateway;
use crate::model::favourite::FavouriteRow;
use crate::model::property::Property;
use crate::requests::{GuideWrite, ImagePayload, SectionPayload, SectionWrite};

/// What a completed save wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    pub property: Property,
    /// Section ids in the order of `GuideWrite::sections`.
    pub section_ids: Vec<String>,
    pub images_deleted: usize,
    pub images_written: usize,
    pub favourites_written: usize,
}

pub async fn save_guide<G>(gateway: &G, guide: &GuideWrite) -> Result<SaveReport, SaveError>
where
    G: Gateway + ?Sized,
{
    info!(
        "saving guide `{}` ({} sections, {} favourites)",
        guide.property.slug,
        guide.sections.len(),
        guide.favourites.len()
    );

    let property = gateway
        .upsert_property(&guide.property)
        .await
        .map_err(|e| SaveError::new(SaveStep::Property, e).with_detail(&guide.property.title))?;

    let mut section_ids = Vec::with_capacity(guide.sections.len());
    for section in &guide.sections {
        let payload = SectionPayload {
            id: section.id.clone(),
            property_id: property.id.clone(),
            title: section.title.clone(),
            icon_name: section.icon_name.clone(),
            content: section.content.clone(),
            display_order: section.display_order,
        };
        let row = gateway
            .upsert_section(&payload)
            .await
            .map_err(|e| SaveError::new(SaveStep::Section, e).with_detail(&section.title))?;
        section_ids.push(row.id);
    }

    let mut images_deleted = 0;
    let mut images_written = 0;
    for (section, section_id) in guide.sections.iter().zip(&section_ids) {
        let (deleted, written) = sync_images(gateway, section, section_id)
            .await
            .map_err(|e| SaveError::new(SaveStep::Images, e).with_detail(&section.title))?;
        images_deleted += deleted;
        images_written += written;
    }

    gateway
        .delete_favourites(&property.id)
        .await
        .map_err(|e| SaveError::new(SaveStep::Favourites, e))?;

    if !guide.favourites.is_empty() {
        let rows: Vec<FavouriteRow> = guide
            .favourites
            .iter()
            .enumerate()
            .map(|(position, favourite)| FavouriteRow {
                property_id: property.id.clone(),
                display_order: position as i64,
                favourite: favourite.clone(),
            })
            .collect();
        gateway
            .insert_favourites(&rows)
            .await
            .map_err(|e| SaveError::new(SaveStep::Favourites, e))?;
    }

    info!("saved guide `{}` as property {}", property.slug, property.id);
    Ok(SaveReport {
        property,
        section_ids,
        images_deleted,
        images_written,
        favourites_written: guide.favourites.len(),
    })
}

/// Diffs one section's image URLs against what is stored. Returns
/// `(deleted, written)`.
async fn sync_images<G>(
    gateway: &G,
    section: &SectionWrite,
    section_id: &str,
) -> Result<(usize, usize), crate::error::GatewayError>
where
    G: Gateway + ?Sized,
{
    let section_key = section_id.to_string();
    let stored = gateway.list_images(slice::from_ref(&section_key)).await?;

    let current: HashSet<&str> = section.images.iter().map(|i| i.image_url.as_str()).collect();
    let mut removed: Vec<String> = stored
        .iter()
        .filter(|row| !current.contains(row.image_url.as_str()))
        .map(|row| row.image_url.clone())
        .collect();
    removed.sort();
    removed.dedup();

    if !removed.is_empty() {
        debug!("section {}: removing {} images", section_id, removed.len());
        gateway.delete_images(section_id, &removed).await?;
    }

    if section.images.is_empty() {
        return Ok((removed.len(), 0));
    }

    let payloads: Vec<ImagePayload> = section
        .images
        .iter()
        .map(|image| ImagePayload {
            section_id: section_id.to_string(),
            image_url: image.image_url.clone(),
            caption: image.caption.clone(),
            display_order: image.display_order,
        })
        .collect();
    gateway.upsert_images(&payloads).await?;

    Ok((removed.len(), payloads.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::mock::{Call, MockGateway};
    use crate::model::favourite::Favourite;
    use crate::model::image::ImageRow;
    use crate::model::section::SectionRow;
    use crate::requests::{ImageWrite, PropertyPayload};

    fn property(id: Option<&str>) -> PropertyPayload {
        PropertyPayload {
            id: id.map(str::to_string),
            title: "Sunny Condo".into(),
            slug: "sunnycondo".into(),
            welcome_message: "Welcome!".into(),
            hero_image_url: String::new(),
        }
    }

    fn section(id: Option<&str>, title: &str, order: i64, urls: &[&str]) -> SectionWrite {
        SectionWrite {
            id: id.map(str::to_string),
            title: title.into(),
            icon_name: "home".into(),
            content: "text".into(),
            display_order: order,
            images: urls
                .iter()
                .enumerate()
                .map(|(i, url)| ImageWrite {
                    image_url: url.to_string(),
                    caption: String::new(),
                    display_order: i as i64,
                })
                .collect(),
        }
    }

    fn favourite(name: &str) -> Favourite {
        Favourite {
            name: name.into(),
            ..Default::default()
        }
    }

    fn stored_image(section_id: &str, url: &str, order: i64) -> ImageRow {
        ImageRow {
            id: format!("img-{}", url),
            section_id: section_id.into(),
            image_url: url.into(),
            caption: String::new(),
            display_order: order,
        }
    }

    #[tokio::test]
    async fn writes_in_order_with_expected_counts() {
        let gateway = MockGateway::default();
        let guide = GuideWrite {
            property: property(None),
            sections: vec![
                section(None, "Welcome", 0, &["a.png"]),
                section(None, "Laundry", 1, &["b.png"]),
            ],
            favourites: vec![favourite("Beach"), favourite("Cafe"), favourite("Bakery")],
        };

        let report = save_guide(&gateway, &guide).await.unwrap();

        let writes = gateway.writes();
        assert_eq!(
            writes,
            vec![
                Call::UpsertProperty(None),
                Call::UpsertSection("Welcome".into()),
                Call::UpsertSection("Laundry".into()),
                Call::UpsertImages(vec!["a.png".into()]),
                Call::UpsertImages(vec!["b.png".into()]),
                Call::DeleteFavourites(report.property.id.clone()),
                Call::InsertFavourites(3),
            ]
        );
        assert_eq!(report.section_ids.len(), 2);
        assert_eq!(report.images_written, 2);
        assert_eq!(report.favourites_written, 3);

        let sections = gateway.sections.borrow();
        assert!(sections.iter().all(|s| s.property_id == report.property.id));
        let favourites = gateway.favourites.borrow();
        assert_eq!(
            favourites.iter().map(|f| f.display_order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn image_diff_deletes_only_removed_urls_and_upserts_the_full_list() {
        let gateway = MockGateway::default();
        gateway.sections.borrow_mut().push(SectionRow {
            id: "s1".into(),
            property_id: "p1".into(),
            title: "Welcome".into(),
            icon_name: "home".into(),
            content: String::new(),
            display_order: 0,
        });
        gateway.images.borrow_mut().extend([
            stored_image("s1", "A", 0),
            stored_image("s1", "B", 1),
            stored_image("s1", "C", 2),
        ]);

        let guide = GuideWrite {
            property: property(Some("p1")),
            sections: vec![section(Some("s1"), "Welcome", 0, &["B", "C", "D"])],
            favourites: vec![],
        };
        let report = save_guide(&gateway, &guide).await.unwrap();

        let writes = gateway.writes();
        assert!(writes.contains(&Call::DeleteImages("s1".into(), vec!["A".into()])));
        assert!(writes.contains(&Call::UpsertImages(vec!["B".into(), "C".into(), "D".into()])));
        assert!(!writes.contains(&Call::InsertFavourites(0)));
        assert_eq!(report.images_deleted, 1);

        let mut urls: Vec<_> = gateway
            .images
            .borrow()
            .iter()
            .map(|i| (i.image_url.clone(), i.display_order))
            .collect();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                ("B".to_string(), 0),
                ("C".to_string(), 1),
                ("D".to_string(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn failure_stops_the_sequence_without_rollback() {
        let gateway = MockGateway::default();
        gateway.fail_on(|call| matches!(call, Call::UpsertSection(title) if title == "Laundry"));

        let guide = GuideWrite {
            property: property(None),
            sections: vec![
                section(None, "Welcome", 0, &["a.png"]),
                section(None, "Laundry", 1, &[]),
                section(None, "Outdoor Areas", 2, &[]),
            ],
            favourites: vec![favourite("Beach")],
        };

        let err = save_guide(&gateway, &guide).await.unwrap_err();
        assert_eq!(err.step, SaveStep::Section);
        assert_eq!(err.detail.as_deref(), Some("Laundry"));
        assert_eq!(err.source, GatewayError::Backend("injected failure".into()));

        let writes = gateway.writes();
        assert_eq!(
            writes,
            vec![
                Call::UpsertProperty(None),
                Call::UpsertSection("Welcome".into()),
                Call::UpsertSection("Laundry".into()),
            ]
        );
        // Earlier writes stay.
        assert_eq!(gateway.properties.borrow().len(), 1);
        assert_eq!(gateway.sections.borrow().len(), 1);
    }

    #[tokio::test]
    async fn favourites_failure_is_reported_as_its_own_step() {
        let gateway = MockGateway::default();
        gateway.fail_on(|call| matches!(call, Call::InsertFavourites(_)));

        let guide = GuideWrite {
            property: property(None),
            sections: vec![],
            favourites: vec![favourite("Beach")],
        };
        let err = save_guide(&gateway, &guide).await.unwrap_err();
        assert_eq!(err.step, SaveStep::Favourites);
        // The delete already happened.
        assert!(gateway
            .writes()
            .iter()
            .any(|c| matches!(c, Call::DeleteFavourites(_))));
    }
}
