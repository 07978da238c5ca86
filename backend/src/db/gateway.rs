//! [`Gateway`] over a SQLite connection.
//!
//! A gateway is built per request around one connection (or transaction)
//! and the id of the signed-in host, if any. Reads by slug or id are public
//! so guests can view guides. Every write checks that the targeted property
//! belongs to the host.

use std::collections::HashSet;

use async_trait::async_trait;
use common::error::GatewayError;
use common::gateway::Gateway;
use common::model::favourite::{Favourite, FavouriteRow};
use common::model::image::ImageRow;
use common::model::property::Property;
use common::model::section::SectionRow;
use common::requests::{ImagePayload, PropertyPayload, SectionOrder, SectionPayload};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROPERTY_COLUMNS: &str =
    "id, title, slug, welcome_message, hero_image_url, owner_id, created_at";

pub struct SqliteGateway<'a> {
    conn: &'a Connection,
    owner: Option<&'a str>,
}

pub(crate) fn db_error(err: rusqlite::Error) -> GatewayError {
    GatewayError::Backend(err.to_string())
}

fn property_from_row(row: &Row) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        welcome_message: row.get(3)?,
        hero_image_url: row.get(4)?,
        owner_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn section_from_row(row: &Row) -> rusqlite::Result<SectionRow> {
    Ok(SectionRow {
        id: row.get(0)?,
        property_id: row.get(1)?,
        title: row.get(2)?,
        icon_name: row.get(3)?,
        content: row.get(4)?,
        display_order: row.get(5)?,
    })
}

fn image_from_row(row: &Row) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        section_id: row.get(1)?,
        image_url: row.get(2)?,
        caption: row.get(3)?,
        display_order: row.get(4)?,
    })
}

fn favourite_from_row(row: &Row) -> rusqlite::Result<FavouriteRow> {
    Ok(FavouriteRow {
        property_id: row.get(0)?,
        display_order: row.get(1)?,
        favourite: Favourite {
            name: row.get(2)?,
            description: row.get(3)?,
            url: row.get(4)?,
            latitude: row.get(5)?,
            longitude: row.get(6)?,
            category: row.get(7)?,
        },
    })
}

impl<'a> SqliteGateway<'a> {
    pub fn new(conn: &'a Connection, owner: Option<&'a str>) -> Self {
        SqliteGateway { conn, owner }
    }

    fn owner(&self) -> Result<&'a str, GatewayError> {
        self.owner.ok_or(GatewayError::Unauthorized)
    }

    fn property(&self, id: &str) -> Result<Option<Property>, GatewayError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM wt_properties WHERE id = ?1", PROPERTY_COLUMNS),
                params![id],
                property_from_row,
            )
            .optional()
            .map_err(db_error)
    }

    /// Fails unless the host owns `property_id`.
    fn ensure_owns_property(&self, property_id: &str) -> Result<(), GatewayError> {
        let owner = self.owner()?;
        match self.property(property_id)? {
            None => Err(GatewayError::NotFound(format!("property {}", property_id))),
            Some(p) if p.owner_id != owner => Err(GatewayError::Unauthorized),
            Some(_) => Ok(()),
        }
    }

    /// Fails unless the host owns the property `section_id` belongs to.
    fn ensure_owns_section(&self, section_id: &str) -> Result<(), GatewayError> {
        let property_id: Option<String> = self
            .conn
            .query_row(
                "SELECT property_id FROM wt_sections WHERE id = ?1",
                params![section_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        match property_id {
            Some(property_id) => self.ensure_owns_property(&property_id),
            None => Err(GatewayError::NotFound(format!("section {}", section_id))),
        }
    }

    fn ensure_slug_free(&self, slug: &str, own_id: Option<&str>) -> Result<(), GatewayError> {
        if slug.trim().is_empty() {
            return Err(GatewayError::Conflict("slug must not be empty".into()));
        }
        let taken_by: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM wt_properties WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        match taken_by {
            Some(id) if Some(id.as_str()) != own_id => {
                Err(GatewayError::Conflict(format!("slug `{}` is already taken", slug)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl Gateway for SqliteGateway<'_> {
    async fn list_properties(&self) -> Result<Vec<Property>, GatewayError> {
        let owner = self.owner()?;
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM wt_properties WHERE owner_id = ?1 ORDER BY created_at, rowid",
                PROPERTY_COLUMNS
            ))
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![owner], property_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    async fn find_property_by_slug(&self, slug: &str) -> Result<Option<Property>, GatewayError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM wt_properties WHERE slug = ?1", PROPERTY_COLUMNS),
                params![slug],
                property_from_row,
            )
            .optional()
            .map_err(db_error)
    }

    async fn upsert_property(&self, payload: &PropertyPayload) -> Result<Property, GatewayError> {
        let owner = self.owner()?;
        self.ensure_slug_free(&payload.slug, payload.id.as_deref())?;

        let id = match &payload.id {
            Some(id) => {
                self.ensure_owns_property(id)?;
                self.conn
                    .execute(
                        "UPDATE wt_properties
                         SET title = ?2, slug = ?3, welcome_message = ?4, hero_image_url = ?5
                         WHERE id = ?1",
                        params![
                            id,
                            payload.title,
                            payload.slug,
                            payload.welcome_message,
                            payload.hero_image_url
                        ],
                    )
                    .map_err(db_error)?;
                id.clone()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn
                    .execute(
                        "INSERT INTO wt_properties
                         (id, title, slug, welcome_message, hero_image_url, owner_id)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            id,
                            payload.title,
                            payload.slug,
                            payload.welcome_message,
                            payload.hero_image_url,
                            owner
                        ],
                    )
                    .map_err(db_error)?;
                id
            }
        };
        debug!("upserted property {} ({})", id, payload.slug);

        self.property(&id)?
            .ok_or_else(|| GatewayError::NotFound(format!("property {}", id)))
    }

    async fn list_sections(&self, property_id: &str) -> Result<Vec<SectionRow>, GatewayError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, property_id, title, icon_name, content, display_order
                 FROM wt_sections WHERE property_id = ?1 ORDER BY display_order, rowid",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![property_id], section_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    async fn upsert_section(&self, payload: &SectionPayload) -> Result<SectionRow, GatewayError> {
        self.ensure_owns_property(&payload.property_id)?;

        let id = match &payload.id {
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE wt_sections
                         SET title = ?3, icon_name = ?4, content = ?5, display_order = ?6
                         WHERE id = ?1 AND property_id = ?2",
                        params![
                            id,
                            payload.property_id,
                            payload.title,
                            payload.icon_name,
                            payload.content,
                            payload.display_order
                        ],
                    )
                    .map_err(db_error)?;
                if changed == 0 {
                    return Err(GatewayError::NotFound(format!("section {}", id)));
                }
                id.clone()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn
                    .execute(
                        "INSERT INTO wt_sections
                         (id, property_id, title, icon_name, content, display_order)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            id,
                            payload.property_id,
                            payload.title,
                            payload.icon_name,
                            payload.content,
                            payload.display_order
                        ],
                    )
                    .map_err(db_error)?;
                id
            }
        };

        Ok(SectionRow {
            id,
            property_id: payload.property_id.clone(),
            title: payload.title.clone(),
            icon_name: payload.icon_name.clone(),
            content: payload.content.clone(),
            display_order: payload.display_order,
        })
    }

    async fn update_section_orders(
        &self,
        property_id: &str,
        orders: &[SectionOrder],
    ) -> Result<(), GatewayError> {
        self.ensure_owns_property(property_id)?;
        let mut stmt = self
            .conn
            .prepare("UPDATE wt_sections SET display_order = ?1 WHERE id = ?2 AND property_id = ?3")
            .map_err(db_error)?;
        for order in orders {
            stmt.execute(params![order.display_order, order.id, property_id])
                .map_err(db_error)?;
        }
        Ok(())
    }

    async fn list_images(&self, section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; section_ids.len()].join(", ");
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, section_id, image_url, caption, display_order
                 FROM wt_images WHERE section_id IN ({}) ORDER BY display_order, rowid",
                placeholders
            ))
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params_from_iter(section_ids.iter()), image_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    async fn delete_images(
        &self,
        section_id: &str,
        image_urls: &[String],
    ) -> Result<(), GatewayError> {
        self.ensure_owns_section(section_id)?;
        let mut stmt = self
            .conn
            .prepare("DELETE FROM wt_images WHERE section_id = ?1 AND image_url = ?2")
            .map_err(db_error)?;
        for url in image_urls {
            stmt.execute(params![section_id, url]).map_err(db_error)?;
        }
        Ok(())
    }

    async fn upsert_images(&self, images: &[ImagePayload]) -> Result<(), GatewayError> {
        let mut checked: HashSet<&str> = HashSet::new();
        for image in images {
            if checked.insert(image.section_id.as_str()) {
                self.ensure_owns_section(&image.section_id)?;
            }
        }

        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO wt_images (id, section_id, image_url, caption, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (section_id, image_url)
                 DO UPDATE SET caption = excluded.caption, display_order = excluded.display_order",
            )
            .map_err(db_error)?;
        for image in images {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                image.section_id,
                image.image_url,
                image.caption,
                image.display_order
            ])
            .map_err(db_error)?;
        }
        Ok(())
    }

    async fn list_favourites(&self, property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT property_id, display_order, name, description, url, latitude, longitude, category
                 FROM wt_local_favourites WHERE property_id = ?1 ORDER BY display_order, id",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![property_id], favourite_from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        Ok(rows)
    }

    async fn delete_favourites(&self, property_id: &str) -> Result<(), GatewayError> {
        self.ensure_owns_property(property_id)?;
        self.conn
            .execute(
                "DELETE FROM wt_local_favourites WHERE property_id = ?1",
                params![property_id],
            )
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_favourites(&self, favourites: &[FavouriteRow]) -> Result<(), GatewayError> {
        let mut checked: HashSet<&str> = HashSet::new();
        for row in favourites {
            if checked.insert(row.property_id.as_str()) {
                self.ensure_owns_property(&row.property_id)?;
            }
        }

        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO wt_local_favourites
                 (property_id, display_order, name, description, url, latitude, longitude, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(db_error)?;
        for row in favourites {
            let f = &row.favourite;
            stmt.execute(params![
                row.property_id,
                row.display_order,
                f.name,
                f.description,
                f.url,
                f.latitude,
                f.longitude,
                f.category
            ])
            .map_err(db_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use common::guide::load_guide;
    use common::requests::{GuideWrite, ImageWrite, SectionWrite};
    use common::save::save_guide;

    const HOST: &str = "host-1";

    fn property_payload(slug: &str) -> PropertyPayload {
        PropertyPayload {
            id: None,
            title: "Sunny Condo".into(),
            slug: slug.into(),
            welcome_message: "Hello".into(),
            hero_image_url: String::new(),
        }
    }

    fn section_payload(property_id: &str, title: &str, order: i64) -> SectionPayload {
        SectionPayload {
            id: None,
            property_id: property_id.into(),
            title: title.into(),
            icon_name: "home".into(),
            content: "text".into(),
            display_order: order,
        }
    }

    fn image(section_id: &str, url: &str, order: i64) -> ImagePayload {
        ImagePayload {
            section_id: section_id.into(),
            image_url: url.into(),
            caption: String::new(),
            display_order: order,
        }
    }

    #[actix_web::test]
    async fn property_round_trip_and_slug_lookup() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));

        let created = gateway.upsert_property(&property_payload("sunnycondo")).await.unwrap();
        assert_eq!(created.owner_id, HOST);
        assert!(!created.created_at.is_empty());

        let mut update = property_payload("sunny");
        update.id = Some(created.id.clone());
        update.title = "Sunny Condo II".into();
        let updated = gateway.upsert_property(&update).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Sunny Condo II");

        let guest = SqliteGateway::new(&conn, None);
        assert_eq!(guest.find_property_by_slug("sunnycondo").await.unwrap(), None);
        assert_eq!(
            guest.find_property_by_slug("sunny").await.unwrap().map(|p| p.id),
            Some(created.id)
        );
        assert_eq!(gateway.list_properties().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn duplicate_slug_is_a_conflict() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));
        gateway.upsert_property(&property_payload("acme")).await.unwrap();

        let err = gateway.upsert_property(&property_payload("acme")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[actix_web::test]
    async fn writes_need_the_owning_host() {
        let conn = open_in_memory().unwrap();
        let owner = SqliteGateway::new(&conn, Some(HOST));
        let property = owner.upsert_property(&property_payload("acme")).await.unwrap();

        let guest = SqliteGateway::new(&conn, None);
        assert_eq!(
            guest.upsert_property(&property_payload("other")).await,
            Err(GatewayError::Unauthorized)
        );
        assert_eq!(guest.list_properties().await, Err(GatewayError::Unauthorized));

        let stranger = SqliteGateway::new(&conn, Some("host-2"));
        assert_eq!(
            stranger
                .upsert_section(&section_payload(&property.id, "Welcome", 0))
                .await,
            Err(GatewayError::Unauthorized)
        );
        assert_eq!(
            stranger.delete_favourites(&property.id).await,
            Err(GatewayError::Unauthorized)
        );
        assert!(stranger.list_properties().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn sections_are_listed_in_display_order_and_reordered() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));
        let property = gateway.upsert_property(&property_payload("acme")).await.unwrap();
        let b = gateway
            .upsert_section(&section_payload(&property.id, "B", 1))
            .await
            .unwrap();
        let a = gateway
            .upsert_section(&section_payload(&property.id, "A", 0))
            .await
            .unwrap();

        let titles = |rows: Vec<SectionRow>| rows.into_iter().map(|s| s.title).collect::<Vec<_>>();
        assert_eq!(titles(gateway.list_sections(&property.id).await.unwrap()), vec!["A", "B"]);

        gateway
            .update_section_orders(
                &property.id,
                &[
                    SectionOrder { id: b.id.clone(), display_order: 0 },
                    SectionOrder { id: a.id.clone(), display_order: 1 },
                ],
            )
            .await
            .unwrap();
        assert_eq!(titles(gateway.list_sections(&property.id).await.unwrap()), vec!["B", "A"]);

        let mut missing = section_payload(&property.id, "C", 2);
        missing.id = Some("nope".into());
        assert!(matches!(
            gateway.upsert_section(&missing).await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn image_upsert_updates_on_section_and_url() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));
        let property = gateway.upsert_property(&property_payload("acme")).await.unwrap();
        let section = gateway
            .upsert_section(&section_payload(&property.id, "Welcome", 0))
            .await
            .unwrap();

        gateway
            .upsert_images(&[image(&section.id, "a.png", 0), image(&section.id, "b.png", 1)])
            .await
            .unwrap();
        let mut moved = image(&section.id, "a.png", 2);
        moved.caption = "front door".into();
        gateway.upsert_images(&[moved]).await.unwrap();

        let rows = gateway.list_images(&[section.id.clone()]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].image_url, "a.png");
        assert_eq!(rows[1].caption, "front door");

        gateway
            .delete_images(&section.id, &["b.png".to_string()])
            .await
            .unwrap();
        assert_eq!(gateway.list_images(&[section.id.clone()]).await.unwrap().len(), 1);
        assert!(gateway.list_images(&[]).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn favourites_keep_optional_fields() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));
        let property = gateway.upsert_property(&property_payload("acme")).await.unwrap();

        let rows = vec![
            FavouriteRow {
                property_id: property.id.clone(),
                display_order: 0,
                favourite: Favourite {
                    name: "Beach".into(),
                    description: "Sandy".into(),
                    url: Some("https://beach.example".into()),
                    latitude: Some(36.5),
                    longitude: Some(-4.9),
                    category: Some("outdoors".into()),
                },
            },
            FavouriteRow {
                property_id: property.id.clone(),
                display_order: 1,
                favourite: Favourite {
                    name: "Cafe".into(),
                    ..Default::default()
                },
            },
        ];
        gateway.insert_favourites(&rows).await.unwrap();
        assert_eq!(gateway.list_favourites(&property.id).await.unwrap(), rows);

        gateway.delete_favourites(&property.id).await.unwrap();
        assert!(gateway.list_favourites(&property.id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn saved_guide_loads_back() {
        let conn = open_in_memory().unwrap();
        let gateway = SqliteGateway::new(&conn, Some(HOST));
        let guide = GuideWrite {
            property: property_payload("acme"),
            sections: vec![SectionWrite {
                id: None,
                title: "Welcome".into(),
                icon_name: "home".into(),
                content: "Hi".into(),
                display_order: 0,
                images: vec![ImageWrite {
                    image_url: "a.png".into(),
                    caption: String::new(),
                    display_order: 0,
                }],
            }],
            favourites: vec![Favourite {
                name: "Beach".into(),
                ..Default::default()
            }],
        };
        save_guide(&gateway, &guide).await.unwrap();

        let loaded = load_guide(&gateway, "acme").await.unwrap().unwrap();
        assert_eq!(loaded.sections.len(), 1);
        assert_eq!(loaded.images.len(), 1);
        assert_eq!(loaded.favourites.len(), 1);
    }

    #[actix_web::test]
    async fn failed_save_inside_a_transaction_rolls_back() {
        let mut conn = open_in_memory().unwrap();
        let guide = GuideWrite {
            property: property_payload("acme"),
            sections: vec![SectionWrite {
                id: Some("missing".into()),
                title: "Welcome".into(),
                icon_name: "home".into(),
                content: String::new(),
                display_order: 0,
                images: vec![],
            }],
            favourites: vec![],
        };

        {
            let tx = conn.transaction().unwrap();
            let gateway = SqliteGateway::new(&tx, Some(HOST));
            assert!(save_guide(&gateway, &guide).await.is_err());
        }

        let gateway = SqliteGateway::new(&conn, Some(HOST));
        assert_eq!(gateway.find_property_by_slug("acme").await.unwrap(), None);
    }
}
