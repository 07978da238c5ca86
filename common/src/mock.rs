//! In-memory gateway that records every call, for tests.

use std::cell::RefCell;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::model::favourite::FavouriteRow;
use crate::model::image::ImageRow;
use crate::model::property::Property;
use crate::model::section::SectionRow;
use crate::requests::{ImagePayload, PropertyPayload, SectionOrder, SectionPayload};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListProperties,
    FindProperty(String),
    UpsertProperty(Option<String>),
    ListSections(String),
    UpsertSection(String),
    UpdateOrders(Vec<SectionOrder>),
    ListImages(Vec<String>),
    DeleteImages(String, Vec<String>),
    UpsertImages(Vec<String>),
    ListFavourites(String),
    DeleteFavourites(String),
    InsertFavourites(usize),
}

impl Call {
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Call::ListProperties
                | Call::FindProperty(_)
                | Call::ListSections(_)
                | Call::ListImages(_)
                | Call::ListFavourites(_)
        )
    }
}

#[derive(Default)]
pub struct MockGateway {
    pub properties: RefCell<Vec<Property>>,
    pub sections: RefCell<Vec<SectionRow>>,
    pub images: RefCell<Vec<ImageRow>>,
    pub favourites: RefCell<Vec<FavouriteRow>>,
    pub calls: RefCell<Vec<Call>>,
    /// Fails the first call for which this returns true.
    pub fail_when: RefCell<Option<Box<dyn Fn(&Call) -> bool>>>,
    next_id: RefCell<u32>,
}

impl MockGateway {
    pub fn fail_on(&self, predicate: impl Fn(&Call) -> bool + 'static) {
        *self.fail_when.borrow_mut() = Some(Box::new(predicate));
    }

    /// Writes only, in call order.
    pub fn writes(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !c.is_read())
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        let fail = self
            .fail_when
            .borrow()
            .as_ref()
            .map(|predicate| predicate(&call))
            .unwrap_or(false);
        self.calls.borrow_mut().push(call);
        if fail {
            self.fail_when.borrow_mut().take();
            return Err(GatewayError::Backend("injected failure".into()));
        }
        Ok(())
    }

    fn new_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        format!("{}-{}", prefix, next)
    }
}

#[async_trait(?Send)]
impl Gateway for MockGateway {
    async fn list_properties(&self) -> Result<Vec<Property>, GatewayError> {
        self.record(Call::ListProperties)?;
        Ok(self.properties.borrow().clone())
    }

    async fn find_property_by_slug(&self, slug: &str) -> Result<Option<Property>, GatewayError> {
        self.record(Call::FindProperty(slug.to_string()))?;
        Ok(self
            .properties
            .borrow()
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn upsert_property(&self, payload: &PropertyPayload) -> Result<Property, GatewayError> {
        self.record(Call::UpsertProperty(payload.id.clone()))?;
        let id = payload.id.clone().unwrap_or_else(|| self.new_id("prop"));
        let property = Property {
            id: id.clone(),
            title: payload.title.clone(),
            slug: payload.slug.clone(),
            welcome_message: payload.welcome_message.clone(),
            hero_image_url: payload.hero_image_url.clone(),
            owner_id: "host".to_string(),
            created_at: String::new(),
        };
        let mut properties = self.properties.borrow_mut();
        properties.retain(|p| p.id != id);
        properties.push(property.clone());
        Ok(property)
    }

    async fn list_sections(&self, property_id: &str) -> Result<Vec<SectionRow>, GatewayError> {
        self.record(Call::ListSections(property_id.to_string()))?;
        let mut rows: Vec<_> = self
            .sections
            .borrow()
            .iter()
            .filter(|s| s.property_id == property_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.display_order);
        Ok(rows)
    }

    async fn upsert_section(&self, payload: &SectionPayload) -> Result<SectionRow, GatewayError> {
        self.record(Call::UpsertSection(payload.title.clone()))?;
        let id = payload.id.clone().unwrap_or_else(|| self.new_id("sec"));
        let row = SectionRow {
            id: id.clone(),
            property_id: payload.property_id.clone(),
            title: payload.title.clone(),
            icon_name: payload.icon_name.clone(),
            content: payload.content.clone(),
            display_order: payload.display_order,
        };
        let mut sections = self.sections.borrow_mut();
        sections.retain(|s| s.id != id);
        sections.push(row.clone());
        Ok(row)
    }

    async fn update_section_orders(
        &self,
        _property_id: &str,
        orders: &[SectionOrder],
    ) -> Result<(), GatewayError> {
        self.record(Call::UpdateOrders(orders.to_vec()))?;
        let mut sections = self.sections.borrow_mut();
        for order in orders {
            if let Some(row) = sections.iter_mut().find(|s| s.id == order.id) {
                row.display_order = order.display_order;
            }
        }
        Ok(())
    }

    async fn list_images(&self, section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError> {
        self.record(Call::ListImages(section_ids.to_vec()))?;
        let mut rows: Vec<_> = self
            .images
            .borrow()
            .iter()
            .filter(|i| section_ids.contains(&i.section_id))
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.display_order);
        Ok(rows)
    }

    async fn delete_images(
        &self,
        section_id: &str,
        image_urls: &[String],
    ) -> Result<(), GatewayError> {
        self.record(Call::DeleteImages(section_id.to_string(), image_urls.to_vec()))?;
        self.images
            .borrow_mut()
            .retain(|i| !(i.section_id == section_id && image_urls.contains(&i.image_url)));
        Ok(())
    }

    async fn upsert_images(&self, images: &[ImagePayload]) -> Result<(), GatewayError> {
        self.record(Call::UpsertImages(
            images.iter().map(|i| i.image_url.clone()).collect(),
        ))?;
        for payload in images {
            let existing = self
                .images
                .borrow()
                .iter()
                .position(|i| i.section_id == payload.section_id && i.image_url == payload.image_url);
            match existing {
                Some(index) => {
                    let mut stored = self.images.borrow_mut();
                    stored[index].caption = payload.caption.clone();
                    stored[index].display_order = payload.display_order;
                }
                None => {
                    let id = self.new_id("img");
                    self.images.borrow_mut().push(ImageRow {
                        id,
                        section_id: payload.section_id.clone(),
                        image_url: payload.image_url.clone(),
                        caption: payload.caption.clone(),
                        display_order: payload.display_order,
                    });
                }
            }
        }
        Ok(())
    }

    async fn list_favourites(&self, property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError> {
        self.record(Call::ListFavourites(property_id.to_string()))?;
        let mut rows: Vec<_> = self
            .favourites
            .borrow()
            .iter()
            .filter(|f| f.property_id == property_id)
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.display_order);
        Ok(rows)
    }

    async fn delete_favourites(&self, property_id: &str) -> Result<(), GatewayError> {
        self.record(Call::DeleteFavourites(property_id.to_string()))?;
        self.favourites
            .borrow_mut()
            .retain(|f| f.property_id != property_id);
        Ok(())
    }

    async fn insert_favourites(&self, favourites: &[FavouriteRow]) -> Result<(), GatewayError> {
        self.record(Call::InsertFavourites(favourites.len()))?;
        self.favourites.borrow_mut().extend_from_slice(favourites);
        Ok(())
    }
}
