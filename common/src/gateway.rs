//! The data gateway contract.
//!
//! `Gateway` covers the relational records, `ObjectStorage` the image files.
//! An implementation carries its own auth context (a bearer token on the
//! client, the owning host on the server), so no method takes one.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::favourite::FavouriteRow;
use crate::model::image::ImageRow;
use crate::model::property::Property;
use crate::model::section::SectionRow;
use crate::requests::{ImagePayload, PropertyPayload, SectionOrder, SectionPayload};
use crate::session::{Session, SessionStore};

#[async_trait(?Send)]
pub trait Gateway {
    /// Properties owned by the signed-in host, oldest first.
    async fn list_properties(&self) -> Result<Vec<Property>, GatewayError>;

    async fn find_property_by_slug(&self, slug: &str) -> Result<Option<Property>, GatewayError>;

    /// Inserts when `payload.id` is `None`, updates otherwise.
    async fn upsert_property(&self, payload: &PropertyPayload) -> Result<Property, GatewayError>;

    /// Sections of a property ordered by display order.
    async fn list_sections(&self, property_id: &str) -> Result<Vec<SectionRow>, GatewayError>;

    async fn upsert_section(&self, payload: &SectionPayload) -> Result<SectionRow, GatewayError>;

    async fn update_section_orders(
        &self,
        property_id: &str,
        orders: &[SectionOrder],
    ) -> Result<(), GatewayError>;

    /// Images of the given sections ordered by display order.
    async fn list_images(&self, section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError>;

    async fn delete_images(&self, section_id: &str, image_urls: &[String])
        -> Result<(), GatewayError>;

    async fn upsert_images(&self, images: &[ImagePayload]) -> Result<(), GatewayError>;

    /// Favourites of a property ordered by display order.
    async fn list_favourites(&self, property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError>;

    async fn delete_favourites(&self, property_id: &str) -> Result<(), GatewayError>;

    async fn insert_favourites(&self, favourites: &[FavouriteRow]) -> Result<(), GatewayError>;
}

#[async_trait(?Send)]
pub trait ObjectStorage {
    /// Stores `bytes` under `path` and returns a URL the file can be fetched from.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError>;
}

/// Stand-in used when no backend is configured.
///
/// Reads and writes fail with [`GatewayError::NotConfigured`]; the session
/// query reports "signed out" so public screens still render.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait(?Send)]
impl Gateway for Unconfigured {
    async fn list_properties(&self) -> Result<Vec<Property>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn find_property_by_slug(&self, _slug: &str) -> Result<Option<Property>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn upsert_property(&self, _payload: &PropertyPayload) -> Result<Property, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn list_sections(&self, _property_id: &str) -> Result<Vec<SectionRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn upsert_section(&self, _payload: &SectionPayload) -> Result<SectionRow, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn update_section_orders(
        &self,
        _property_id: &str,
        _orders: &[SectionOrder],
    ) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn list_images(&self, _section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn delete_images(
        &self,
        _section_id: &str,
        _image_urls: &[String],
    ) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn upsert_images(&self, _images: &[ImagePayload]) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn list_favourites(&self, _property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn delete_favourites(&self, _property_id: &str) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn insert_favourites(&self, _favourites: &[FavouriteRow]) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[async_trait(?Send)]
impl ObjectStorage for Unconfigured {
    async fn upload(
        &self,
        _path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

#[async_trait(?Send)]
impl SessionStore for Unconfigured {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        Ok(None)
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), GatewayError> {
        Ok(())
    }
}
