//! Payloads sent to the backend, plus the write shape produced by the
//! template engine.

use serde::{Deserialize, Serialize};

use crate::model::favourite::{Favourite, FavouriteRow};

/// Property upsert payload. `id` is omitted, not `null`, for a property that
/// has not been created yet so the gateway can tell insert from update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub welcome_message: String,
    pub hero_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub property_id: String,
    pub title: String,
    pub icon_name: String,
    pub content: String,
    pub display_order: i64,
}

/// Image upsert payload, keyed by `(section_id, image_url)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub section_id: String,
    pub image_url: String,
    pub caption: String,
    pub display_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOrder {
    pub id: String,
    pub display_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSectionOrdersRequest {
    pub property_id: String,
    pub orders: Vec<SectionOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListImagesRequest {
    pub section_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteImagesRequest {
    pub section_id: String,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFavouritesRequest {
    pub property_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertFavouritesRequest {
    pub favourites: Vec<FavouriteRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An image in the write shape. `display_order` is its index in the section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageWrite {
    pub image_url: String,
    pub caption: String,
    pub display_order: i64,
}

/// A section in the write shape. `display_order` is its position in the
/// flattened section list across all groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionWrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub icon_name: String,
    pub content: String,
    pub display_order: i64,
    pub images: Vec<ImageWrite>,
}

/// Everything one editor save writes, in the shape the gateway expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideWrite {
    pub property: PropertyPayload,
    pub sections: Vec<SectionWrite>,
    /// Favourites in display order. They are not sections.
    pub favourites: Vec<Favourite>,
}

/// Answer of `POST /api/storage/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
