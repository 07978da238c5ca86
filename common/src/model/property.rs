use serde::{Deserialize, Serialize};

/// A property as stored by the gateway.
///
/// The `slug` is the public URL key of the property's guide and is unique
/// across all properties; `id` is the storage identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub hero_image_url: String,
    pub owner_id: String,
    #[serde(default)]
    pub created_at: String,
}

/// The editable scalar fields of a property, as held by the editor.
///
/// `id` is `None` until the first save creates the row. A blank `slug` is
/// derived from the title when the write shape is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub id: Option<String>,
    pub title: String,
    pub slug: String,
    pub welcome_message: String,
    pub hero_image_url: String,
}

impl From<&Property> for PropertyDraft {
    fn from(property: &Property) -> Self {
        Self {
            id: Some(property.id.clone()),
            title: property.title.clone(),
            slug: property.slug.clone(),
            welcome_message: property.welcome_message.clone(),
            hero_image_url: property.hero_image_url.clone(),
        }
    }
}
