//! The editor's view model: template groups of section cards.

use serde::{Deserialize, Serialize};

use crate::model::section::SectionContent;

/// An image attached to a section card. `id` is `None` for an image uploaded
/// in this editing session and not saved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageView {
    pub id: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
}

/// One editable card. Placeholders created from the template have no `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCard {
    pub id: Option<String>,
    pub title: String,
    pub icon_name: String,
    pub content: SectionContent,
    pub images: Vec<ImageView>,
}

/// A named group of cards, in template order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub group: String,
    pub items: Vec<SectionCard>,
}
