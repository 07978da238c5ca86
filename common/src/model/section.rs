use serde::{Deserialize, Serialize};

use crate::model::favourite::Favourite;

/// A section row as stored by the gateway. Stored sections always carry
/// rich text; the favourites list lives in its own table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub id: String,
    pub property_id: String,
    pub title: String,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub content: String,
    pub display_order: i64,
}

/// Content of a section card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SectionContent {
    /// Markdown or HTML authored by the host.
    RichText(String),
    /// The local favourites list. Only the favourites slot carries this.
    Favourites(Vec<Favourite>),
}

impl SectionContent {
    pub fn is_favourites(&self) -> bool {
        matches!(self, SectionContent::Favourites(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::RichText(text) => text.trim().is_empty(),
            SectionContent::Favourites(list) => list.is_empty(),
        }
    }
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::RichText(String::new())
    }
}
