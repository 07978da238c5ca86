use serde::{Deserialize, Serialize};

/// An image row as stored by the gateway. Owned by exactly one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRow {
    pub id: String,
    pub section_id: String,
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    pub display_order: i64,
}
