use serde::{Deserialize, Serialize};

/// One local favourite entry (a café, a beach, a bakery).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favourite {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A favourite as stored by the gateway, keyed to its property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouriteRow {
    pub property_id: String,
    pub display_order: i64,
    #[serde(flatten)]
    pub favourite: Favourite,
}
