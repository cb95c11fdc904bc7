use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Facts about a product, used to ground review articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductData {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub specs: BTreeMap<String, String>,
    pub price: Option<String>,
    pub rating: Option<f32>,
}
