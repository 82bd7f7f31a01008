use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// `productId -> size -> quantity`. A missing key means a quantity of zero.
pub type CartData = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    #[strum(serialize = "Order Placed")]
    OrderPlaced,
    Packing,
    Shipped,
    #[serde(rename = "Out for delivery")]
    #[strum(serialize = "Out for delivery")]
    OutForDelivery,
    Delivered,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub brand: String,
    /// Numeric scores arrive here already rendered as a 4-decimal string.
    pub score: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecommendationResponse {
    pub message: String,
    pub recommendations: Vec<RecommendationResult>,
}
