use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    /// Mean rating of the product's reviews.
    #[serde(default)]
    pub rating: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Attributes a client may change with `PUT /products/{id}`.
    pub const UPDATABLE: &'static [&'static str] =
        &["name", "description", "price", "stock", "category", "imageUrl"];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub user_id: String,
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
    pub added_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl CartItem {
    pub const UPDATABLE: &'static [&'static str] = &["quantity"];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub shipping_address: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Order {
    pub const UPDATABLE: &'static [&'static str] = &["status", "shippingAddress"];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub const UPDATABLE: &'static [&'static str] = &["email", "name", "address"];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub product_id: String,
    pub review_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Review {
    pub const UPDATABLE: &'static [&'static str] = &["rating", "text"];
}

