use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn one() -> i64 {
    1
}

/// Body of `POST /carts/{user_id}`. Adding a product already in the cart
/// replaces its quantity.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i64>,
}
