use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::OrderLine;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub items: Vec<OrderLine>,
    /// Computed from `items` when omitted.
    pub total_amount: Option<f64>,
    pub shipping_address: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    /// Only this user's orders, newest first.
    pub user_id: Option<String>,
}
