use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub user_id: String,
    pub rating: f64,
    pub text: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<f64>,
    pub text: Option<String>,
}
