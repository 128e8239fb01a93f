use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Map, Value};

use crate::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    error::AppResult,
    models::Review,
    response::{Confirmation, ErrorBody},
    services::review_service,
    state::AppState,
    store::Item,
};

#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Reviews of a product", body = Vec<Review>)
    ),
    tag = "Reviews"
)]
pub async fn list_product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<Vec<Item>>> {
    let reviews = review_service::list_product_reviews(&state, &product_id).await?;
    Ok(Json(reviews))
}

#[utoipa::path(
    get,
    path = "/users/{id}/reviews",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Reviews written by a user, newest first", body = Vec<Review>)
    ),
    tag = "Reviews"
)]
pub async fn list_user_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Item>>> {
    let reviews = review_service::list_user_reviews(&state, &user_id).await?;
    Ok(Json(reviews))
}

#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review)
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = review_service::create_review(&state, &product_id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    put,
    path = "/products/{id}/reviews/{review_id}",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = String, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = Confirmation),
        (status = 404, description = "Review not found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    Path((product_id, review_id)): Path<(String, String)>,
    Json(changes): Json<Map<String, Value>>,
) -> AppResult<Json<Confirmation>> {
    let confirmation =
        review_service::update_review(&state, &product_id, &review_id, changes).await?;
    Ok(Json(confirmation))
}

#[utoipa::path(
    delete,
    path = "/products/{id}/reviews/{review_id}",
    params(
        ("id" = String, Path, description = "Product ID"),
        ("review_id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted", body = Confirmation)
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path((product_id, review_id)): Path<(String, String)>,
) -> AppResult<Json<Confirmation>> {
    let confirmation = review_service::delete_review(&state, &product_id, &review_id).await?;
    Ok(Json(confirmation))
}
