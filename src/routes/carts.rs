use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Map, Value};

use crate::{
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    error::AppResult,
    models::CartItem,
    response::{Confirmation, ErrorBody},
    services::cart_service,
    state::AppState,
    store::Item,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}",
            get(cart_list).post(add_to_cart).delete(clear_cart),
        )
        .route(
            "/{user_id}/{product_id}",
            put(update_cart_item).delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/carts/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Items in the user's cart", body = Vec<CartItem>)
    ),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Item>>> {
    let items = cart_service::list_cart(&state, &user_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/carts/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Add or replace a cart item", body = CartItem)
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    let item = cart_service::add_to_cart(&state, &user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/carts/{user_id}/{product_id}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("product_id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = Confirmation),
        (status = 404, description = "Cart item not found", body = ErrorBody),
    ),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
    Json(changes): Json<Map<String, Value>>,
) -> AppResult<Json<Confirmation>> {
    let confirmation =
        cart_service::update_cart_item(&state, &user_id, &product_id, changes).await?;
    Ok(Json(confirmation))
}

#[utoipa::path(
    delete,
    path = "/carts/{user_id}/{product_id}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = Confirmation)
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> AppResult<Json<Confirmation>> {
    let confirmation = cart_service::remove_from_cart(&state, &user_id, &product_id).await?;
    Ok(Json(confirmation))
}

#[utoipa::path(
    delete,
    path = "/carts/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cart cleared", body = Confirmation),
        (status = 500, description = "Cart may be partially cleared", body = ErrorBody),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Confirmation>> {
    let confirmation = cart_service::clear_cart(&state, &user_id).await?;
    Ok(Json(confirmation))
}
