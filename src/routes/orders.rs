use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Map, Value};

use crate::{
    dto::orders::{CreateOrderRequest, OrderQuery, UpdateOrderRequest},
    error::AppResult,
    models::Order,
    response::{Confirmation, ErrorBody},
    services::order_service,
    state::AppState,
    store::Item,
};

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/", get(list_order).post(create_order))
        .route("/{id}", get(get_order).put(update_order))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "List orders", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_order(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let orders = order_service::list_orders(&state, query).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/users/{id}/orders",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "A user's orders, newest first", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Item>>> {
    let orders = order_service::list_user_orders(&state, &user_id).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service::create_order(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order", body = Order),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    let order = order_service::get_order(&state, &id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = Confirmation),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<Map<String, Value>>,
) -> AppResult<Json<Confirmation>> {
    let confirmation = order_service::update_order(&state, &id, changes).await?;
    Ok(Json(confirmation))
}
