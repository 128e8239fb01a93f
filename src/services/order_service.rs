use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderQuery},
    error::{AppError, AppResult},
    models::{Order, OrderLine},
    response::Confirmation,
    state::AppState,
    store::{Item, Key, Query, Table, USER_ID_CREATED_AT_INDEX, to_item},
    update::{build_partial_update, timestamp},
};

pub const INITIAL_STATUS: &str = "pending";

pub async fn list_orders(state: &AppState, query: OrderQuery) -> AppResult<Vec<Item>> {
    match query.user_id.filter(|u| !u.is_empty()) {
        Some(user_id) => list_user_orders(state, &user_id).await,
        None => Ok(state.store.query(Table::Orders, &Query::scan()).await?),
    }
}

/// A user's orders, newest first.
pub async fn list_user_orders(state: &AppState, user_id: &str) -> AppResult<Vec<Item>> {
    let items = state
        .store
        .query(
            Table::Orders,
            &Query::index(USER_ID_CREATED_AT_INDEX, user_id).descending(),
        )
        .await?;
    Ok(items)
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<Item> {
    state
        .store
        .get(Table::Orders, &Key::new(id))
        .await?
        .ok_or(AppError::NotFound("Order"))
}

pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<Order> {
    let now = timestamp(Utc::now());
    let total_amount = payload
        .total_amount
        .unwrap_or_else(|| order_total(&payload.items));
    let order = Order {
        order_id: Uuid::new_v4().to_string(),
        user_id: payload.user_id,
        items: payload.items,
        total_amount,
        status: INITIAL_STATUS.to_string(),
        shipping_address: payload.shipping_address,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.put(Table::Orders, to_item(&order)?).await?;

    tracing::info!(order_id = %order.order_id, user_id = %order.user_id, "order created");
    Ok(order)
}

pub async fn update_order(
    state: &AppState,
    id: &str,
    changes: Map<String, Value>,
) -> AppResult<Confirmation> {
    let update = build_partial_update(&changes, Order::UPDATABLE, Utc::now());
    match state.store.update(Table::Orders, &Key::new(id), &update).await? {
        Some(_) => Ok(Confirmation::new("Order updated")),
        None => Err(AppError::NotFound("Order")),
    }
}

pub fn order_total(items: &[OrderLine]) -> f64 {
    items
        .iter()
        .map(|line| line.price * line.quantity as f64)
        .sum()
}
