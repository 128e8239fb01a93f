use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    dto::cart::AddToCartRequest,
    error::{AppError, AppResult},
    models::CartItem,
    response::Confirmation,
    state::AppState,
    store::{Item, Key, Query, Table, to_item},
    update::{build_partial_update, timestamp},
};

pub async fn list_cart(state: &AppState, user_id: &str) -> AppResult<Vec<Item>> {
    Ok(state
        .store
        .query(Table::Carts, &Query::partition(user_id))
        .await?)
}

pub async fn add_to_cart(
    state: &AppState,
    user_id: &str,
    payload: AddToCartRequest,
) -> AppResult<CartItem> {
    let cart_item = CartItem {
        user_id: user_id.to_string(),
        product_id: payload.product_id,
        quantity: payload.quantity,
        added_at: timestamp(Utc::now()),
        updated_at: None,
    };
    state.store.put(Table::Carts, to_item(&cart_item)?).await?;

    tracing::debug!(user_id, product_id = %cart_item.product_id, "cart item stored");
    Ok(cart_item)
}

pub async fn update_cart_item(
    state: &AppState,
    user_id: &str,
    product_id: &str,
    changes: Map<String, Value>,
) -> AppResult<Confirmation> {
    let update = build_partial_update(&changes, CartItem::UPDATABLE, Utc::now());
    match state
        .store
        .update(Table::Carts, &Key::composite(user_id, product_id), &update)
        .await?
    {
        Some(_) => Ok(Confirmation::new("Cart item updated")),
        None => Err(AppError::NotFound("Cart item")),
    }
}

pub async fn remove_from_cart(
    state: &AppState,
    user_id: &str,
    product_id: &str,
) -> AppResult<Confirmation> {
    state
        .store
        .delete(Table::Carts, &Key::composite(user_id, product_id))
        .await?;
    Ok(Confirmation::new("Item removed from cart"))
}

/// Delete every item in the user's cart, one delete per item.
///
/// Not atomic: a failure part way through leaves the items deleted so far
/// gone and the rest in place. Re-issuing the call finishes the job.
pub async fn clear_cart(state: &AppState, user_id: &str) -> AppResult<Confirmation> {
    let items = state
        .store
        .query(Table::Carts, &Query::partition(user_id))
        .await?;
    let total = items.len();

    for (removed, item) in items.iter().enumerate() {
        let key = Key::from_item(Table::Carts, item)?;
        if let Err(err) = state.store.delete(Table::Carts, &key).await {
            tracing::error!(
                user_id,
                removed,
                remaining = total - removed,
                error = %err,
                "cart partially cleared"
            );
            return Err(err.into());
        }
    }

    tracing::debug!(user_id, removed = total, "cart cleared");
    Ok(Confirmation::new("Cart cleared"))
}
