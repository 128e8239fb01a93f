use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductQuery},
    error::{AppError, AppResult},
    models::Product,
    response::Confirmation,
    state::AppState,
    store::{CATEGORY_RATING_INDEX, Item, Key, Query, Table, to_item},
    update::{build_partial_update, timestamp},
};

pub async fn list_products(state: &AppState, query: ProductQuery) -> AppResult<Vec<Item>> {
    let request = match query.category.filter(|c| !c.is_empty()) {
        Some(category) => Query::index(CATEGORY_RATING_INDEX, category).descending(),
        None => Query::scan(),
    };
    Ok(state.store.query(Table::Products, &request).await?)
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<Item> {
    state
        .store
        .get(Table::Products, &Key::new(id))
        .await?
        .ok_or(AppError::NotFound("Product"))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    let now = timestamp(Utc::now());
    let product = Product {
        product_id: Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        category: payload.category,
        image_url: payload.image_url,
        rating: 0.0,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.put(Table::Products, to_item(&product)?).await?;

    tracing::info!(product_id = %product.product_id, "product created");
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    id: &str,
    changes: Map<String, Value>,
) -> AppResult<Confirmation> {
    let update = build_partial_update(&changes, Product::UPDATABLE, Utc::now());
    match state
        .store
        .update(Table::Products, &Key::new(id), &update)
        .await?
    {
        Some(_) => Ok(Confirmation::new("Product updated")),
        None => Err(AppError::NotFound("Product")),
    }
}

pub async fn delete_product(state: &AppState, id: &str) -> AppResult<Confirmation> {
    state.store.delete(Table::Products, &Key::new(id)).await?;
    Ok(Confirmation::new("Product deleted"))
}
