use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UserQuery},
    error::{AppError, AppResult},
    models::User,
    response::Confirmation,
    state::AppState,
    store::{EMAIL_INDEX, Item, Key, Query, Table, to_item},
    update::{build_partial_update, timestamp},
};

pub async fn list_users(state: &AppState, query: UserQuery) -> AppResult<Vec<Item>> {
    let request = match query.email.filter(|e| !e.is_empty()) {
        Some(email) => Query::index(EMAIL_INDEX, email),
        None => Query::scan(),
    };
    Ok(state.store.query(Table::Users, &request).await?)
}

pub async fn get_user(state: &AppState, id: &str) -> AppResult<Item> {
    state
        .store
        .get(Table::Users, &Key::new(id))
        .await?
        .ok_or(AppError::NotFound("User"))
}

pub async fn create_user(state: &AppState, payload: CreateUserRequest) -> AppResult<User> {
    let now = timestamp(Utc::now());
    let user = User {
        user_id: Uuid::new_v4().to_string(),
        email: payload.email,
        name: payload.name,
        address: payload.address,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.put(Table::Users, to_item(&user)?).await?;

    tracing::info!(user_id = %user.user_id, "user created");
    Ok(user)
}

pub async fn update_user(
    state: &AppState,
    id: &str,
    changes: Map<String, Value>,
) -> AppResult<Confirmation> {
    let update = build_partial_update(&changes, User::UPDATABLE, Utc::now());
    match state.store.update(Table::Users, &Key::new(id), &update).await? {
        Some(_) => Ok(Confirmation::new("User updated")),
        None => Err(AppError::NotFound("User")),
    }
}

pub async fn delete_user(state: &AppState, id: &str) -> AppResult<Confirmation> {
    state.store.delete(Table::Users, &Key::new(id)).await?;
    Ok(Confirmation::new("User deleted"))
}
