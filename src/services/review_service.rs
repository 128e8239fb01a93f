use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    dto::reviews::CreateReviewRequest,
    error::{AppError, AppResult},
    models::Review,
    response::Confirmation,
    state::AppState,
    store::{Item, Key, Query, Table, USER_ID_CREATED_AT_INDEX, to_item},
    update::{build_partial_update, timestamp},
};

pub async fn list_product_reviews(state: &AppState, product_id: &str) -> AppResult<Vec<Item>> {
    Ok(state
        .store
        .query(Table::Reviews, &Query::partition(product_id))
        .await?)
}

/// A user's reviews, newest first.
pub async fn list_user_reviews(state: &AppState, user_id: &str) -> AppResult<Vec<Item>> {
    let items = state
        .store
        .query(
            Table::Reviews,
            &Query::index(USER_ID_CREATED_AT_INDEX, user_id).descending(),
        )
        .await?;
    Ok(items)
}

pub async fn create_review(
    state: &AppState,
    product_id: &str,
    payload: CreateReviewRequest,
) -> AppResult<Review> {
    let now = timestamp(Utc::now());
    let review = Review {
        product_id: product_id.to_string(),
        review_id: Uuid::new_v4().to_string(),
        user_id: payload.user_id,
        rating: payload.rating,
        text: payload.text,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.put(Table::Reviews, to_item(&review)?).await?;

    if let Err(err) = refresh_product_rating(state, product_id).await {
        tracing::warn!(product_id, error = %err, "product rating refresh failed");
    }

    Ok(review)
}

pub async fn update_review(
    state: &AppState,
    product_id: &str,
    review_id: &str,
    changes: Map<String, Value>,
) -> AppResult<Confirmation> {
    let update = build_partial_update(&changes, Review::UPDATABLE, Utc::now());
    let updated = state
        .store
        .update(Table::Reviews, &Key::composite(product_id, review_id), &update)
        .await?;
    if updated.is_none() {
        return Err(AppError::NotFound("Review"));
    }

    if update.attributes().contains(&"rating") {
        if let Err(err) = refresh_product_rating(state, product_id).await {
            tracing::warn!(product_id, error = %err, "product rating refresh failed");
        }
    }
    Ok(Confirmation::new("Review updated"))
}

pub async fn delete_review(
    state: &AppState,
    product_id: &str,
    review_id: &str,
) -> AppResult<Confirmation> {
    state
        .store
        .delete(Table::Reviews, &Key::composite(product_id, review_id))
        .await?;

    if let Err(err) = refresh_product_rating(state, product_id).await {
        tracing::warn!(product_id, error = %err, "product rating refresh failed");
    }
    Ok(Confirmation::new("Review deleted"))
}

/// Rewrite the product's `rating` with the mean of its reviews.
/// A missing product is left alone.
async fn refresh_product_rating(state: &AppState, product_id: &str) -> AppResult<()> {
    let reviews = list_product_reviews(state, product_id).await?;
    let mut changes = Map::new();
    changes.insert("rating".to_string(), Value::from(mean_rating(&reviews)));

    let update = build_partial_update(&changes, &["rating"], Utc::now());
    state
        .store
        .update(Table::Products, &Key::new(product_id), &update)
        .await?;
    Ok(())
}

/// Mean of the numeric `rating` attributes; reviews rated with anything
/// else are left out.
pub fn mean_rating(reviews: &[Item]) -> f64 {
    let ratings: Vec<f64> = reviews
        .iter()
        .filter_map(|review| review.get("rating").and_then(Value::as_f64))
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<f64>() / ratings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(rating: Value) -> Item {
        let mut item = Item::new();
        item.insert("rating".to_string(), rating);
        item
    }

    #[test]
    fn mean_skips_non_numeric_ratings() {
        let reviews = [review(json!(4)), review(json!("five")), review(json!(2.0))];
        assert_eq!(mean_rating(&reviews), 3.0);
        assert_eq!(mean_rating(&[]), 0.0);
    }
}
