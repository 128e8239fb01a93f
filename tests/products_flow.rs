mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{app, delete, get, post, put};

#[tokio::test]
async fn create_then_get_product_applies_defaults() {
    let app = app();

    let (status, created) = post(&app, "/products", json!({ "name": "X", "price": 10 })).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["productId"].as_str().expect("generated productId");
    assert!(!id.is_empty());
    assert_eq!(created["name"], "X");
    assert_eq!(created["price"], 10.0);
    assert_eq!(created["description"], "");
    assert_eq!(created["stock"], 0);

    let (status, fetched) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert!(fetched["updatedAt"].as_str().unwrap() >= fetched["createdAt"].as_str().unwrap());
}

#[tokio::test]
async fn missing_product_is_404() {
    let app = app();

    let (status, body) = get(&app, "/products/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Product not found" }));
}

#[tokio::test]
async fn updating_price_leaves_other_fields_alone() {
    let app = app();

    let (_, created) = post(
        &app,
        "/products",
        json!({ "name": "Mug", "price": 8, "stock": 12 }),
    )
    .await;
    let id = created["productId"].as_str().unwrap();

    // Timestamps have millisecond precision.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, body) = put(&app, &format!("/products/{id}"), json!({ "price": 9.5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, fetched) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(fetched["price"], 9.5);
    assert_eq!(fetched["name"], "Mug");
    assert_eq!(fetched["stock"], 12);
    assert!(fetched["updatedAt"].as_str().unwrap() > created["updatedAt"].as_str().unwrap());
    assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn zero_stock_is_applied_and_unknown_fields_ignored() {
    let app = app();

    let (_, created) = post(&app, "/products", json!({ "name": "Cap", "stock": 4 })).await;
    let id = created["productId"].as_str().unwrap();

    let (status, _) = put(
        &app,
        &format!("/products/{id}"),
        json!({ "stock": 0, "productId": "hijacked", "secret": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(fetched["stock"], 0);
    assert_eq!(fetched["productId"], id);
    assert!(fetched.get("secret").is_none());
}

#[tokio::test]
async fn empty_update_only_touches_timestamp() {
    let app = app();

    let (_, created) = post(&app, "/products", json!({ "name": "Pen", "price": 1 })).await;
    let id = created["productId"].as_str().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, _) = put(&app, &format!("/products/{id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(fetched["name"], "Pen");
    assert!(fetched["updatedAt"].as_str().unwrap() > created["updatedAt"].as_str().unwrap());
}

#[tokio::test]
async fn updating_missing_product_is_404() {
    let app = app();

    let (status, body) = put(&app, "/products/nope", json!({ "price": 1 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (_, list) = get(&app, "/products").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn delete_removes_product() {
    let app = app();

    let (_, created) = post(&app, "/products", json!({ "name": "Gone" })).await;
    let id = created["productId"].as_str().unwrap();

    let (status, _) = delete(&app, &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_by_category_uses_rating_order() {
    let app = app();

    post(&app, "/products", json!({ "name": "A", "category": "books" })).await;
    let (_, b) = post(&app, "/products", json!({ "name": "B", "category": "books" })).await;
    post(&app, "/products", json!({ "name": "C", "category": "toys" })).await;

    // A review lifts B's rating above A's.
    let b_id = b["productId"].as_str().unwrap();
    post(
        &app,
        &format!("/products/{b_id}/reviews"),
        json!({ "userId": "u1", "rating": 5, "text": "great" }),
    )
    .await;

    let (status, books) = get(&app, "/products?category=books").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = books
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B", "A"]);

    let (_, all) = get(&app, "/products").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = app();
    let (status, body) = get(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn off_type_values_are_stored_and_read_back_as_sent() {
    let app = app();

    let (_, a) = post(&app, "/products", json!({ "name": "A", "price": 1 })).await;
    let (_, b) = post(&app, "/products", json!({ "name": "B", "price": 2 })).await;
    let a_id = a["productId"].as_str().unwrap();

    let (status, _) = put(
        &app,
        &format!("/products/{a_id}"),
        json!({ "stock": 2.5, "price": "10", "name": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, fetched) = get(&app, &format!("/products/{a_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["stock"], 2.5);
    assert_eq!(fetched["price"], "10");
    assert_eq!(fetched["name"], Value::Null);

    let (status, listed) = get(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["productId"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a_id));
    assert!(ids.contains(&b["productId"].as_str().unwrap()));
}
