mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, delete, get, post, put};

#[tokio::test]
async fn clearing_cart_empties_it() {
    let app = app();

    let (status, _) = post(&app, "/carts/u1", json!({ "productId": "p1", "quantity": 2 })).await;
    assert_eq!(status, StatusCode::CREATED);
    post(&app, "/carts/u1", json!({ "productId": "p2", "quantity": 1 })).await;
    post(&app, "/carts/u2", json!({ "productId": "p1", "quantity": 7 })).await;

    let (_, cart) = get(&app, "/carts/u1").await;
    assert_eq!(cart.as_array().unwrap().len(), 2);

    let (status, body) = delete(&app, "/carts/u1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, cart) = get(&app, "/carts/u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart, json!([]));

    // Other users' carts are untouched.
    let (_, other) = get(&app, "/carts/u2").await;
    assert_eq!(other.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn clearing_empty_cart_succeeds() {
    let app = app();
    let (status, _) = delete(&app, "/carts/nobody").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn adding_same_product_replaces_quantity() {
    let app = app();

    post(&app, "/carts/u1", json!({ "productId": "p1", "quantity": 2 })).await;
    let (_, item) = post(&app, "/carts/u1", json!({ "productId": "p1", "quantity": 5 })).await;
    assert_eq!(item["quantity"], 5);
    assert_eq!(item["userId"], "u1");
    assert!(item["addedAt"].is_string());

    let (_, cart) = get(&app, "/carts/u1").await;
    assert_eq!(cart.as_array().unwrap().len(), 1);
    assert_eq!(cart[0]["quantity"], 5);
}

#[tokio::test]
async fn quantity_defaults_to_one() {
    let app = app();
    let (_, item) = post(&app, "/carts/u1", json!({ "productId": "p9" })).await;
    assert_eq!(item["quantity"], 1);
}

#[tokio::test]
async fn update_and_remove_single_item() {
    let app = app();

    post(&app, "/carts/u1", json!({ "productId": "p1", "quantity": 1 })).await;
    post(&app, "/carts/u1", json!({ "productId": "p2", "quantity": 1 })).await;

    let (status, _) = put(&app, "/carts/u1/p1", json!({ "quantity": 4 })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, cart) = get(&app, "/carts/u1").await;
    let p1 = cart
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["productId"] == "p1")
        .unwrap();
    assert_eq!(p1["quantity"], 4);
    assert!(p1["updatedAt"].is_string());

    let (status, _) = delete(&app, "/carts/u1/p2").await;
    assert_eq!(status, StatusCode::OK);
    let (_, cart) = get(&app, "/carts/u1").await;
    assert_eq!(cart.as_array().unwrap().len(), 1);

    let (status, body) = put(&app, "/carts/u1/p2", json!({ "quantity": 2 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart item not found");
}

#[tokio::test]
async fn fractional_quantity_does_not_break_cart_listing() {
    let app = app();

    post(&app, "/carts/u3", json!({ "productId": "p1" })).await;
    let (status, _) = put(&app, "/carts/u3/p1", json!({ "quantity": 1.5 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = get(&app, "/carts/u3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart[0]["quantity"], 1.5);
}
