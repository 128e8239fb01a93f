use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        orders::{CreateOrderRequest, UpdateOrderRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        reviews::{CreateReviewRequest, UpdateReviewRequest},
        users::{CreateUserRequest, UpdateUserRequest},
    },
    models::{CartItem, Order, OrderLine, Product, Review, User},
    response::{Confirmation, ErrorBody},
    routes::{carts, health, orders, products, reviews, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        reviews::list_product_reviews,
        reviews::list_user_reviews,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        carts::cart_list,
        carts::add_to_cart,
        carts::update_cart_item,
        carts::remove_from_cart,
        carts::clear_cart,
        orders::list_order,
        orders::list_user_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user
    ),
    components(
        schemas(
            Product,
            CartItem,
            Order,
            OrderLine,
            User,
            Review,
            CreateProductRequest,
            UpdateProductRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            CreateUserRequest,
            UpdateUserRequest,
            CreateReviewRequest,
            UpdateReviewRequest,
            Confirmation,
            ErrorBody,
            health::HealthData
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Users", description = "User endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
