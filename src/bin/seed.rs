use storefront_api::{
    config::AppConfig,
    dto::products::{CreateProductRequest, ProductQuery},
    services::product_service,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    if !config.backend.is_persistent() {
        anyhow::bail!(
            "STORAGE_BACKEND={:?} does not persist; seed postgres or dynamodb instead",
            config.backend
        );
    }
    let state = AppState::from_config(&config).await?;

    seed_products(&state).await?;
    Ok(())
}

async fn seed_products(state: &AppState) -> anyhow::Result<()> {
    let products = vec![
        ("Axum Hoodie", "Warm hoodie for Rustaceans", 55.0, 50, "apparel"),
        ("Ferris Mug", "Coffee tastes better with Ferris", 12.0, 100, "kitchen"),
        ("Rust Sticker Pack", "Decorate your laptop", 5.0, 200, "accessories"),
        ("E-book: Async Rust", "Learn async Rust patterns", 25.0, 75, "books"),
    ];

    // Names act as the natural key here so re-running the seed is harmless.
    let existing: Vec<String> = product_service::list_products(state, ProductQuery::default())
        .await?
        .into_iter()
        .filter_map(|item| item.get("name").and_then(|v| v.as_str()).map(str::to_string))
        .collect();

    for (name, description, price, stock, category) in products {
        if existing.iter().any(|n| n == name) {
            println!("Skipping {name}, already present");
            continue;
        }
        let product = product_service::create_product(
            state,
            CreateProductRequest {
                name: name.to_string(),
                description: description.to_string(),
                price,
                stock,
                category: category.to_string(),
                image_url: String::new(),
            },
        )
        .await?;
        println!("Seeded {} ({})", product.name, product.product_id);
    }

    Ok(())
}
