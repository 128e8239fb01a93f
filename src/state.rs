use std::sync::Arc;

use crate::{
    config::{AppConfig, StorageBackend},
    db::{create_pool, run_migrations},
    store::{KeyValueStore, MemoryStore, PostgresStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Connect the storage backend selected by `STORAGE_BACKEND`.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let pool = create_pool(config.database_url()?).await?;
                run_migrations(&pool).await?;
                Ok(Self::new(PostgresStore::new(pool)))
            }
            StorageBackend::DynamoDb => dynamodb_state(config).await,
        }
    }
}

#[cfg(feature = "dynamodb")]
async fn dynamodb_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = crate::store::dynamodb::DynamoDbStore::from_env(config.tables.clone()).await;
    Ok(AppState::new(store))
}

#[cfg(not(feature = "dynamodb"))]
async fn dynamodb_state(_config: &AppConfig) -> anyhow::Result<AppState> {
    anyhow::bail!("STORAGE_BACKEND=dynamodb requires building with the `dynamodb` feature")
}
