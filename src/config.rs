use std::{env, str::FromStr};

use anyhow::{Context, bail};

use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
    DynamoDb,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            "dynamodb" => Ok(StorageBackend::DynamoDb),
            other => bail!("unknown STORAGE_BACKEND `{other}` (expected memory, postgres or dynamodb)"),
        }
    }
}

impl StorageBackend {
    /// Whether data written through this backend outlives the process.
    pub fn is_persistent(self) -> bool {
        !matches!(self, StorageBackend::Memory)
    }
}

/// Physical table names, used by the DynamoDB backend where tables are
/// provisioned per deployment stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub products: String,
    pub carts: String,
    pub orders: String,
    pub users: String,
    pub reviews: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            products: Table::Products.name().to_string(),
            carts: Table::Carts.name().to_string(),
            orders: Table::Orders.name().to_string(),
            users: Table::Users.name().to_string(),
            reviews: Table::Reviews.name().to_string(),
        }
    }
}

impl TableNames {
    pub fn resolve(&self, table: Table) -> &str {
        match table {
            Table::Products => &self.products,
            Table::Carts => &self.carts,
            Table::Orders => &self.orders,
            Table::Users => &self.users,
            Table::Reviews => &self.reviews,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub tables: TableNames,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Memory,
        };
        let database_url = lookup("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        let defaults = TableNames::default();
        let table = |key: &str, default: String| lookup(key).unwrap_or(default);
        let tables = TableNames {
            products: table("PRODUCTS_TABLE", defaults.products),
            carts: table("CARTS_TABLE", defaults.carts),
            orders: table("ORDERS_TABLE", defaults.orders),
            users: table("USERS_TABLE", defaults.users),
            reviews: table("REVIEWS_TABLE", defaults.reviews),
        };

        Ok(Self {
            host,
            port,
            backend,
            database_url,
            tables,
        })
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL is not set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.backend, StorageBackend::Memory);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.tables.resolve(Table::Orders), "orders");
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(config(&[("STORAGE_BACKEND", "postgres")]).is_err());
        let cfg = config(&[
            ("STORAGE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/shop"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url().unwrap(), "postgres://localhost/shop");
    }

    #[test]
    fn table_names_can_be_overridden() {
        let cfg = config(&[
            ("STORAGE_BACKEND", "dynamodb"),
            ("PRODUCTS_TABLE", "shop-prod-products"),
        ])
        .unwrap();
        assert_eq!(cfg.tables.resolve(Table::Products), "shop-prod-products");
        assert_eq!(cfg.tables.resolve(Table::Carts), "carts");
    }

    #[test]
    fn only_memory_backend_is_ephemeral() {
        assert!(!StorageBackend::Memory.is_persistent());
        assert!(StorageBackend::Postgres.is_persistent());
        assert!(StorageBackend::DynamoDb.is_persistent());
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(config(&[("STORAGE_BACKEND", "mongo")]).is_err());
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let cfg = config(&[("APP_PORT", "not-a-port")]).unwrap();
        assert_eq!(cfg.port, 3000);
    }
}
