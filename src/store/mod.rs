//! Key-value storage collaborator.
//!
//! Every entity lives in its own table and is stored as an opaque JSON
//! document. Handlers talk to storage exclusively through the five verbs of
//! [`KeyValueStore`]; backends differ only in where the documents end up.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::update::UpdateInstruction;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A stored record: attribute name -> value.
pub type Item = Map<String, Value>;

pub const CATEGORY_RATING_INDEX: &str = "CategoryRatingIndex";
pub const USER_ID_CREATED_AT_INDEX: &str = "UserIdCreatedAtIndex";
pub const EMAIL_INDEX: &str = "EmailIndex";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item for table `{table}` is missing key attribute `{attribute}`")]
    MissingKey {
        table: &'static str,
        attribute: &'static str,
    },

    #[error("key attribute `{attribute}` of table `{table}` cannot be updated")]
    KeyUpdate {
        table: &'static str,
        attribute: String,
    },

    #[error("table `{table}` has no index `{index}`")]
    UnknownIndex { table: &'static str, index: String },

    #[error("stored item is not a JSON object")]
    NotAnObject,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key attributes of a table or of one of its secondary indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: &'static str,
    pub sort_key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: &'static str,
    pub keys: KeySchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Products,
    Carts,
    Orders,
    Users,
    Reviews,
}

impl Table {
    /// Logical table name. Postgres uses it verbatim; DynamoDB maps it through
    /// [`crate::config::TableNames`].
    pub fn name(self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Carts => "carts",
            Table::Orders => "orders",
            Table::Users => "users",
            Table::Reviews => "reviews",
        }
    }

    pub fn keys(self) -> KeySchema {
        match self {
            Table::Products => KeySchema {
                partition_key: "productId",
                sort_key: None,
            },
            Table::Carts => KeySchema {
                partition_key: "userId",
                sort_key: Some("productId"),
            },
            Table::Orders => KeySchema {
                partition_key: "orderId",
                sort_key: None,
            },
            Table::Users => KeySchema {
                partition_key: "userId",
                sort_key: None,
            },
            Table::Reviews => KeySchema {
                partition_key: "productId",
                sort_key: Some("reviewId"),
            },
        }
    }

    pub fn indexes(self) -> &'static [IndexSchema] {
        match self {
            Table::Products => &[IndexSchema {
                name: CATEGORY_RATING_INDEX,
                keys: KeySchema {
                    partition_key: "category",
                    sort_key: Some("rating"),
                },
            }],
            Table::Carts => &[],
            Table::Orders | Table::Reviews => &[IndexSchema {
                name: USER_ID_CREATED_AT_INDEX,
                keys: KeySchema {
                    partition_key: "userId",
                    sort_key: Some("createdAt"),
                },
            }],
            Table::Users => &[IndexSchema {
                name: EMAIL_INDEX,
                keys: KeySchema {
                    partition_key: "email",
                    sort_key: None,
                },
            }],
        }
    }

    /// Key schema used by `query`: the table's own keys, or the index's.
    pub fn query_keys(self, index: Option<&str>) -> StoreResult<KeySchema> {
        match index {
            None => Ok(self.keys()),
            Some(name) => self
                .indexes()
                .iter()
                .find(|ix| ix.name == name)
                .map(|ix| ix.keys)
                .ok_or_else(|| StoreError::UnknownIndex {
                    table: self.name(),
                    index: name.to_string(),
                }),
        }
    }

    /// Reject instructions that would rewrite a primary key attribute.
    pub fn check_update(self, update: &UpdateInstruction) -> StoreResult<()> {
        let keys = self.keys();
        for attribute in update.attributes() {
            if attribute == keys.partition_key || Some(attribute) == keys.sort_key {
                return Err(StoreError::KeyUpdate {
                    table: self.name(),
                    attribute: attribute.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Primary key of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub partition: String,
    pub sort: Option<String>,
}

impl Key {
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }

    /// Read the primary key of `table` out of a full item.
    pub fn from_item(table: Table, item: &Item) -> StoreResult<Self> {
        let keys = table.keys();
        let partition = string_attribute(table, item, keys.partition_key)?;
        let sort = match keys.sort_key {
            Some(attribute) => Some(string_attribute(table, item, attribute)?),
            None => None,
        };
        Ok(Self { partition, sort })
    }
}

fn string_attribute(table: Table, item: &Item, attribute: &'static str) -> StoreResult<String> {
    item.get(attribute)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(StoreError::MissingKey {
            table: table.name(),
            attribute,
        })
}

/// Query or scan request.
///
/// Without a partition value the request is a scan (of the table, or of the
/// index when one is named). With one, it matches the partition attribute by
/// equality and orders by the sort attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub index: Option<&'static str>,
    pub partition: Option<String>,
    pub descending: bool,
}

impl Query {
    pub fn scan() -> Self {
        Self::default()
    }

    pub fn partition(value: impl Into<String>) -> Self {
        Self {
            partition: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn index(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            index: Some(name),
            partition: Some(value.into()),
            descending: false,
        }
    }

    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// The five storage verbs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Item>>;

    /// Insert or replace a whole item. The key is read from the item itself.
    async fn put(&self, table: Table, item: Item) -> StoreResult<()>;

    /// Apply `update` to an existing item and return the item after the
    /// update. Returns `None` without writing when the key is absent.
    async fn update(
        &self,
        table: Table,
        key: &Key,
        update: &UpdateInstruction,
    ) -> StoreResult<Option<Item>>;

    /// Remove an item. Deleting an absent key is not an error.
    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()>;

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Item>>;
}

pub fn to_item<T: Serialize>(record: &T) -> StoreResult<Item> {
    match serde_json::to_value(record)? {
        Value::Object(item) => Ok(item),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Ordering used for sort keys: numbers numerically, strings lexically.
/// Values of different kinds order by kind so sorting stays total.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_is_read_from_item() {
        let item = to_item(&json!({ "userId": "u1", "productId": "p1", "quantity": 2 })).unwrap();
        assert_eq!(
            Key::from_item(Table::Carts, &item).unwrap(),
            Key::composite("u1", "p1")
        );
    }

    #[test]
    fn missing_key_attribute_is_reported() {
        let item = to_item(&json!({ "userId": "u1" })).unwrap();
        let err = Key::from_item(Table::Carts, &item).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingKey {
                attribute: "productId",
                ..
            }
        ));
    }

    #[test]
    fn unknown_index_is_rejected() {
        assert!(Table::Carts.query_keys(Some(EMAIL_INDEX)).is_err());
        assert_eq!(
            Table::Users.query_keys(Some(EMAIL_INDEX)).unwrap().partition_key,
            "email"
        );
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(9), &json!(10.5)), Ordering::Less);
        assert_eq!(compare_values(&json!("9"), &json!("10")), Ordering::Greater);
    }
}
