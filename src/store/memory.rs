//! In-process store.
//!
//! Keeps each table in an ordered map behind a `tokio` lock. Nothing is
//! persisted; this is the default backend for local runs and for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Item, Key, KeyValueStore, Query, StoreResult, Table, compare_values};
use crate::update::UpdateInstruction;

type Rows = BTreeMap<(String, String), Item>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, Rows>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn row_key(key: &Key) -> (String, String) {
    (key.partition.clone(), key.sort.clone().unwrap_or_default())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.get(&row_key(key)))
            .cloned())
    }

    async fn put(&self, table: Table, item: Item) -> StoreResult<()> {
        let key = Key::from_item(table, &item)?;
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().insert(row_key(&key), item);
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &Key,
        update: &UpdateInstruction,
    ) -> StoreResult<Option<Item>> {
        table.check_update(update)?;
        let mut tables = self.tables.write().await;
        let Some(item) = tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(&row_key(key)))
        else {
            return Ok(None);
        };
        for (attribute, value) in update.assignments() {
            item.insert(attribute.to_string(), value.clone());
        }
        Ok(Some(item.clone()))
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.remove(&row_key(key));
        }
        Ok(())
    }

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Item>> {
        let keys = table.query_keys(query.index)?;
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        // Index entries only exist for items carrying every index attribute.
        let mut items: Vec<Item> = rows
            .values()
            .filter(|item| {
                query.index.is_none()
                    || (item.contains_key(keys.partition_key)
                        && keys.sort_key.is_none_or(|sk| item.contains_key(sk)))
            })
            .filter(|item| match &query.partition {
                Some(value) => {
                    item.get(keys.partition_key).and_then(Value::as_str) == Some(value.as_str())
                }
                None => true,
            })
            .cloned()
            .collect();

        if let (Some(_), Some(sort_key)) = (&query.partition, keys.sort_key) {
            items.sort_by(|a, b| {
                compare_values(
                    a.get(sort_key).unwrap_or(&Value::Null),
                    b.get(sort_key).unwrap_or(&Value::Null),
                )
            });
        }
        if query.descending {
            items.reverse();
        }
        Ok(items)
    }
}
