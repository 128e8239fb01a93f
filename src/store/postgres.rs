//! Postgres document store.
//!
//! Each table is `(pk TEXT, sk TEXT, item JSONB)` with `(pk, sk)` as primary
//! key; `sk` is the empty string for tables without a sort key. Secondary
//! index queries run against attributes inside `item`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};

use super::{Item, Key, KeyValueStore, Query, StoreResult, Table};
use crate::db::DbPool;
use crate::update::UpdateInstruction;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: DbPool,
}

impl PostgresStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn sort_value(key: &Key) -> &str {
    key.sort.as_deref().unwrap_or("")
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Item>> {
        let row: Option<(Json<Item>,)> = sqlx::query_as(&format!(
            "SELECT item FROM {} WHERE pk = $1 AND sk = $2",
            table.name()
        ))
        .bind(&key.partition)
        .bind(sort_value(key))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(item),)| item))
    }

    async fn put(&self, table: Table, item: Item) -> StoreResult<()> {
        let key = Key::from_item(table, &item)?;
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (pk, sk, item)
            VALUES ($1, $2, $3)
            ON CONFLICT (pk, sk) DO UPDATE SET item = EXCLUDED.item
            "#,
            table.name()
        ))
        .bind(&key.partition)
        .bind(sort_value(&key))
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        tracing::debug!(table = table.name(), pk = %key.partition, "item stored");
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &Key,
        update: &UpdateInstruction,
    ) -> StoreResult<Option<Item>> {
        table.check_update(update)?;
        let patch: Item = update
            .assignments()
            .map(|(attribute, value)| (attribute.to_string(), value.clone()))
            .collect();

        let row: Option<(Json<Item>,)> = sqlx::query_as(&format!(
            r#"
            UPDATE {}
            SET item = item || $3
            WHERE pk = $1 AND sk = $2
            RETURNING item
            "#,
            table.name()
        ))
        .bind(&key.partition)
        .bind(sort_value(key))
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(item),)| item))
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE pk = $1 AND sk = $2",
            table.name()
        ))
        .bind(&key.partition)
        .bind(sort_value(key))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Item>> {
        let keys = table.query_keys(query.index)?;
        let direction = if query.descending { "DESC" } else { "ASC" };

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT item FROM {} WHERE TRUE", table.name()));

        match query.index {
            None => {
                if let Some(partition) = &query.partition {
                    builder.push(" AND pk = ").push_bind(partition.clone());
                }
                builder.push(format!(" ORDER BY pk {direction}, sk {direction}"));
            }
            Some(_) => {
                builder
                    .push(" AND item ? ")
                    .push_bind(keys.partition_key);
                if let Some(sort_key) = keys.sort_key {
                    builder.push(" AND item ? ").push_bind(sort_key);
                }
                if let Some(partition) = &query.partition {
                    builder
                        .push(" AND item ->> ")
                        .push_bind(keys.partition_key)
                        .push(" = ")
                        .push_bind(partition.clone());
                }
                match keys.sort_key {
                    Some(sort_key) if query.partition.is_some() => {
                        builder
                            .push(" ORDER BY item -> ")
                            .push_bind(sort_key)
                            .push(format!(" {direction}"));
                    }
                    _ => {
                        builder.push(format!(" ORDER BY pk {direction}, sk {direction}"));
                    }
                }
            }
        }

        let rows: Vec<(Json<Item>,)> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(item),)| item).collect())
    }
}
