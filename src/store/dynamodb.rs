//! DynamoDB store.
//!
//! Update instructions keep the builder's aliases and clause order and are
//! guarded so an update never creates an item. DynamoDB rejects empty strings
//! as index keys, so blank index-key attributes are left out of puts and
//! `REMOVE`d by updates; the item then drops out of that index.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use serde_json::{Number, Value};

use super::{Item, Key, KeySchema, KeyValueStore, Query, StoreError, StoreResult, Table};
use crate::config::TableNames;
use crate::update::UpdateInstruction;

const KEY_NAME_ALIAS: &str = "#__pk";
const KEY_VALUE_ALIAS: &str = ":__pk";

pub struct DynamoDbStore {
    client: Client,
    tables: TableNames,
}

impl DynamoDbStore {
    pub fn new(client: Client, tables: TableNames) -> Self {
        Self { client, tables }
    }

    /// Build a client from the default AWS credential chain.
    pub async fn from_env(tables: TableNames) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), tables)
    }

    fn table_name(&self, table: Table) -> &str {
        self.tables.resolve(table)
    }
}

fn backend_error(err: impl std::error::Error) -> StoreError {
    StoreError::Backend(DisplayErrorContext(err).to_string())
}

fn key_attributes(schema: KeySchema, key: &Key) -> HashMap<String, AttributeValue> {
    let mut attributes = HashMap::new();
    attributes.insert(
        schema.partition_key.to_string(),
        AttributeValue::S(key.partition.clone()),
    );
    if let (Some(sort_key), Some(sort)) = (schema.sort_key, &key.sort) {
        attributes.insert(sort_key.to_string(), AttributeValue::S(sort.clone()));
    }
    attributes
}

#[async_trait]
impl KeyValueStore for DynamoDbStore {
    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(self.table_name(table))
            .set_key(Some(key_attributes(table.keys(), key)))
            .send()
            .await
            .map_err(backend_error)?;

        output.item.map(|item| attributes_to_item(&item)).transpose()
    }

    async fn put(&self, table: Table, item: Item) -> StoreResult<()> {
        Key::from_item(table, &item)?;
        self.client
            .put_item()
            .table_name(self.table_name(table))
            .set_item(Some(index_safe_attributes(table, &item)))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &Key,
        update: &UpdateInstruction,
    ) -> StoreResult<Option<Item>> {
        table.check_update(update)?;
        let UpdateRequest {
            expression,
            mut names,
            values,
        } = update_request(table, update);
        names.insert(
            KEY_NAME_ALIAS.to_string(),
            table.keys().partition_key.to_string(),
        );

        let result = self
            .client
            .update_item()
            .table_name(self.table_name(table))
            .set_key(Some(key_attributes(table.keys(), key)))
            .update_expression(expression)
            .condition_expression(format!("attribute_exists({KEY_NAME_ALIAS})"))
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => output
                .attributes
                .map(|item| attributes_to_item(&item))
                .transpose(),
            Err(err) => match err.into_service_error() {
                UpdateItemError::ConditionalCheckFailedException(_) => Ok(None),
                other => Err(backend_error(other)),
            },
        }
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(self.table_name(table))
            .set_key(Some(key_attributes(table.keys(), key)))
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn query(&self, table: Table, query: &Query) -> StoreResult<Vec<Item>> {
        let keys = table.query_keys(query.index)?;

        let pages: Vec<HashMap<String, AttributeValue>> = match &query.partition {
            None => self
                .client
                .scan()
                .table_name(self.table_name(table))
                .set_index_name(query.index.map(str::to_string))
                .into_paginator()
                .items()
                .send()
                .collect::<Result<Vec<_>, _>>()
                .await
                .map_err(backend_error)?,
            Some(partition) => self
                .client
                .query()
                .table_name(self.table_name(table))
                .set_index_name(query.index.map(str::to_string))
                .key_condition_expression(format!("{KEY_NAME_ALIAS} = {KEY_VALUE_ALIAS}"))
                .expression_attribute_names(KEY_NAME_ALIAS, keys.partition_key)
                .expression_attribute_values(
                    KEY_VALUE_ALIAS,
                    AttributeValue::S(partition.clone()),
                )
                .scan_index_forward(!query.descending)
                .into_paginator()
                .items()
                .send()
                .collect::<Result<Vec<_>, _>>()
                .await
                .map_err(backend_error)?,
        };

        pages.iter().map(attributes_to_item).collect()
    }
}

/// Update expression plus the alias maps it uses.
#[derive(Debug, Default, PartialEq)]
pub struct UpdateRequest {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

fn index_key_attributes(table: Table) -> impl Iterator<Item = &'static str> {
    table
        .indexes()
        .iter()
        .flat_map(|index| std::iter::once(index.keys.partition_key).chain(index.keys.sort_key))
}

fn is_blank(value: &Value) -> bool {
    value.is_null() || value.as_str() == Some("")
}

/// Item attributes with blank index keys left out.
pub fn index_safe_attributes(table: Table, item: &Item) -> HashMap<String, AttributeValue> {
    let mut attributes = item_to_attributes(item);
    for attribute in index_key_attributes(table) {
        if item.get(attribute).is_some_and(is_blank) {
            attributes.remove(attribute);
        }
    }
    attributes
}

/// Render `update` for `UpdateItem`: `SET` for every assignment, except blank
/// index keys which go to a trailing `REMOVE`.
pub fn update_request(table: Table, update: &UpdateInstruction) -> UpdateRequest {
    let index_keys: Vec<&str> = index_key_attributes(table).collect();
    let mut request = UpdateRequest::default();
    let mut set = Vec::new();
    let mut remove = Vec::new();

    for clause in update.clauses() {
        let (Some(name), Some(value)) = (
            update.names().get(&clause.name_alias),
            update.values().get(&clause.value_alias),
        ) else {
            continue;
        };
        request
            .names
            .insert(clause.name_alias.clone(), name.clone());
        if index_keys.contains(&name.as_str()) && is_blank(value) {
            remove.push(clause.name_alias.clone());
        } else {
            set.push(format!("{} = {}", clause.name_alias, clause.value_alias));
            request
                .values
                .insert(clause.value_alias.clone(), value_to_attribute(value));
        }
    }

    request.expression = format!("SET {}", set.join(", "));
    if !remove.is_empty() {
        request.expression.push_str(&format!(" REMOVE {}", remove.join(", ")));
    }
    request
}

pub fn item_to_attributes(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_attribute(value)))
        .collect()
}

pub fn attributes_to_item(attributes: &HashMap<String, AttributeValue>) -> StoreResult<Item> {
    attributes
        .iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_value(value)?)))
        .collect()
}

pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(item_to_attributes(map)),
    }
}

pub fn attribute_to_value(attribute: &AttributeValue) -> StoreResult<Value> {
    match attribute {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::L(values) => values
            .iter()
            .map(attribute_to_value)
            .collect::<StoreResult<Vec<_>>>()
            .map(Value::Array),
        AttributeValue::M(map) => attributes_to_item(map).map(Value::Object),
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => values
            .iter()
            .map(|n| parse_number(n))
            .collect::<StoreResult<Vec<_>>>()
            .map(Value::Array),
        other => Err(StoreError::Backend(format!(
            "unsupported attribute type: {other:?}"
        ))),
    }
}

fn parse_number(raw: &str) -> StoreResult<Value> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| StoreError::Backend(format!("invalid number attribute `{raw}`")))
}
