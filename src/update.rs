//! Partial update instructions.
//!
//! Every entity that is mutated in place (products, users, cart items, orders,
//! reviews) goes through [`build_partial_update`]. The entity declares the
//! attributes a client may change; the builder turns a JSON request body into
//! a store-level instruction that touches only the attributes present in the
//! body and always stamps `updatedAt`.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Attribute rewritten by every mutating call.
pub const UPDATED_AT: &str = "updatedAt";

/// Render a timestamp the way every record stores it: RFC 3339, UTC,
/// millisecond precision, `Z` suffix. Lexicographic order matches time order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One `SET #name = :name` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClause {
    pub name_alias: String,
    pub value_alias: String,
}

/// Store-level update: ordered set-clauses plus the alias maps they refer to.
///
/// Aliases exist so attribute names never collide with reserved words of an
/// expression-based store. Stores that apply updates structurally use
/// [`UpdateInstruction::assignments`] instead of the rendered expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInstruction {
    clauses: Vec<SetClause>,
    names: BTreeMap<String, String>,
    values: BTreeMap<String, Value>,
}

impl UpdateInstruction {
    pub fn clauses(&self) -> &[SetClause] {
        &self.clauses
    }

    /// `#alias` -> attribute name.
    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    /// `:alias` -> new value.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// `SET #a = :a, #b = :b, #updatedAt = :updatedAt`
    pub fn expression(&self) -> String {
        let assignments: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| format!("{} = {}", clause.name_alias, clause.value_alias))
            .collect();
        format!("SET {}", assignments.join(", "))
    }

    /// Resolved `(attribute, value)` pairs in clause order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.clauses.iter().filter_map(|clause| {
            let name = self.names.get(&clause.name_alias)?;
            let value = self.values.get(&clause.value_alias)?;
            Some((name.as_str(), value))
        })
    }

    /// Attribute names touched by this instruction, in clause order.
    pub fn attributes(&self) -> Vec<&str> {
        self.assignments().map(|(name, _)| name).collect()
    }

    fn push(&mut self, attribute: &str, value: Value) {
        let name_alias = format!("#{attribute}");
        let value_alias = format!(":{attribute}");
        self.names.insert(name_alias.clone(), attribute.to_string());
        self.values.insert(value_alias.clone(), value);
        self.clauses.push(SetClause {
            name_alias,
            value_alias,
        });
    }
}

/// Build an update touching every field of `fields` that `payload` defines,
/// in `fields` order, followed by `updatedAt = now`.
///
/// Presence decides inclusion: `0`, `""`, `false` and `null` all count.
/// Payload keys outside `fields` are dropped. An empty payload still yields
/// a timestamp-only update.
pub fn build_partial_update(
    payload: &Map<String, Value>,
    fields: &[&str],
    now: DateTime<Utc>,
) -> UpdateInstruction {
    let mut instruction = UpdateInstruction {
        clauses: Vec::with_capacity(fields.len() + 1),
        names: BTreeMap::new(),
        values: BTreeMap::new(),
    };

    for field in fields {
        if *field == UPDATED_AT || instruction.names.contains_key(&format!("#{field}")) {
            continue;
        }
        if let Some(value) = payload.get(*field) {
            instruction.push(field, value.clone());
        }
    }

    instruction.push(UPDATED_AT, Value::String(timestamp(now)));
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const PRODUCT_FIELDS: &[&str] = &["name", "description", "price", "stock"];

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn includes_present_fields_in_declared_order() {
        let body = payload(json!({ "stock": 3, "name": "Mug", "price": 12.5 }));
        let update = build_partial_update(&body, PRODUCT_FIELDS, fixed_now());

        assert_eq!(update.attributes(), vec!["name", "price", "stock", UPDATED_AT]);
        assert_eq!(
            update.expression(),
            "SET #name = :name, #price = :price, #stock = :stock, #updatedAt = :updatedAt"
        );
        assert_eq!(update.values()[":price"], json!(12.5));
        assert_eq!(update.names()["#stock"], "stock");
    }

    #[test]
    fn falsy_values_count_as_present() {
        let body = payload(json!({
            "name": "",
            "description": null,
            "price": 0,
            "stock": 0
        }));
        let update = build_partial_update(&body, PRODUCT_FIELDS, fixed_now());

        assert_eq!(
            update.attributes(),
            vec!["name", "description", "price", "stock", UPDATED_AT]
        );
        assert_eq!(update.values()[":stock"], json!(0));
        assert_eq!(update.values()[":description"], Value::Null);
    }

    #[test]
    fn empty_payload_is_timestamp_only() {
        let update = build_partial_update(&Map::new(), PRODUCT_FIELDS, fixed_now());

        assert_eq!(update.clauses().len(), 1);
        assert_eq!(update.expression(), "SET #updatedAt = :updatedAt");
        assert_eq!(
            update.values()[":updatedAt"],
            json!("2024-05-01T12:30:00.000Z")
        );
    }

    #[test]
    fn unrecognized_fields_are_dropped_everywhere() {
        let body = payload(json!({ "price": 4, "productId": "other", "isAdmin": true }));
        let update = build_partial_update(&body, PRODUCT_FIELDS, fixed_now());

        assert_eq!(update.attributes(), vec!["price", UPDATED_AT]);
        assert!(!update.expression().contains("productId"));
        assert!(!update.expression().contains("isAdmin"));
        assert!(update.names().values().all(|n| n != "productId" && n != "isAdmin"));
        assert!(!update.values().contains_key(":productId"));
    }

    #[test]
    fn timestamp_clause_is_always_last_and_unique() {
        let body = payload(json!({ "updatedAt": "1999-01-01T00:00:00.000Z", "name": "x" }));
        let fields = ["name", UPDATED_AT, "name"];
        let update = build_partial_update(&body, &fields, fixed_now());

        assert_eq!(update.attributes(), vec!["name", UPDATED_AT]);
        assert_eq!(
            update.values()[":updatedAt"],
            json!("2024-05-01T12:30:00.000Z")
        );
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = timestamp(Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap());
        let later = timestamp(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }
}
