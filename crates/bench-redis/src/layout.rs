//! How records map onto Redis hashes.
//!
//! A record of target `loans` with id 7 lives in the hash `loans:7`, one
//! hash field per column. Values are stored as text; nulls as the empty
//! string.

use crate::error::RedisAdapterError;
use bench_core::{ColumnKind, DatasetSchema, Record, Value, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Key of the hash holding one record.
pub fn record_key(target: &str, id: &str) -> String {
    format!("{target}:{id}")
}

/// Pattern matching every record hash of a target.
pub fn key_pattern(target: &str) -> String {
    format!("{target}:*")
}

/// Hash key and field/value pairs for a record.
///
/// Records without an id column value are keyed by their position.
pub fn record_to_hash(
    target: &str,
    schema: &DatasetSchema,
    record: &Record,
    position: usize,
) -> (String, Vec<(String, String)>) {
    let id = record
        .get(&schema.id_column)
        .map(Value::to_text)
        .unwrap_or_else(|| position.to_string());
    let fields = record
        .fields()
        .map(|(name, value)| (name.to_string(), value.to_text()))
        .collect();
    (record_key(target, &id), fields)
}

/// Decode a fetched hash back into a typed record.
///
/// Fields are decoded in schema order; fields outside the schema are kept
/// as text.
pub fn hash_to_record(
    key: &str,
    schema: &DatasetSchema,
    mut hash: HashMap<String, String>,
) -> Result<Record, RedisAdapterError> {
    let mut record = Record::new();
    for column in &schema.columns {
        let Some(raw) = hash.remove(&column.name) else {
            continue;
        };
        let value = decode_field(&raw, column.kind).ok_or_else(|| RedisAdapterError::Decode {
            key: key.to_string(),
            field: column.name.clone(),
            value: raw.clone(),
        })?;
        record.set(column.name.clone(), value);
    }
    let mut rest: Vec<(String, String)> = hash.into_iter().collect();
    rest.sort();
    for (field, raw) in rest {
        record.set(field, Value::Text(raw));
    }
    Ok(record)
}

fn decode_field(raw: &str, kind: ColumnKind) -> Option<Value> {
    if raw.is_empty() {
        return Some(match kind {
            ColumnKind::Text => Value::Text(String::new()),
            _ => Value::Null,
        });
    }
    match kind {
        ColumnKind::Int => raw.parse().ok().map(Value::Int),
        ColumnKind::Float => raw.parse().ok().map(Value::Float),
        ColumnKind::Text => Some(Value::Text(raw.to_string())),
        ColumnKind::Timestamp => NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .ok()
            .map(Value::Timestamp),
    }
}
