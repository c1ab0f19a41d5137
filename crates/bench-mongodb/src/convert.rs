//! Record <-> BSON document conversion.

use crate::error::MongoDBAdapterError;
use bench_core::{Record, Value};
use bson::{Bson, Document};

/// Convert a record into a BSON document, one field per column.
///
/// MongoDB assigns `_id`; the dataset id stays a regular field.
pub fn record_to_document(record: &Record) -> Document {
    let mut doc = Document::new();
    for (name, value) in record.fields() {
        doc.insert(name, value_to_bson(value));
    }
    doc
}

pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Int(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::Text(s) => Bson::String(s.clone()),
        Value::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_chrono(ts.and_utc())),
    }
}

/// Decode a fetched document back into a record.
pub fn document_to_record(doc: &Document) -> Result<Record, MongoDBAdapterError> {
    let mut record = Record::new();
    for (key, bson) in doc {
        let value = match bson {
            Bson::Null => Value::Null,
            Bson::Int32(i) => Value::Int(i64::from(*i)),
            Bson::Int64(i) => Value::Int(*i),
            Bson::Double(f) => Value::Float(*f),
            Bson::String(s) => Value::Text(s.clone()),
            Bson::DateTime(dt) => Value::Timestamp(dt.to_chrono().naive_utc()),
            Bson::ObjectId(oid) => Value::Text(oid.to_hex()),
            other => {
                return Err(MongoDBAdapterError::Decode(format!(
                    "field '{key}' has unsupported type {:?}",
                    other.element_type()
                )))
            }
        };
        record.set(key.clone(), value);
    }
    Ok(record)
}
