//! Cypher text building.

use bench_core::{Record, Value};

/// Nodes created per UNWIND statement.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Quote a label or property key with backticks.
pub fn escape_identifier(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

pub fn escape_neo4j_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("'{escaped}'")
}

/// Render a value as a Cypher literal.
pub fn value_to_cypher(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Int(i) => i.to_string(),
        // Neo4j doesn't support NaN
        Value::Float(f) if !f.is_finite() => "null".to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Text(s) => escape_neo4j_string(s),
        Value::Timestamp(ts) => {
            format!("localdatetime('{}')", ts.format("%Y-%m-%dT%H:%M:%S%.f"))
        }
    }
}

/// Property map literal, e.g. `{`LoanID`: 1, `ReturnDate`: null}`.
pub fn record_to_map(record: &Record) -> String {
    let props: Vec<String> = record
        .fields()
        .map(|(name, value)| format!("{}: {}", escape_identifier(name), value_to_cypher(value)))
        .collect();
    format!("{{{}}}", props.join(", "))
}

/// One statement creating a node per record, returning the created count.
pub fn build_create_batch(label: &str, records: &[Record]) -> String {
    let maps: Vec<String> = records.iter().map(record_to_map).collect();
    format!(
        "UNWIND [{}] AS props CREATE (n:{}) SET n = props RETURN count(n) AS created",
        maps.join(", "),
        escape_identifier(label)
    )
}

pub fn build_update_all(label: &str, field: &str, value: &Value) -> String {
    format!(
        "MATCH (n:{}) SET n.{} = {} RETURN count(n) AS updated",
        escape_identifier(label),
        escape_identifier(field),
        value_to_cypher(value)
    )
}

pub fn build_delete_all(label: &str) -> String {
    format!(
        "MATCH (n:{}) DETACH DELETE n RETURN count(n) AS deleted",
        escape_identifier(label)
    )
}

/// Range match on the id property; bounds are the `$start`/`$end` parameters.
pub fn build_range_match(label: &str, id_property: &str) -> String {
    let id = escape_identifier(id_property);
    format!(
        "MATCH (n:{}) WHERE n.{id} >= $start AND n.{id} <= $end RETURN n",
        escape_identifier(label)
    )
}

/// Rewrite existing nodes from their records, matched on the id property.
pub fn build_update_batch(label: &str, id_property: &str, records: &[Record]) -> String {
    let maps: Vec<String> = records.iter().map(record_to_map).collect();
    let id = escape_identifier(id_property);
    format!(
        "UNWIND [{}] AS props MATCH (n:{}) WHERE n.{id} = props.{id} \
         SET n += props RETURN count(n) AS updated",
        maps.join(", "),
        escape_identifier(label)
    )
}

/// Delete the nodes whose id is in the `$ids` parameter.
pub fn build_delete_ids(label: &str, id_property: &str) -> String {
    format!(
        "MATCH (n:{}) WHERE n.{} IN $ids DETACH DELETE n RETURN count(n) AS deleted",
        escape_identifier(label),
        escape_identifier(id_property)
    )
}

pub fn build_ids_match(label: &str, id_property: &str) -> String {
    format!(
        "MATCH (n:{}) WHERE n.{} IN $ids RETURN n",
        escape_identifier(label),
        escape_identifier(id_property)
    )
}
