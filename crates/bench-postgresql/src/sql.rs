//! SQL text and parameter building.

use bench_core::{ColumnDef, ColumnKind, DatasetSchema, Value};
use chrono::NaiveDateTime;
use tokio_postgres::types::ToSql;

/// Bind parameters a single statement may carry.
pub const MAX_PARAMETERS: usize = 65_535;

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"schema"."table"`, or just `"table"` without a schema.
pub fn qualified_table(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(table)),
        None => quote_ident(table),
    }
}

fn column_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Int => "BIGINT",
        ColumnKind::Float => "DOUBLE PRECISION",
        ColumnKind::Text => "TEXT",
        ColumnKind::Timestamp => "TIMESTAMP",
    }
}

/// Generate CREATE TABLE IF NOT EXISTS for a dataset schema.
pub fn generate_create_table(table: &str, schema: &DatasetSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|column| {
            let mut def = format!("{} {}", quote_ident(&column.name), column_type(column.kind));
            if !column.nullable && column.kind != ColumnKind::Text {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {table} ({})", columns.join(", "))
}

/// Multi-row INSERT with `$n` placeholders for `row_count` rows.
pub fn generate_insert(table: &str, columns: &[ColumnDef], row_count: usize) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut param_idx = 1;
    let placeholders: Vec<String> = (0..row_count)
        .map(|_| {
            let row: Vec<String> = (0..columns.len())
                .map(|_| {
                    let p = format!("${param_idx}");
                    param_idx += 1;
                    p
                })
                .collect();
            format!("({})", row.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO {table} ({column_list}) VALUES {}",
        placeholders.join(", ")
    )
}

/// Single-row UPDATE keyed on the id column.
///
/// Every non-id column is bound in order as `$1..$n`; the id is `$n+1`.
pub fn generate_update_by_id(table: &str, columns: &[ColumnDef], id_column: &str) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .filter(|c| c.name != id_column)
        .enumerate()
        .map(|(idx, c)| format!("{} = ${}", quote_ident(&c.name), idx + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE {} = ${}",
        assignments.join(", "),
        quote_ident(id_column),
        assignments.len() + 1
    )
}

/// SELECT of every column for the ids bound as one `BIGINT[]` parameter.
pub fn generate_select_ids(table: &str, columns: &[ColumnDef], id_column: &str) -> String {
    format!(
        "SELECT {} FROM {table} WHERE {} = ANY($1)",
        columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", "),
        quote_ident(id_column)
    )
}

/// Rows per INSERT so one statement stays under [`MAX_PARAMETERS`].
pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_PARAMETERS / column_count.max(1)).max(1)
}

/// Box a value as a parameter typed after its column.
///
/// Nulls still need the column's Rust type, since tokio-postgres checks
/// that every parameter accepts the inferred SQL type.
pub fn value_to_param(value: &Value, kind: ColumnKind) -> Box<dyn ToSql + Sync + Send> {
    match (value, kind) {
        (Value::Null, ColumnKind::Int) => Box::new(None::<i64>),
        (Value::Null, ColumnKind::Float) => Box::new(None::<f64>),
        (Value::Null, ColumnKind::Text) => Box::new(None::<String>),
        (Value::Null, ColumnKind::Timestamp) => Box::new(None::<NaiveDateTime>),
        (Value::Int(i), ColumnKind::Float) => Box::new(*i as f64),
        (Value::Int(i), _) => Box::new(*i),
        (Value::Float(f), _) => Box::new(*f),
        (Value::Text(s), _) => Box::new(s.clone()),
        (Value::Timestamp(ts), ColumnKind::Text) => Box::new(ts.to_string()),
        (Value::Timestamp(ts), _) => Box::new(*ts),
    }
}
