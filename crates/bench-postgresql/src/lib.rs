//! PostgreSQL backend for dbms-bench.
//!
//! Every target is a table named after it, created on first use from the
//! dataset schema. Inserts are multi-row statements inside one transaction,
//! split so no statement exceeds the bind parameter limit.

mod adapter;
mod args;
mod error;
mod sql;

pub use adapter::PostgreSQLAdapter;
pub use args::PostgreSQLArgs;
pub use error::PostgreSQLAdapterError;
pub use sql::{generate_create_table, generate_insert, qualified_table, quote_ident};
