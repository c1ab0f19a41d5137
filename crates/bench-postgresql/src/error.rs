//! Error types for the PostgreSQL adapter.

use thiserror::Error;

/// Errors raised by PostgreSQL operations before they are mapped to
/// [`bench_core::BenchError`].
#[derive(Error, Debug)]
pub enum PostgreSQLAdapterError {
    /// PostgreSQL connection or query error
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Background connection task failed
    #[error("Connection task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Patched or retrieved column is not part of the target schema
    #[error("Column '{column}' is not defined for table '{table}'")]
    UnknownColumn { table: String, column: String },
}
