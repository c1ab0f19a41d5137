//! Error types for the Neo4j adapter.

use thiserror::Error;

/// Errors raised by Neo4j operations before they are mapped to
/// [`bench_core::BenchError`].
#[derive(Error, Debug)]
pub enum Neo4jAdapterError {
    /// Neo4j database error
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A returned row or node could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}
