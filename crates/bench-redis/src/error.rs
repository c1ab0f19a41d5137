//! Error types for the Redis adapter.

use thiserror::Error;

/// Errors raised by Redis operations before they are mapped to
/// [`bench_core::BenchError`].
#[derive(Error, Debug)]
pub enum RedisAdapterError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored hash field does not parse as its column's kind.
    #[error("Key '{key}', field '{field}': cannot parse '{value}'")]
    Decode {
        key: String,
        field: String,
        value: String,
    },
}
