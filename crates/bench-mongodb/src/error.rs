//! Error types for the MongoDB adapter.

use thiserror::Error;

/// Errors raised by MongoDB operations before they are mapped to
/// [`bench_core::BenchError`].
#[derive(Error, Debug)]
pub enum MongoDBAdapterError {
    /// MongoDB connection or query error.
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    /// A returned document could not be decoded.
    #[error("Document decode error: {0}")]
    Decode(String),
}
