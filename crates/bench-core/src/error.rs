//! Error types shared by the runner and every backend adapter.

use thiserror::Error;

/// Boxed driver error carried by the backend variants.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running a benchmark scenario.
#[derive(Error, Debug)]
pub enum BenchError {
    /// The store is unreachable or rejected the credentials.
    #[error("{backend} connection error: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: DriverError,
    },

    /// An insert, update, delete or reset was not acknowledged.
    #[error("{backend} {operation} failed: {source}")]
    Write {
        backend: &'static str,
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    /// A retrieval failed or its result could not be materialized.
    #[error("{backend} {operation} failed: {source}")]
    Read {
        backend: &'static str,
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    /// The backend has no implementation for this primitive.
    #[error("{backend} does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// The scenario plan is not runnable (e.g. zero iterations).
    #[error("Invalid benchmark plan: {0}")]
    InvalidPlan(String),
}

impl BenchError {
    pub fn connection(backend: &'static str, source: impl Into<DriverError>) -> Self {
        Self::Connection {
            backend,
            source: source.into(),
        }
    }

    pub fn write(
        backend: &'static str,
        operation: &'static str,
        source: impl Into<DriverError>,
    ) -> Self {
        Self::Write {
            backend,
            operation,
            source: source.into(),
        }
    }

    pub fn read(
        backend: &'static str,
        operation: &'static str,
        source: impl Into<DriverError>,
    ) -> Self {
        Self::Read {
            backend,
            operation,
            source: source.into(),
        }
    }

    pub fn unsupported(backend: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }
}
