//! The uniform capability interface every backing store is driven through.

use crate::error::BenchError;
use crate::values::{DatasetSchema, Record, Value};
use async_trait::async_trait;

/// The collection/table/label/key prefix a scenario runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub schema: DatasetSchema,
}

impl Target {
    pub fn new(name: impl Into<String>, schema: DatasetSchema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn id_column(&self) -> &str {
        &self.schema.id_column
    }
}

/// A uniform single-field update applied to every stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub field: String,
    pub value: Value,
}

impl Patch {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

/// Inclusive id range used by range retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub start: i64,
    pub end: i64,
}

impl IdRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, id: i64) -> bool {
        id >= self.start && id <= self.end
    }
}

impl std::fmt::Display for IdRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

/// CRUD primitives over one open store handle.
///
/// Connecting is each adapter's constructor; `close` consumes the adapter so
/// the handle is released exactly once.
#[async_trait]
pub trait BackendAdapter: Send {
    /// Name used in logs and result file names.
    fn name(&self) -> &'static str;

    /// Make sure the target can receive rows. Schemaless stores do nothing.
    async fn prepare(&mut self, _target: &Target) -> Result<(), BenchError> {
        Ok(())
    }

    /// Delete everything stored under the target. Safe on an empty target.
    async fn reset(&mut self, target: &Target) -> Result<(), BenchError>;

    /// Insert the records, returning the acknowledged count.
    async fn insert_batch(&mut self, target: &Target, records: &[Record])
        -> Result<u64, BenchError>;

    /// Set `patch.field` to `patch.value` on every stored record.
    async fn update_all(&mut self, target: &Target, patch: &Patch) -> Result<u64, BenchError>;

    /// Remove every stored record.
    async fn delete_all(&mut self, target: &Target) -> Result<u64, BenchError>;

    /// Fetch and fully materialize the records whose id lies in `range`.
    async fn retrieve_range(&mut self, target: &Target, range: IdRange)
        -> Result<usize, BenchError>;

    /// Rewrite each stored record matching a given record's id with that
    /// record's fields, one record at a time. Returns the matched count.
    async fn update_records(&mut self, target: &Target, records: &[Record])
        -> Result<u64, BenchError>;

    /// Remove the records with the given ids.
    async fn delete_ids(&mut self, target: &Target, ids: &[i64]) -> Result<u64, BenchError>;

    /// Fetch and fully materialize the records with the given ids.
    async fn retrieve_ids(&mut self, target: &Target, ids: &[i64]) -> Result<usize, BenchError>;

    /// Set every field/value pair on a single hash key.
    async fn insert_hash(
        &mut self,
        _key: &str,
        _pairs: &[(String, String)],
    ) -> Result<u64, BenchError> {
        Err(BenchError::unsupported(self.name(), "insert_hash"))
    }

    /// Fetch a whole hash, returning the number of fields.
    async fn retrieve_hash(&mut self, _key: &str) -> Result<usize, BenchError> {
        Err(BenchError::unsupported(self.name(), "retrieve_hash"))
    }

    /// Release the store handle.
    async fn close(self: Box<Self>) -> Result<(), BenchError>;
}
