//! In-memory backend used for dry runs and tests.

use crate::adapter::{BackendAdapter, IdRange, Patch, Target};
use crate::error::BenchError;
use crate::values::Record;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stores records per target in process memory.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    tables: HashMap<String, Vec<Record>>,
    hashes: HashMap<String, BTreeMap<String, String>>,
    resets: usize,
    writes: usize,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records currently stored under `target`.
    pub fn stored(&self, target: &str) -> &[Record] {
        self.tables.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields currently stored under the hash `key`.
    pub fn hash(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        self.hashes.get(key)
    }

    /// Number of `reset` calls so far.
    pub fn reset_count(&self) -> usize {
        self.resets
    }

    /// Number of mutating primitive calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

#[async_trait]
impl BackendAdapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        "Memory"
    }

    async fn reset(&mut self, target: &Target) -> Result<(), BenchError> {
        self.resets += 1;
        self.tables.remove(&target.name);
        self.hashes.remove(&target.name);
        Ok(())
    }

    async fn insert_batch(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, BenchError> {
        self.writes += 1;
        self.tables
            .entry(target.name.clone())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len() as u64)
    }

    async fn update_all(&mut self, target: &Target, patch: &Patch) -> Result<u64, BenchError> {
        self.writes += 1;
        let Some(records) = self.tables.get_mut(&target.name) else {
            return Ok(0);
        };
        for record in records.iter_mut() {
            record.set(patch.field.clone(), patch.value.clone());
        }
        Ok(records.len() as u64)
    }

    async fn delete_all(&mut self, target: &Target) -> Result<u64, BenchError> {
        self.writes += 1;
        let removed = self
            .tables
            .get_mut(&target.name)
            .map(|records| records.drain(..).count())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn retrieve_range(
        &mut self,
        target: &Target,
        range: IdRange,
    ) -> Result<usize, BenchError> {
        let id_column = target.id_column();
        let rows: Vec<Record> = self
            .stored(&target.name)
            .iter()
            .filter(|record| {
                record
                    .get(id_column)
                    .and_then(|v| v.as_i64())
                    .is_some_and(|id| range.contains(id))
            })
            .cloned()
            .collect();
        Ok(rows.len())
    }

    async fn update_records(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, BenchError> {
        self.writes += 1;
        let id_column = target.id_column();
        let Some(stored) = self.tables.get_mut(&target.name) else {
            return Ok(0);
        };
        let mut matched = 0u64;
        for update in records {
            let Some(id) = update.get(id_column) else {
                continue;
            };
            if let Some(existing) = stored.iter_mut().find(|r| r.get(id_column) == Some(id)) {
                for (name, value) in update.fields() {
                    existing.set(name, value.clone());
                }
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn delete_ids(&mut self, target: &Target, ids: &[i64]) -> Result<u64, BenchError> {
        self.writes += 1;
        let id_column = target.id_column();
        let ids: HashSet<i64> = ids.iter().copied().collect();
        let Some(stored) = self.tables.get_mut(&target.name) else {
            return Ok(0);
        };
        let before = stored.len();
        stored.retain(|record| {
            !record
                .get(id_column)
                .and_then(|v| v.as_i64())
                .is_some_and(|id| ids.contains(&id))
        });
        Ok((before - stored.len()) as u64)
    }

    async fn retrieve_ids(&mut self, target: &Target, ids: &[i64]) -> Result<usize, BenchError> {
        let id_column = target.id_column();
        let ids: HashSet<i64> = ids.iter().copied().collect();
        let rows: Vec<Record> = self
            .stored(&target.name)
            .iter()
            .filter(|record| {
                record
                    .get(id_column)
                    .and_then(|v| v.as_i64())
                    .is_some_and(|id| ids.contains(&id))
            })
            .cloned()
            .collect();
        Ok(rows.len())
    }

    async fn insert_hash(
        &mut self,
        key: &str,
        pairs: &[(String, String)],
    ) -> Result<u64, BenchError> {
        self.writes += 1;
        let hash = self.hashes.entry(key.to_string()).or_default();
        for (field, value) in pairs {
            hash.insert(field.clone(), value.clone());
        }
        Ok(pairs.len() as u64)
    }

    async fn retrieve_hash(&mut self, key: &str) -> Result<usize, BenchError> {
        let fields = self.hashes.get(key).cloned().unwrap_or_default();
        Ok(fields.len())
    }

    async fn close(self: Box<Self>) -> Result<(), BenchError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{ColumnDef, ColumnKind, DatasetSchema, Value};

    fn target() -> Target {
        Target::new(
            "loans",
            DatasetSchema::new(vec![ColumnDef::new("LoanID", ColumnKind::Int)], "LoanID"),
        )
    }

    fn records(count: i64) -> Vec<Record> {
        (1..=count)
            .map(|i| Record::new().with("LoanID", Value::Int(i)))
            .collect()
    }

    #[tokio::test]
    async fn test_reset_twice_on_empty_target() {
        let mut adapter = MemoryAdapter::new();
        let target = target();

        adapter.reset(&target).await.unwrap();
        adapter.reset(&target).await.unwrap();

        assert!(adapter.stored("loans").is_empty());
        assert_eq!(adapter.reset_count(), 2);
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let mut adapter = MemoryAdapter::new();
        let target = target();

        assert_eq!(adapter.insert_batch(&target, &records(4)).await.unwrap(), 4);
        let patch = Patch::new("Content", Value::Text("x".to_string()));
        assert_eq!(adapter.update_all(&target, &patch).await.unwrap(), 4);
        assert!(adapter
            .stored("loans")
            .iter()
            .all(|r| r.get("Content") == Some(&Value::Text("x".to_string()))));

        let found = adapter
            .retrieve_range(&target, IdRange::new(2, 3))
            .await
            .unwrap();
        assert_eq!(found, 2);

        assert_eq!(adapter.delete_all(&target).await.unwrap(), 4);
        assert!(adapter.stored("loans").is_empty());
    }

    #[tokio::test]
    async fn test_id_scoped_primitives() {
        let mut adapter = MemoryAdapter::new();
        let target = target();
        adapter.insert_batch(&target, &records(5)).await.unwrap();

        let updates = vec![
            Record::new()
                .with("LoanID", Value::Int(2))
                .with("Content", Value::Text("two".to_string())),
            Record::new()
                .with("LoanID", Value::Int(9))
                .with("Content", Value::Text("missing".to_string())),
        ];
        assert_eq!(adapter.update_records(&target, &updates).await.unwrap(), 1);
        assert_eq!(
            adapter.stored("loans")[1].get("Content"),
            Some(&Value::Text("two".to_string()))
        );

        assert_eq!(adapter.retrieve_ids(&target, &[1, 3, 9]).await.unwrap(), 2);
        assert_eq!(adapter.delete_ids(&target, &[1, 3, 9]).await.unwrap(), 2);
        assert_eq!(adapter.stored("loans").len(), 3);
        assert_eq!(adapter.delete_ids(&target, &[1]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_hash_roundtrip() {
        let mut adapter = MemoryAdapter::new();
        let pairs = vec![
            ("1".to_string(), "a".to_string()),
            ("2".to_string(), "b".to_string()),
        ];
        assert_eq!(adapter.insert_hash("loans", &pairs).await.unwrap(), 2);
        assert_eq!(adapter.retrieve_hash("loans").await.unwrap(), 2);
        assert_eq!(adapter.retrieve_hash("missing").await.unwrap(), 0);
    }
}
