//! Redis implementation of [`BackendAdapter`].

use crate::error::RedisAdapterError;
use crate::layout::{hash_to_record, key_pattern, record_key, record_to_hash};
use async_trait::async_trait;
use bench_core::{BackendAdapter, BenchError, IdRange, Patch, Record, Target};
use redis::aio::MultiplexedConnection;
use std::collections::HashMap;
use tracing::{debug, info};

const NAME: &str = "Redis";

/// Commands queued per pipeline round trip.
pub const PIPELINE_SIZE: usize = 1000;

/// Key-value store adapter.
pub struct RedisAdapter {
    connection: MultiplexedConnection,
}

impl RedisAdapter {
    /// Connect and `PING`.
    pub async fn connect(url: &str) -> Result<Self, BenchError> {
        Self::try_connect(url)
            .await
            .map_err(|e| BenchError::connection(NAME, e))
    }

    async fn try_connect(url: &str) -> Result<Self, RedisAdapterError> {
        let client = redis::Client::open(url)?;
        let mut connection = client.get_multiplexed_async_connection().await?;

        let _: String = redis::cmd("PING").query_async(&mut connection).await?;
        info!("Connected to Redis");

        Ok(Self { connection })
    }

    async fn flush(&mut self) -> Result<(), RedisAdapterError> {
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut self.connection)
            .await?;
        Ok(())
    }

    /// Walk the keyspace with `SCAN ... MATCH` so the server never blocks on
    /// one large reply.
    async fn target_keys(&mut self, target: &Target) -> Result<Vec<String>, RedisAdapterError> {
        let pattern = key_pattern(&target.name);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(PIPELINE_SIZE)
                .query_async(&mut self.connection)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may report a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn write_hashes(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, RedisAdapterError> {
        let mut acknowledged = 0u64;
        for (chunk_index, chunk) in records.chunks(PIPELINE_SIZE).enumerate() {
            let mut pipe = redis::pipe();
            for (offset, record) in chunk.iter().enumerate() {
                let position = chunk_index * PIPELINE_SIZE + offset + 1;
                let (key, fields) = record_to_hash(&target.name, &target.schema, record, position);
                pipe.hset_multiple(key, &fields);
            }
            let replies: Vec<redis::Value> = pipe.query_async(&mut self.connection).await?;
            acknowledged += replies.len() as u64;
        }
        Ok(acknowledged)
    }

    async fn patch_hashes(
        &mut self,
        target: &Target,
        patch: &Patch,
    ) -> Result<u64, RedisAdapterError> {
        let keys = self.target_keys(target).await?;
        let value = patch.value.to_text();
        for chunk in keys.chunks(PIPELINE_SIZE) {
            let mut pipe = redis::pipe();
            for key in chunk {
                pipe.hset(key, &patch.field, &value).ignore();
            }
            let _: () = pipe.query_async(&mut self.connection).await?;
        }
        Ok(keys.len() as u64)
    }

    /// Rewrite the hashes of records whose key already exists.
    async fn rewrite_hashes(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, RedisAdapterError> {
        let mut matched = 0u64;
        for (chunk_index, chunk) in records.chunks(PIPELINE_SIZE).enumerate() {
            let hashes: Vec<(String, Vec<(String, String)>)> = chunk
                .iter()
                .enumerate()
                .map(|(offset, record)| {
                    let position = chunk_index * PIPELINE_SIZE + offset + 1;
                    record_to_hash(&target.name, &target.schema, record, position)
                })
                .collect();

            let mut lookup = redis::pipe();
            for (key, _) in &hashes {
                lookup.exists(key);
            }
            let present: Vec<bool> = lookup.query_async(&mut self.connection).await?;

            let mut pipe = redis::pipe();
            let mut queued = 0u64;
            for ((key, fields), present) in hashes.iter().zip(present) {
                if present {
                    pipe.hset_multiple(key, fields).ignore();
                    queued += 1;
                }
            }
            if queued > 0 {
                let _: () = pipe.query_async(&mut self.connection).await?;
            }
            matched += queued;
        }
        Ok(matched)
    }

    async fn remove_hashes(&mut self, target: &Target) -> Result<u64, RedisAdapterError> {
        let keys = self.target_keys(target).await?;
        self.remove_keys(&keys).await
    }

    async fn remove_keys(&mut self, keys: &[String]) -> Result<u64, RedisAdapterError> {
        let mut removed = 0u64;
        for chunk in keys.chunks(PIPELINE_SIZE) {
            let count: u64 = redis::cmd("DEL")
                .arg(chunk)
                .query_async(&mut self.connection)
                .await?;
            removed += count;
        }
        Ok(removed)
    }

    async fn fetch_range(
        &mut self,
        target: &Target,
        range: IdRange,
    ) -> Result<Vec<Record>, RedisAdapterError> {
        let ids: Vec<i64> = (range.start..=range.end).collect();
        self.fetch_ids(target, &ids).await
    }

    async fn fetch_ids(
        &mut self,
        target: &Target,
        ids: &[i64],
    ) -> Result<Vec<Record>, RedisAdapterError> {
        let mut records = Vec::new();
        for chunk in ids.chunks(PIPELINE_SIZE) {
            let keys = id_keys(target, chunk);
            let mut pipe = redis::pipe();
            for key in &keys {
                pipe.hgetall(key);
            }
            let hashes: Vec<HashMap<String, String>> =
                pipe.query_async(&mut self.connection).await?;

            for (key, hash) in keys.iter().zip(hashes) {
                // Missing keys come back as empty hashes
                if !hash.is_empty() {
                    records.push(hash_to_record(key, &target.schema, hash)?);
                }
            }
        }
        Ok(records)
    }

    async fn set_hash(
        &mut self,
        key: &str,
        pairs: &[(String, String)],
    ) -> Result<u64, RedisAdapterError> {
        for chunk in pairs.chunks(PIPELINE_SIZE * 10) {
            let _: u64 = redis::cmd("HSET")
                .arg(key)
                .arg(chunk)
                .query_async(&mut self.connection)
                .await?;
        }
        Ok(pairs.len() as u64)
    }

    async fn get_hash(&mut self, key: &str) -> Result<usize, RedisAdapterError> {
        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut self.connection)
            .await?;
        Ok(fields.len())
    }
}

fn id_keys(target: &Target, ids: &[i64]) -> Vec<String> {
    ids.iter()
        .map(|id| record_key(&target.name, &id.to_string()))
        .collect()
}

#[async_trait]
impl BackendAdapter for RedisAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Flushes the whole logical database, not only the target's keys.
    async fn reset(&mut self, target: &Target) -> Result<(), BenchError> {
        self.flush()
            .await
            .map_err(|e| BenchError::write(NAME, "reset", e))?;
        debug!("Flushed Redis database before '{}'", target.name);
        Ok(())
    }

    async fn insert_batch(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.write_hashes(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "insert", e))
    }

    async fn update_all(&mut self, target: &Target, patch: &Patch) -> Result<u64, BenchError> {
        self.patch_hashes(target, patch)
            .await
            .map_err(|e| BenchError::write(NAME, "update", e))
    }

    async fn delete_all(&mut self, target: &Target) -> Result<u64, BenchError> {
        self.remove_hashes(target)
            .await
            .map_err(|e| BenchError::write(NAME, "delete", e))
    }

    async fn retrieve_range(
        &mut self,
        target: &Target,
        range: IdRange,
    ) -> Result<usize, BenchError> {
        let records = self
            .fetch_range(target, range)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve", e))?;
        Ok(records.len())
    }

    async fn update_records(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, BenchError> {
        self.rewrite_hashes(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "update_records", e))
    }

    async fn delete_ids(&mut self, target: &Target, ids: &[i64]) -> Result<u64, BenchError> {
        self.remove_keys(&id_keys(target, ids))
            .await
            .map_err(|e| BenchError::write(NAME, "delete_ids", e))
    }

    async fn retrieve_ids(&mut self, target: &Target, ids: &[i64]) -> Result<usize, BenchError> {
        let records = self
            .fetch_ids(target, ids)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve_ids", e))?;
        Ok(records.len())
    }

    async fn insert_hash(
        &mut self,
        key: &str,
        pairs: &[(String, String)],
    ) -> Result<u64, BenchError> {
        if pairs.is_empty() {
            return Ok(0);
        }
        self.set_hash(key, pairs)
            .await
            .map_err(|e| BenchError::write(NAME, "insert_hash", e))
    }

    async fn retrieve_hash(&mut self, key: &str) -> Result<usize, BenchError> {
        self.get_hash(key)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve_hash", e))
    }

    async fn close(self: Box<Self>) -> Result<(), BenchError> {
        drop(self.connection);
        debug!("Redis connection released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::{ColumnDef, ColumnKind, DatasetSchema};

    #[test]
    fn test_id_keys() {
        let target = Target::new(
            "loans",
            DatasetSchema::new(vec![ColumnDef::new("LoanID", ColumnKind::Int)], "LoanID"),
        );
        assert_eq!(id_keys(&target, &[3, 10]), vec!["loans:3", "loans:10"]);
        assert!(id_keys(&target, &[]).is_empty());
    }
}
