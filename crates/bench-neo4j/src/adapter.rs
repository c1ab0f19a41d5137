//! Neo4j implementation of [`BackendAdapter`].

use crate::cypher::{
    build_create_batch, build_delete_all, build_delete_ids, build_ids_match, build_range_match,
    build_update_all, build_update_batch, DEFAULT_BATCH_SIZE,
};
use crate::error::Neo4jAdapterError;
use async_trait::async_trait;
use bench_core::{BackendAdapter, BenchError, IdRange, Patch, Record, Target, Value};
use chrono::NaiveDateTime;
use neo4rs::{query, BoltType, ConfigBuilder, Graph, Node, Query};
use tracing::{debug, info};

const NAME: &str = "Neo4j";

/// Graph store adapter. Each target is a node label.
pub struct Neo4jAdapter {
    graph: Graph,
    batch_size: usize,
}

impl Neo4jAdapter {
    /// Connect and run `RETURN 1`.
    pub async fn connect(
        uri: &str,
        username: &str,
        password: &str,
        database: &str,
    ) -> Result<Self, BenchError> {
        Self::try_connect(uri, username, password, database)
            .await
            .map_err(|e| BenchError::connection(NAME, e))
    }

    async fn try_connect(
        uri: &str,
        username: &str,
        password: &str,
        database: &str,
    ) -> Result<Self, Neo4jAdapterError> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(username)
            .password(password)
            .db(database)
            .build()
            .map_err(|e| Neo4jAdapterError::Config(e.to_string()))?;

        let graph = Graph::connect(config)?;

        // Test connection
        graph.run(query("RETURN 1")).await?;
        info!("Connected to Neo4j database '{}'", database);

        Ok(Self {
            graph,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Set the number of nodes created per statement.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Run a statement returning a single count column.
    async fn run_count(&self, q: Query, column: &str) -> Result<u64, Neo4jAdapterError> {
        let mut result = self.graph.execute(q).await?;

        if let Some(row) = result.next().await? {
            let count: i64 = row
                .get(column)
                .map_err(|e| Neo4jAdapterError::Decode(format!("Failed to get {column}: {e}")))?;
            Ok(count as u64)
        } else {
            Ok(0)
        }
    }

    async fn create_nodes(
        &self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, Neo4jAdapterError> {
        let mut created = 0u64;
        for chunk in records.chunks(self.batch_size) {
            let cypher = build_create_batch(&target.name, chunk);
            created += self.run_count(query(&cypher), "created").await?;
        }
        Ok(created)
    }

    async fn match_range(
        &self,
        target: &Target,
        range: IdRange,
    ) -> Result<Vec<Record>, Neo4jAdapterError> {
        let cypher = build_range_match(&target.name, target.id_column());
        debug!("Neo4j query: {} {}", cypher, range);
        let q = query(&cypher)
            .param("start", range.start)
            .param("end", range.end);
        self.collect_nodes(q).await
    }

    async fn match_ids(
        &self,
        target: &Target,
        ids: &[i64],
    ) -> Result<Vec<Record>, Neo4jAdapterError> {
        let cypher = build_ids_match(&target.name, target.id_column());
        self.collect_nodes(query(&cypher).param("ids", ids.to_vec()))
            .await
    }

    async fn rewrite_nodes(
        &self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, Neo4jAdapterError> {
        let mut updated = 0u64;
        for chunk in records.chunks(self.batch_size) {
            let cypher = build_update_batch(&target.name, target.id_column(), chunk);
            updated += self.run_count(query(&cypher), "updated").await?;
        }
        Ok(updated)
    }

    /// Decode the `n` column of every returned row.
    async fn collect_nodes(&self, q: Query) -> Result<Vec<Record>, Neo4jAdapterError> {
        let mut result = self.graph.execute(q).await?;
        let mut records = Vec::new();
        while let Some(row) = result.next().await? {
            let node: Node = row
                .get("n")
                .map_err(|e| Neo4jAdapterError::Decode(format!("Failed to get node: {e}")))?;
            records.push(node_to_record(&node)?);
        }
        Ok(records)
    }
}

/// Decode every property of a node.
fn node_to_record(node: &Node) -> Result<Record, Neo4jAdapterError> {
    let mut record = Record::new();
    for key in node.keys() {
        let bolt = node
            .get::<BoltType>(key)
            .map_err(|e| Neo4jAdapterError::Decode(format!("property '{key}': {e}")))?;
        record.set(key, bolt_to_value(key, bolt)?);
    }
    Ok(record)
}

fn bolt_to_value(key: &str, bolt: BoltType) -> Result<Value, Neo4jAdapterError> {
    match bolt {
        BoltType::Null(_) => Ok(Value::Null),
        BoltType::Integer(i) => Ok(Value::Int(i.value)),
        BoltType::Float(f) => Ok(Value::Float(f.value)),
        BoltType::String(s) => Ok(Value::Text(s.value)),
        BoltType::LocalDateTime(local_dt) => {
            let ts: NaiveDateTime = local_dt.try_into().map_err(|e| {
                Neo4jAdapterError::Decode(format!("property '{key}': invalid local datetime: {e}"))
            })?;
            Ok(Value::Timestamp(ts))
        }
        other => Err(Neo4jAdapterError::Decode(format!(
            "property '{key}' has unsupported type {other:?}"
        ))),
    }
}

#[async_trait]
impl BackendAdapter for Neo4jAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn reset(&mut self, target: &Target) -> Result<(), BenchError> {
        let removed = self
            .run_count(query(&build_delete_all(&target.name)), "deleted")
            .await
            .map_err(|e| BenchError::write(NAME, "reset", e))?;
        debug!("Reset label '{}' ({} nodes removed)", target.name, removed);
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
        self.create_nodes(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "insert", e))
    }

    async fn update_all(&mut self, target: &Target, patch: &Patch) -> Result<u64, BenchError> {
        let cypher = build_update_all(&target.name, &patch.field, &patch.value);
        self.run_count(query(&cypher), "updated")
            .await
            .map_err(|e| BenchError::write(NAME, "update", e))
    }

    async fn delete_all(&mut self, target: &Target) -> Result<u64, BenchError> {
        self.run_count(query(&build_delete_all(&target.name)), "deleted")
            .await
            .map_err(|e| BenchError::write(NAME, "delete", e))
    }

    async fn retrieve_range(
        &mut self,
        target: &Target,
        range: IdRange,
    ) -> Result<usize, BenchError> {
        let records = self
            .match_range(target, range)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve", e))?;
        Ok(records.len())
    }

    async fn update_records(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.rewrite_nodes(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "update_records", e))
    }

    async fn delete_ids(&mut self, target: &Target, ids: &[i64]) -> Result<u64, BenchError> {
        let cypher = build_delete_ids(&target.name, target.id_column());
        self.run_count(query(&cypher).param("ids", ids.to_vec()), "deleted")
            .await
            .map_err(|e| BenchError::write(NAME, "delete_ids", e))
    }

    async fn retrieve_ids(&mut self, target: &Target, ids: &[i64]) -> Result<usize, BenchError> {
        let records = self
            .match_ids(target, ids)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve_ids", e))?;
        Ok(records.len())
    }

    async fn close(self: Box<Self>) -> Result<(), BenchError> {
        // The driver closes pooled connections on drop
        drop(self.graph);
        debug!("Neo4j graph handle released");
        Ok(())
    }
}
