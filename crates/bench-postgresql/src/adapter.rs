//! PostgreSQL implementation of [`BackendAdapter`].

use crate::error::PostgreSQLAdapterError;
use crate::sql::{
    generate_create_table, generate_insert, generate_select_ids, generate_update_by_id,
    qualified_table, quote_ident, rows_per_statement, value_to_param,
};
use async_trait::async_trait;
use bench_core::{
    BackendAdapter, BenchError, ColumnDef, ColumnKind, IdRange, Patch, Record, Target, Value,
};
use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info};

const NAME: &str = "PostgreSQL";

/// Relational store adapter. Each target is a table, optionally inside a
/// dedicated schema.
pub struct PostgreSQLAdapter {
    client: Client,
    connection: JoinHandle<()>,
    schema: Option<String>,
}

impl PostgreSQLAdapter {
    /// Connect and run `SELECT 1`.
    pub async fn connect(
        connection_string: &str,
        schema: Option<String>,
    ) -> Result<Self, BenchError> {
        Self::try_connect(connection_string, schema)
            .await
            .map_err(|e| BenchError::connection(NAME, e))
    }

    async fn try_connect(
        connection_string: &str,
        schema: Option<String>,
    ) -> Result<Self, PostgreSQLAdapterError> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

        // Spawn the connection task
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        // Test connection
        client.simple_query("SELECT 1").await?;
        info!("Connected to PostgreSQL");

        Ok(Self {
            client,
            connection,
            schema,
        })
    }

    fn table(&self, target: &Target) -> String {
        qualified_table(self.schema.as_deref(), &target.name)
    }

    async fn create_table(&self, target: &Target) -> Result<(), PostgreSQLAdapterError> {
        if let Some(schema) = &self.schema {
            self.client
                .batch_execute(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
                .await?;
        }
        let sql = generate_create_table(&self.table(target), &target.schema);
        debug!("PostgreSQL DDL: {}", sql);
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    async fn insert_rows(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, PostgreSQLAdapterError> {
        let table = self.table(target);
        let columns = &target.schema.columns;
        let chunk_size = rows_per_statement(columns.len());

        let transaction = self.client.transaction().await?;
        let mut inserted = 0u64;
        for chunk in records.chunks(chunk_size) {
            let sql = generate_insert(&table, columns, chunk.len());

            let mut params: Vec<Box<dyn ToSql + Sync + Send>> =
                Vec::with_capacity(chunk.len() * columns.len());
            for record in chunk {
                for column in columns {
                    let value = record.get(&column.name).unwrap_or(&Value::Null);
                    params.push(value_to_param(value, column.kind));
                }
            }
            let param_refs: Vec<&(dyn ToSql + Sync)> = params
                .iter()
                .map(|p| p.as_ref() as &(dyn ToSql + Sync))
                .collect();

            inserted += transaction.execute(&sql, &param_refs).await?;
        }
        transaction.commit().await?;

        Ok(inserted)
    }

    async fn update_rows(
        &self,
        target: &Target,
        patch: &Patch,
    ) -> Result<u64, PostgreSQLAdapterError> {
        let column = target.schema.column(&patch.field).ok_or_else(|| {
            PostgreSQLAdapterError::UnknownColumn {
                table: target.name.clone(),
                column: patch.field.clone(),
            }
        })?;
        let sql = format!(
            "UPDATE {} SET {} = $1",
            self.table(target),
            quote_ident(&patch.field)
        );
        let param = value_to_param(&patch.value, column.kind);
        let updated = self
            .client
            .execute(&sql, &[param.as_ref() as &(dyn ToSql + Sync)])
            .await?;
        Ok(updated)
    }

    /// One prepared UPDATE per record, all inside a single transaction.
    async fn update_each(
        &mut self,
        target: &Target,
        records: &[Record],
    ) -> Result<u64, PostgreSQLAdapterError> {
        let table = self.table(target);
        let id_column = target.id_column();
        let columns: Vec<&ColumnDef> = target
            .schema
            .columns
            .iter()
            .filter(|c| c.name != id_column)
            .collect();
        let id_kind = target
            .schema
            .column(id_column)
            .map(|c| c.kind)
            .unwrap_or(ColumnKind::Int);

        let sql = generate_update_by_id(&table, &target.schema.columns, id_column);
        debug!("PostgreSQL update: {}", sql);

        let transaction = self.client.transaction().await?;
        let statement = transaction.prepare(&sql).await?;
        let mut updated = 0u64;
        for record in records {
            let Some(id) = record.get(id_column) else {
                continue;
            };
            let mut params: Vec<Box<dyn ToSql + Sync + Send>> =
                Vec::with_capacity(columns.len() + 1);
            for column in &columns {
                let value = record.get(&column.name).unwrap_or(&Value::Null);
                params.push(value_to_param(value, column.kind));
            }
            params.push(value_to_param(id, id_kind));
            let param_refs: Vec<&(dyn ToSql + Sync)> = params
                .iter()
                .map(|p| p.as_ref() as &(dyn ToSql + Sync))
                .collect();
            updated += transaction.execute(&statement, &param_refs).await?;
        }
        transaction.commit().await?;
        Ok(updated)
    }

    async fn delete_id_rows(
        &self,
        target: &Target,
        ids: &[i64],
    ) -> Result<u64, PostgreSQLAdapterError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ANY($1)",
            self.table(target),
            quote_ident(target.id_column())
        );
        let ids = ids.to_vec();
        Ok(self.client.execute(&sql, &[&ids]).await?)
    }

    async fn select_ids(
        &self,
        target: &Target,
        ids: &[i64],
    ) -> Result<Vec<Record>, PostgreSQLAdapterError> {
        let columns = &target.schema.columns;
        let sql = generate_select_ids(&self.table(target), columns, target.id_column());
        let ids = ids.to_vec();
        let rows = self.client.query(&sql, &[&ids]).await?;
        rows.iter().map(|row| row_to_record(row, columns)).collect()
    }

    async fn delete_rows(&self, target: &Target) -> Result<u64, PostgreSQLAdapterError> {
        let sql = format!("DELETE FROM {}", self.table(target));
        Ok(self.client.execute(&sql, &[]).await?)
    }

    async fn select_range(
        &self,
        target: &Target,
        range: IdRange,
    ) -> Result<Vec<Record>, PostgreSQLAdapterError> {
        let columns = &target.schema.columns;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} BETWEEN $1 AND $2",
            columns
                .iter()
                .map(|c| quote_ident(&c.name))
                .collect::<Vec<_>>()
                .join(", "),
            self.table(target),
            quote_ident(target.id_column())
        );
        debug!("PostgreSQL query: {} {}", sql, range);

        let rows = self.client.query(&sql, &[&range.start, &range.end]).await?;
        rows.iter().map(|row| row_to_record(row, columns)).collect()
    }
}

fn row_to_record(row: &Row, columns: &[ColumnDef]) -> Result<Record, PostgreSQLAdapterError> {
    let mut record = Record::new();
    for (idx, column) in columns.iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Int => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
            ColumnKind::Float => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
            ColumnKind::Text => row.try_get::<_, Option<String>>(idx)?.map(Value::Text),
            ColumnKind::Timestamp => row
                .try_get::<_, Option<NaiveDateTime>>(idx)?
                .map(Value::Timestamp),
        };
        record.set(column.name.clone(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}

#[async_trait]
impl BackendAdapter for PostgreSQLAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn prepare(&mut self, target: &Target) -> Result<(), BenchError> {
        self.create_table(target)
            .await
            .map_err(|e| BenchError::write(NAME, "prepare", e))
    }

    async fn reset(&mut self, target: &Target) -> Result<(), BenchError> {
        let removed = self
            .delete_rows(target)
            .await
            .map_err(|e| BenchError::write(NAME, "reset", e))?;
        debug!("Reset table '{}' ({} rows removed)", target.name, removed);
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
        self.insert_rows(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "insert", e))
    }

    async fn update_all(&mut self, target: &Target, patch: &Patch) -> Result<u64, BenchError> {
        self.update_rows(target, patch)
            .await
            .map_err(|e| BenchError::write(NAME, "update", e))
    }

    async fn delete_all(&mut self, target: &Target) -> Result<u64, BenchError> {
        self.delete_rows(target)
            .await
            .map_err(|e| BenchError::write(NAME, "delete", e))
    }

    async fn retrieve_range(
        &mut self,
        target: &Target,
        range: IdRange,
    ) -> Result<usize, BenchError> {
        let records = self
            .select_range(target, range)
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
        self.update_each(target, records)
            .await
            .map_err(|e| BenchError::write(NAME, "update_records", e))
    }

    async fn delete_ids(&mut self, target: &Target, ids: &[i64]) -> Result<u64, BenchError> {
        self.delete_id_rows(target, ids)
            .await
            .map_err(|e| BenchError::write(NAME, "delete_ids", e))
    }

    async fn retrieve_ids(&mut self, target: &Target, ids: &[i64]) -> Result<usize, BenchError> {
        let records = self
            .select_ids(target, ids)
            .await
            .map_err(|e| BenchError::read(NAME, "retrieve_ids", e))?;
        Ok(records.len())
    }

    async fn close(self: Box<Self>) -> Result<(), BenchError> {
        let Self {
            client, connection, ..
        } = *self;
        // Dropping the client ends the connection task
        drop(client);
        connection
            .await
            .map_err(|e| BenchError::connection(NAME, PostgreSQLAdapterError::from(e)))?;
        debug!("PostgreSQL connection closed");
        Ok(())
    }
}
