//! Backend selection and connection.

use crate::logging::mask_connection_password;
use anyhow::Context;
use bench_core::{BackendAdapter, MemoryAdapter};
use bench_mongodb::{MongoDBAdapter, MongoDBArgs};
use bench_neo4j::{Neo4jAdapter, Neo4jArgs};
use bench_postgresql::{PostgreSQLAdapter, PostgreSQLArgs};
use bench_redis::{RedisAdapter, RedisArgs};
use clap::Args;
use tracing::info;

/// A store the benchmark can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    MongoDB,
    PostgreSQL,
    Neo4j,
    Redis,
    /// In-process store for dry runs
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::MongoDB => write!(f, "MongoDB"),
            Backend::PostgreSQL => write!(f, "PostgreSQL"),
            Backend::Neo4j => write!(f, "Neo4j"),
            Backend::Redis => write!(f, "Redis"),
            Backend::Memory => write!(f, "Memory"),
        }
    }
}

/// Connection settings for every store, used by the interactive menu.
#[derive(Args, Clone, Debug)]
pub struct Connections {
    #[command(flatten)]
    pub mongodb: MongoDBArgs,

    #[command(flatten)]
    pub postgresql: PostgreSQLArgs,

    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    #[command(flatten)]
    pub redis: RedisArgs,
}

impl Connections {
    /// Open a handle on `backend`.
    pub async fn connect(&self, backend: Backend) -> anyhow::Result<Box<dyn BackendAdapter>> {
        match backend {
            Backend::MongoDB => connect_mongodb(&self.mongodb).await,
            Backend::PostgreSQL => connect_postgresql(&self.postgresql).await,
            Backend::Neo4j => connect_neo4j(&self.neo4j).await,
            Backend::Redis => connect_redis(&self.redis).await,
            Backend::Memory => Ok(Box::new(MemoryAdapter::new())),
        }
    }
}

pub async fn connect_mongodb(args: &MongoDBArgs) -> anyhow::Result<Box<dyn BackendAdapter>> {
    info!(
        "Connecting to MongoDB at {} (database: {})",
        mask_connection_password(&args.mongodb_connection_string),
        args.mongodb_database
    );
    let adapter = MongoDBAdapter::connect(&args.mongodb_connection_string, &args.mongodb_database)
        .await
        .context("Failed to connect to MongoDB")?;
    Ok(Box::new(adapter))
}

pub async fn connect_postgresql(
    args: &PostgreSQLArgs,
) -> anyhow::Result<Box<dyn BackendAdapter>> {
    info!(
        "Connecting to PostgreSQL at {}",
        mask_connection_password(&args.postgresql_connection_string)
    );
    let adapter = PostgreSQLAdapter::connect(
        &args.postgresql_connection_string,
        args.postgresql_schema.clone(),
    )
    .await
    .context("Failed to connect to PostgreSQL")?;
    Ok(Box::new(adapter))
}

pub async fn connect_neo4j(args: &Neo4jArgs) -> anyhow::Result<Box<dyn BackendAdapter>> {
    info!(
        "Connecting to Neo4j at {} as {} (database: {})",
        args.neo4j_uri, args.neo4j_username, args.neo4j_database
    );
    let adapter = Neo4jAdapter::connect(
        &args.neo4j_uri,
        &args.neo4j_username,
        &args.neo4j_password,
        &args.neo4j_database,
    )
    .await
    .context("Failed to connect to Neo4j")?;
    Ok(Box::new(adapter))
}

pub async fn connect_redis(args: &RedisArgs) -> anyhow::Result<Box<dyn BackendAdapter>> {
    info!(
        "Connecting to Redis at {}",
        mask_connection_password(&args.redis_url)
    );
    let adapter = RedisAdapter::connect(&args.redis_url)
        .await
        .context("Failed to connect to Redis")?;
    Ok(Box::new(adapter))
}
