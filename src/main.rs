//! Command-line interface for dbms-bench
//!
//! # Usage Examples
//!
//! ## Single run
//! ```bash
//! # Write cycle on the loans dataset against MongoDB
//! dbms-bench run mongodb --scenario write-cycle \
//!   --mongodb-connection-string mongodb://localhost:27017 \
//!   --mongodb-database library
//!
//! # Retrieval on Neo4j, ten iterations
//! dbms-bench run neo4j --scenario retrieve --iterations 10 \
//!   --neo4j-uri bolt://localhost:7687 --neo4j-password secret
//!
//! # Dry run without any server
//! dbms-bench run memory --scenario write-cycle --dataset user-post-comments
//! ```
//!
//! ## Interactive
//! ```bash
//! dbms-bench menu
//! ```
//!
//! Results land in `--save-data-directory` as `{dbms}_{table}_{operation}.json`.

use bench_core::{BackendAdapter, MemoryAdapter};
use bench_dataset::DatasetKind;
use bench_mongodb::MongoDBArgs;
use bench_neo4j::Neo4jArgs;
use bench_postgresql::PostgreSQLArgs;
use bench_redis::RedisArgs;
use clap::{Parser, Subcommand};
use dbms_bench::backend::{connect_mongodb, connect_neo4j, connect_postgresql, connect_redis};
use dbms_bench::run::{load_dataset, run_connected};
use dbms_bench::{Backend, BenchOpts, Connections, Menu, RunArgs};

#[derive(Parser)]
#[command(name = "dbms-bench")]
#[command(about = "Benchmark CRUD workloads across MongoDB, PostgreSQL, Neo4j and Redis")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario against one backend
    Run {
        #[command(subcommand)]
        backend: RunBackend,
    },

    /// Pick backends and scenarios interactively until told to stop
    Menu {
        #[command(flatten)]
        connections: Connections,

        #[command(flatten)]
        bench: BenchOpts,
    },
}

/// Backend to benchmark
#[derive(Subcommand)]
enum RunBackend {
    /// Benchmark MongoDB
    #[command(name = "mongodb")]
    MongoDB {
        #[command(flatten)]
        args: MongoDBArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark PostgreSQL
    #[command(name = "postgresql")]
    PostgreSQL {
        #[command(flatten)]
        args: PostgreSQLArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark Neo4j
    #[command(name = "neo4j")]
    Neo4j {
        #[command(flatten)]
        args: Neo4jArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark Redis
    #[command(name = "redis")]
    Redis {
        #[command(flatten)]
        args: RedisArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Benchmark the in-process store
    #[command(name = "memory")]
    Memory {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { backend } => run_backend(backend).await?,
        Commands::Menu { connections, bench } => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(stdin.lock(), std::io::stdout());
            menu.run(&connections, &bench).await?;
        }
    }

    Ok(())
}

async fn run_backend(backend: RunBackend) -> anyhow::Result<()> {
    let (selected, run) = match &backend {
        RunBackend::MongoDB { run, .. } => (Backend::MongoDB, run),
        RunBackend::PostgreSQL { run, .. } => (Backend::PostgreSQL, run),
        RunBackend::Neo4j { run, .. } => (Backend::Neo4j, run),
        RunBackend::Redis { run, .. } => (Backend::Redis, run),
        RunBackend::Memory { run } => (Backend::Memory, run),
    };
    let dataset_kind: DatasetKind = run.dataset.into();
    let dataset = load_dataset(dataset_kind, &run.bench)?;

    let adapter: Box<dyn BackendAdapter> = match &backend {
        RunBackend::MongoDB { args, .. } => connect_mongodb(args).await?,
        RunBackend::PostgreSQL { args, .. } => connect_postgresql(args).await?,
        RunBackend::Neo4j { args, .. } => connect_neo4j(args).await?,
        RunBackend::Redis { args, .. } => connect_redis(args).await?,
        RunBackend::Memory { .. } => Box::new(MemoryAdapter::new()),
    };

    let path = run_connected(
        adapter,
        selected,
        run.scenario.into(),
        dataset_kind,
        &dataset,
        &run.bench,
    )
    .await?;
    println!("Results written to {}", path.display());
    Ok(())
}
