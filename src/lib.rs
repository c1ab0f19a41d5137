//! dbms-bench library
//!
//! Times the same CRUD workloads against MongoDB, PostgreSQL, Neo4j and
//! Redis and writes one JSON result file per run.
//!
//! # Crates
//!
//! - `bench_core` - records, the `BackendAdapter` trait, scenarios and the runner
//! - `bench_dataset` - CSV loading for the loans and user-post-comments datasets
//! - `bench_results` - result file naming and persistence
//! - `bench_mongodb`, `bench_postgresql`, `bench_neo4j`, `bench_redis` - adapters
//!
//! # CLI Usage
//!
//! ```bash
//! # One write cycle against PostgreSQL
//! dbms-bench run postgresql --scenario write-cycle --dataset loans \
//!   --postgresql-connection-string "host=localhost user=postgres password=postgres"
//!
//! # Hash scenarios against Redis
//! dbms-bench run redis --scenario insert-hash --redis-url redis://localhost:6379
//!
//! # Interactive menu
//! dbms-bench menu --data-directory data --save-data-directory results
//! ```

pub mod backend;
pub mod config;
pub mod logging;
pub mod menu;
pub mod run;

pub use backend::{Backend, Connections};
pub use config::{BenchOpts, DatasetArg, RunArgs, ScenarioArg};
pub use menu::{Menu, MenuSignal};
pub use run::{run_benchmark, run_session};
