//! Neo4j backend for dbms-bench.
//!
//! # Overview
//!
//! In Neo4j, targets become node labels. Each record becomes a node whose
//! properties are the record fields; timestamps are stored as
//! `localdatetime` values. Inserts are batched with `UNWIND` over literal
//! property maps.
//!
//! # Example
//!
//! ```ignore
//! use bench_neo4j::Neo4jAdapter;
//!
//! let adapter = Neo4jAdapter::connect(
//!     "bolt://localhost:7687",
//!     "neo4j",
//!     "password",
//!     "neo4j",
//! ).await?;
//! ```

mod adapter;
mod args;
mod cypher;
mod error;

pub use adapter::Neo4jAdapter;
pub use args::Neo4jArgs;
pub use cypher::{escape_neo4j_string, value_to_cypher, DEFAULT_BATCH_SIZE};
pub use error::Neo4jAdapterError;
