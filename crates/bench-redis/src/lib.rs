//! Redis backend for dbms-bench.
//!
//! Records are stored one hash per record under `{target}:{id}`. The hash
//! workloads write every record of a dataset as one field of a single hash
//! named after the target. Resetting flushes the logical database.

mod adapter;
mod args;
mod error;
mod layout;

pub use adapter::{RedisAdapter, PIPELINE_SIZE};
pub use args::RedisArgs;
pub use error::RedisAdapterError;
pub use layout::{hash_to_record, key_pattern, record_key, record_to_hash};
