//! Core of dbms-bench.
//!
//! This crate holds everything that is independent of a particular store:
//!
//! - [`BackendAdapter`], the capability interface each store implements
//! - [`BenchmarkRunner`], which grows a workload across iterations and times
//!   every phase
//! - [`RunRecord`] and [`ResultBundle`], the timing output
//! - [`MemoryAdapter`], an in-process backend for dry runs and tests
//!
//! # Example
//!
//! ```ignore
//! use bench_core::{BenchmarkRunner, MemoryAdapter, Scenario, ScenarioPlan};
//!
//! let plan = ScenarioPlan::new(Scenario::RetrieveOnly, 5);
//! let mut runner = BenchmarkRunner::new(plan, &dataset, "loans")?;
//! let bundle = runner.run(&mut MemoryAdapter::new()).await?;
//! ```

mod adapter;
mod error;
mod memory;
mod results;
mod runner;
mod scenario;
mod timing;
mod values;

pub use adapter::{BackendAdapter, IdRange, Patch, Target};
pub use error::{BenchError, DriverError};
pub use memory::MemoryAdapter;
pub use results::{ResultBundle, RunRecord};
pub use runner::{BenchmarkRunner, RunnerState};
pub use scenario::{cumulative_sizes, PatchRule, Scenario, ScenarioPlan, DEFAULT_ITERATIONS};
pub use timing::{
    epoch_seconds, round_to, time_phase, Phase, PhaseTiming, MAX_PRECISION, RETRIEVE_PRECISION,
    WRITE_PRECISION,
};
pub use values::{
    ColumnDef, ColumnKind, Dataset, DatasetSchema, Record, Value, TIMESTAMP_FORMAT,
};
