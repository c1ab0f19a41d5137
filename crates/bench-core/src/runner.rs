//! Benchmark-run orchestration.
//!
//! A runner grows the workload across `N` iterations, drives the fixed
//! primitive sequence of its scenario against one adapter, and collects one
//! [`RunRecord`] per iteration. Any primitive failure aborts the whole run:
//! no partial [`ResultBundle`] is returned and nothing is retried.

use crate::adapter::{BackendAdapter, IdRange, Target};
use crate::error::BenchError;
use crate::results::{ResultBundle, RunRecord};
use crate::scenario::{cumulative_sizes, Scenario, ScenarioPlan};
use crate::timing::{time_phase, Phase};
use crate::values::{Dataset, Value};
use tracing::{debug, info, warn};

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Resetting,
    Running { iteration: usize },
    Finalizing,
    Done,
}

impl std::fmt::Display for RunnerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerState::Idle => write!(f, "idle"),
            RunnerState::Resetting => write!(f, "resetting"),
            RunnerState::Running { iteration } => write!(f, "running (iteration {iteration})"),
            RunnerState::Finalizing => write!(f, "finalizing"),
            RunnerState::Done => write!(f, "done"),
        }
    }
}

/// Drives one scenario over one dataset.
///
/// A runner is single-use; a failed run leaves it in the state it failed in.
pub struct BenchmarkRunner<'a> {
    plan: ScenarioPlan,
    dataset: &'a Dataset,
    target: Target,
    state: RunnerState,
}

impl<'a> BenchmarkRunner<'a> {
    /// Create a runner for `dataset`, stored under `target_name`.
    pub fn new(
        plan: ScenarioPlan,
        dataset: &'a Dataset,
        target_name: impl Into<String>,
    ) -> Result<Self, BenchError> {
        plan.validate()?;
        let target = Target::new(target_name, dataset.schema().clone());
        Ok(Self {
            plan,
            dataset,
            target,
            state: RunnerState::Idle,
        })
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    fn transition(&mut self, state: RunnerState) {
        debug!("Runner state: {} -> {}", self.state, state);
        self.state = state;
    }

    /// Run the scenario to completion against `adapter`.
    pub async fn run(
        &mut self,
        adapter: &mut dyn BackendAdapter,
    ) -> Result<ResultBundle, BenchError> {
        if self.state != RunnerState::Idle {
            return Err(BenchError::InvalidPlan(format!(
                "runner already used (state: {})",
                self.state
            )));
        }

        let scenario = self.plan.scenario;
        let iterations = self.plan.iterations;
        let total = self.dataset.len();

        info!(
            "Running {} against {} '{}' ({} records, {} iterations)",
            scenario,
            adapter.name(),
            self.target.name,
            total,
            iterations
        );
        if total < iterations {
            warn!(
                "Dataset has fewer records ({}) than iterations ({}); every slice is empty",
                total, iterations
            );
        } else if total % iterations != 0 {
            warn!(
                "{} trailing records are never part of a slice ({} records, {} iterations)",
                total % iterations,
                total,
                iterations
            );
        }

        self.transition(RunnerState::Resetting);
        if scenario.mutates() {
            adapter.prepare(&self.target).await?;
        }
        if scenario.starts_empty() {
            adapter.reset(&self.target).await?;
        }

        let sizes = cumulative_sizes(total, iterations);
        let hash_pairs = match scenario {
            Scenario::InsertHash => self.dataset.hash_pairs(),
            _ => Vec::new(),
        };

        let mut records = Vec::with_capacity(iterations);
        for (index, size) in sizes.into_iter().enumerate() {
            let run = index + 1;
            self.transition(RunnerState::Running { iteration: run });

            let record = match scenario {
                Scenario::WriteCycle => self.write_cycle(adapter, run, size).await?,
                Scenario::RetrieveOnly => self.retrieve(adapter, run, size).await?,
                Scenario::InsertOnly => self.insert_only(adapter, run, size).await?,
                Scenario::InsertHash => self.insert_hash(adapter, run, &hash_pairs).await?,
                Scenario::RetrieveHash => self.retrieve_hash(adapter, run).await?,
                Scenario::UpdateSlice => self.update_slice(adapter, run, size).await?,
                Scenario::DeleteSlice => self.delete_slice(adapter, run, size).await?,
                Scenario::RetrieveSlice => self.retrieve_slice(adapter, run, size).await?,
            };

            info!(
                "Run {}/{}: size {} ({})",
                run,
                iterations,
                record.size,
                record
                    .phases
                    .iter()
                    .map(|t| format!("{} {:.5}s", t.phase, t.elapsed))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            records.push(record);
        }

        self.transition(RunnerState::Finalizing);
        let bundle = ResultBundle {
            save_directory: self.plan.save_directory.clone(),
            table_name: self.target.name.clone(),
            dbms: adapter.name().to_string(),
            operation: scenario.operation_label().to_string(),
            result: records,
        };
        self.transition(RunnerState::Done);

        Ok(bundle)
    }

    async fn insert_slice(
        &self,
        adapter: &mut dyn BackendAdapter,
        record: &mut RunRecord,
        size: usize,
    ) -> Result<(), BenchError> {
        let slice = self.dataset.prefix(size);
        let (inserted, timing) = time_phase(
            Phase::Insert,
            self.plan.write_precision,
            adapter.insert_batch(&self.target, slice),
        )
        .await?;
        if inserted < slice.len() as u64 {
            return Err(BenchError::write(
                adapter.name(),
                "insert",
                format!("acknowledged {inserted} of {} records", slice.len()),
            ));
        }
        record.push(timing);
        Ok(())
    }

    async fn write_cycle(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        // validate() guarantees a patch for write cycles
        let patch = self
            .plan
            .patch
            .as_ref()
            .map(|rule| rule.resolve())
            .ok_or_else(|| BenchError::InvalidPlan("write cycle needs an update patch".into()))?;

        self.insert_slice(adapter, &mut record, size).await?;

        if let Some(pause) = self.plan.pause {
            debug!("Pausing {:?} before update", pause);
            tokio::time::sleep(pause).await;
        }

        let (_, timing) = time_phase(
            Phase::Update,
            self.plan.write_precision,
            adapter.update_all(&self.target, &patch),
        )
        .await?;
        record.push(timing);

        let (_, timing) = time_phase(
            Phase::Delete,
            self.plan.write_precision,
            adapter.delete_all(&self.target),
        )
        .await?;
        record.push(timing);

        Ok(record)
    }

    async fn retrieve(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        let range = IdRange::new(1, size as i64);
        debug!("Retrieving id range {}", range);

        let (found, timing) = time_phase(
            Phase::Retrieve,
            self.plan.retrieve_precision,
            adapter.retrieve_range(&self.target, range),
        )
        .await?;
        debug!("Materialized {} records for range {}", found, range);
        record.push(timing);

        Ok(record)
    }

    async fn insert_only(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        self.insert_slice(adapter, &mut record, size).await?;

        if run != self.plan.iterations {
            adapter.reset(&self.target).await?;
        }
        Ok(record)
    }

    async fn insert_hash(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        pairs: &[(String, String)],
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, pairs.len());
        let (_, timing) = time_phase(
            Phase::HashInsert,
            self.plan.write_precision,
            adapter.insert_hash(&self.target.name, pairs),
        )
        .await?;
        record.push(timing);

        if run != self.plan.iterations {
            adapter.reset(&self.target).await?;
        }
        Ok(record)
    }

    async fn retrieve_hash(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, 1);
        let (fields, timing) = time_phase(
            Phase::HashRetrieve,
            self.plan.retrieve_precision,
            adapter.retrieve_hash(&self.target.name),
        )
        .await?;
        debug!("Fetched {} hash fields from '{}'", fields, self.target.name);
        record.push(timing);
        Ok(record)
    }

    /// Ids of the first `size` records.
    fn slice_ids(&self, size: usize) -> Vec<i64> {
        let id_column = self.target.id_column();
        self.dataset
            .prefix(size)
            .iter()
            .filter_map(|record| record.get(id_column).and_then(Value::as_i64))
            .collect()
    }

    async fn update_slice(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        let (matched, timing) = time_phase(
            Phase::SliceUpdate,
            self.plan.write_precision,
            adapter.update_records(&self.target, self.dataset.prefix(size)),
        )
        .await?;
        debug!("Rewrote {} of {} records", matched, size);
        record.push(timing);
        Ok(record)
    }

    async fn delete_slice(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        let ids = self.slice_ids(size);
        let (removed, timing) = time_phase(
            Phase::SliceDelete,
            self.plan.write_precision,
            adapter.delete_ids(&self.target, &ids),
        )
        .await?;
        debug!("Deleted {} of {} ids", removed, ids.len());
        record.push(timing);
        Ok(record)
    }

    async fn retrieve_slice(
        &self,
        adapter: &mut dyn BackendAdapter,
        run: usize,
        size: usize,
    ) -> Result<RunRecord, BenchError> {
        let mut record = RunRecord::new(run, size);
        let ids = self.slice_ids(size);
        let (found, timing) = time_phase(
            Phase::SliceRetrieve,
            self.plan.retrieve_precision,
            adapter.retrieve_ids(&self.target, &ids),
        )
        .await?;
        debug!("Materialized {} of {} ids", found, ids.len());
        record.push(timing);
        Ok(record)
    }
}
