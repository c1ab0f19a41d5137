//! Scenario definitions and workload slicing.

use crate::adapter::Patch;
use crate::error::BenchError;
use crate::timing::{MAX_PRECISION, RETRIEVE_PRECISION, WRITE_PRECISION};
use crate::values::Value;
use chrono::Utc;
use std::time::Duration;

/// Default number of iterations per scenario.
pub const DEFAULT_ITERATIONS: usize = 5;

/// The workload a runner drives against a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// insert -> (pause) -> update-all -> delete-all over a growing prefix
    WriteCycle,
    /// id-range retrieval over a growing range, no mutation
    RetrieveOnly,
    /// insert of a growing prefix, reset between iterations
    InsertOnly,
    /// every dataset record written as one field of a single hash key
    InsertHash,
    /// whole-hash fetch of the key written by `InsertHash`
    RetrieveHash,
    /// per-record rewrite of a growing id slice of already stored records
    UpdateSlice,
    /// deletion of a growing id slice of already stored records
    DeleteSlice,
    /// lookup of a growing id slice by id
    RetrieveSlice,
}

impl Scenario {
    /// Operation label written to result files.
    pub fn operation_label(&self) -> &'static str {
        match self {
            Scenario::WriteCycle => "runTest",
            Scenario::RetrieveOnly => "search",
            Scenario::InsertOnly => "Insert",
            Scenario::InsertHash => "InsertHash",
            Scenario::RetrieveHash => "RetrieveHash",
            Scenario::UpdateSlice => "Update",
            Scenario::DeleteSlice => "Delete",
            Scenario::RetrieveSlice => "Retrieve",
        }
    }

    /// Whether the scenario writes to the store.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Scenario::RetrieveOnly | Scenario::RetrieveHash | Scenario::RetrieveSlice
        )
    }

    /// Whether the target is emptied before the first iteration.
    ///
    /// Slice scenarios work on records left by an earlier run and never reset.
    pub fn starts_empty(&self) -> bool {
        matches!(
            self,
            Scenario::WriteCycle | Scenario::InsertOnly | Scenario::InsertHash
        )
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scenario::WriteCycle => write!(f, "write cycle"),
            Scenario::RetrieveOnly => write!(f, "retrieve"),
            Scenario::InsertOnly => write!(f, "insert"),
            Scenario::InsertHash => write!(f, "hash insert"),
            Scenario::RetrieveHash => write!(f, "hash retrieve"),
            Scenario::UpdateSlice => write!(f, "slice update"),
            Scenario::DeleteSlice => write!(f, "slice delete"),
            Scenario::RetrieveSlice => write!(f, "slice retrieve"),
        }
    }
}

/// How the update phase of a write cycle picks its value.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchRule {
    /// The same value on every iteration
    Fixed(Patch),
    /// The current UTC time, read when the iteration starts
    CurrentTime { field: String },
}

impl PatchRule {
    pub fn field(&self) -> &str {
        match self {
            PatchRule::Fixed(patch) => &patch.field,
            PatchRule::CurrentTime { field } => field,
        }
    }

    /// Resolve the patch for the iteration about to run.
    pub fn resolve(&self) -> Patch {
        match self {
            PatchRule::Fixed(patch) => patch.clone(),
            PatchRule::CurrentTime { field } => {
                Patch::new(field.clone(), Value::Timestamp(Utc::now().naive_utc()))
            }
        }
    }
}

/// Everything a runner needs besides the adapter and the dataset.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub scenario: Scenario,
    pub iterations: usize,
    /// Fixed delay between the insert and update phases of a write cycle
    pub pause: Option<Duration>,
    pub patch: Option<PatchRule>,
    pub write_precision: u32,
    pub retrieve_precision: u32,
    /// Directory recorded in the result bundle
    pub save_directory: String,
}

impl ScenarioPlan {
    pub fn new(scenario: Scenario, iterations: usize) -> Self {
        Self {
            scenario,
            iterations,
            pause: None,
            patch: None,
            write_precision: WRITE_PRECISION,
            retrieve_precision: RETRIEVE_PRECISION,
            save_directory: String::new(),
        }
    }

    pub fn with_pause(mut self, pause: Option<Duration>) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_patch(mut self, patch: PatchRule) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn with_precision(mut self, write_precision: u32, retrieve_precision: u32) -> Self {
        self.write_precision = write_precision;
        self.retrieve_precision = retrieve_precision;
        self
    }

    pub fn with_save_directory(mut self, directory: impl Into<String>) -> Self {
        self.save_directory = directory.into();
        self
    }

    /// Reject plans that cannot run.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.iterations == 0 {
            return Err(BenchError::InvalidPlan(
                "iteration count must be at least 1".to_string(),
            ));
        }
        let precision = self.write_precision.max(self.retrieve_precision);
        if precision > MAX_PRECISION {
            return Err(BenchError::InvalidPlan(format!(
                "precision {precision} exceeds {MAX_PRECISION} decimal places"
            )));
        }
        if self.scenario == Scenario::WriteCycle && self.patch.is_none() {
            return Err(BenchError::InvalidPlan(
                "write cycle needs an update patch".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cumulative slice sizes `i * (total / iterations)` for `i` in `1..=iterations`.
///
/// The remainder `total % iterations` is never part of any slice.
pub fn cumulative_sizes(total: usize, iterations: usize) -> Vec<usize> {
    if iterations == 0 {
        return Vec::new();
    }
    let step = total / iterations;
    (1..=iterations).map(|i| i * step).collect()
}
