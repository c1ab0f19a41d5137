//! Wall-clock timing of benchmark phases.

use crate::error::BenchError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Decimal places kept for insert/update/delete elapsed times.
pub const WRITE_PRECISION: u32 = 2;

/// Decimal places kept for retrieval elapsed times.
pub const RETRIEVE_PRECISION: u32 = 5;

/// Most decimal places an elapsed time can carry; `f64` holds no more.
pub const MAX_PRECISION: u32 = 15;

/// A timed step within one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Insert,
    Update,
    Delete,
    Retrieve,
    HashInsert,
    HashRetrieve,
    /// Per-record update of an id slice
    SliceUpdate,
    SliceDelete,
    SliceRetrieve,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::Insert,
        Phase::Update,
        Phase::Delete,
        Phase::Retrieve,
        Phase::HashInsert,
        Phase::HashRetrieve,
        Phase::SliceUpdate,
        Phase::SliceDelete,
        Phase::SliceRetrieve,
    ];

    /// Key prefix used in result files (`inStartTime`, `q1Time`, ...).
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Phase::Insert => "in",
            Phase::Update => "up",
            Phase::Delete => "del",
            Phase::Retrieve => "q1",
            Phase::HashInsert => "hin",
            Phase::HashRetrieve => "hq",
            Phase::SliceUpdate => "upIds",
            Phase::SliceDelete => "delIds",
            Phase::SliceRetrieve => "qIds",
        }
    }

    pub fn from_key_prefix(prefix: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.key_prefix() == prefix)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Insert => write!(f, "insert"),
            Phase::Update => write!(f, "update"),
            Phase::Delete => write!(f, "delete"),
            Phase::Retrieve => write!(f, "retrieve"),
            Phase::HashInsert => write!(f, "hash insert"),
            Phase::HashRetrieve => write!(f, "hash retrieve"),
            Phase::SliceUpdate => write!(f, "slice update"),
            Phase::SliceDelete => write!(f, "slice delete"),
            Phase::SliceRetrieve => write!(f, "slice retrieve"),
        }
    }
}

/// Start, end and elapsed seconds of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    /// Seconds since the Unix epoch
    pub start: f64,
    /// Seconds since the Unix epoch
    pub end: f64,
    /// `|end - start|` rounded to the phase precision
    pub elapsed: f64,
}

impl PhaseTiming {
    pub fn new(phase: Phase, start: f64, end: f64, precision: u32) -> Self {
        Self {
            phase,
            start,
            end,
            elapsed: round_to((end - start).abs(), precision),
        }
    }
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Round `value` to `precision` decimal places, capped at [`MAX_PRECISION`].
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    (value * factor).round() / factor
}

/// Await `operation` between two wall-clock readings.
pub async fn time_phase<T, F>(
    phase: Phase,
    precision: u32,
    operation: F,
) -> Result<(T, PhaseTiming), BenchError>
where
    F: Future<Output = Result<T, BenchError>>,
{
    let start = epoch_seconds();
    let output = operation.await?;
    let end = epoch_seconds();
    Ok((output, PhaseTiming::new(phase, start, end, precision)))
}
