//! Run records and result bundles.
//!
//! The serialized layout is flat: every phase contributes three keys named
//! after its prefix (`inStartTime`, `inEndTime`, `inTime`, ...), next to the
//! iteration index (`run`) and the cumulative workload size (`qSize`).

use crate::timing::{Phase, PhaseTiming};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// One timed measurement row produced per iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// 1-based iteration index
    pub run: usize,
    /// Cumulative workload size of this iteration
    pub size: usize,
    /// Timed phases in execution order
    pub phases: Vec<PhaseTiming>,
}

impl RunRecord {
    pub fn new(run: usize, size: usize) -> Self {
        Self {
            run,
            size,
            phases: Vec::new(),
        }
    }

    pub fn push(&mut self, timing: PhaseTiming) {
        self.phases.push(timing);
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseTiming> {
        self.phases.iter().find(|t| t.phase == phase)
    }
}

impl Serialize for RunRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.phases.len() * 3))?;
        map.serialize_entry("run", &self.run)?;
        map.serialize_entry("qSize", &self.size)?;
        for timing in &self.phases {
            let prefix = timing.phase.key_prefix();
            map.serialize_entry(&format!("{prefix}StartTime"), &timing.start)?;
            map.serialize_entry(&format!("{prefix}EndTime"), &timing.end)?;
            map.serialize_entry(&format!("{prefix}Time"), &timing.elapsed)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RawRunRecord {
    run: usize,
    #[serde(rename = "qSize")]
    size: usize,
    #[serde(flatten)]
    timings: BTreeMap<String, f64>,
}

impl TryFrom<RawRunRecord> for RunRecord {
    type Error = String;

    fn try_from(raw: RawRunRecord) -> Result<Self, Self::Error> {
        let mut record = RunRecord::new(raw.run, raw.size);
        for key in raw.timings.keys() {
            let Some(prefix) = key.strip_suffix("StartTime") else {
                continue;
            };
            let phase = Phase::from_key_prefix(prefix)
                .ok_or_else(|| format!("unknown phase prefix '{prefix}' in run {}", raw.run))?;
            let lookup = |suffix: &str| {
                raw.timings
                    .get(&format!("{prefix}{suffix}"))
                    .copied()
                    .ok_or_else(|| format!("missing '{prefix}{suffix}' in run {}", raw.run))
            };
            record.push(PhaseTiming {
                phase,
                start: lookup("StartTime")?,
                end: lookup("EndTime")?,
                elapsed: lookup("Time")?,
            });
        }
        record.phases.sort_by_key(|t| t.phase);
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for RunRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawRunRecord::deserialize(deserializer)?;
        RunRecord::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// The full output of one scenario run, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    pub save_directory: String,
    pub table_name: String,
    pub dbms: String,
    pub operation: String,
    pub result: Vec<RunRecord>,
}

impl ResultBundle {
    /// File name the bundle is persisted under.
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.json", self.dbms, self.table_name, self.operation)
    }
}
