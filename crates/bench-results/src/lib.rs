//! Filesystem persistence of result bundles.
//!
//! Each bundle is written as pretty JSON to
//! `{dbms}_{tableName}_{operation}.json` inside the save directory. A later run
//! of the same backend, target and operation overwrites the file.

use bench_core::ResultBundle;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while writing or reading result files.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid result file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes result bundles into one directory.
#[derive(Debug, Clone)]
pub struct ResultSink {
    dir: PathBuf,
}

impl ResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bundle`, returning the path of the written file.
    pub fn write(&self, bundle: &ResultBundle) -> Result<PathBuf, SinkError> {
        write_bundle(bundle, &self.dir)
    }

    /// Read back the bundle previously written for the same name triple.
    pub fn read_matching(&self, bundle: &ResultBundle) -> Result<ResultBundle, SinkError> {
        read_bundle(self.dir.join(bundle.file_name()))
    }
}

/// Serialize `bundle` into `directory`, creating the directory if needed.
pub fn write_bundle(bundle: &ResultBundle, directory: &Path) -> Result<PathBuf, SinkError> {
    std::fs::create_dir_all(directory).map_err(|source| SinkError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let path = directory.join(bundle.file_name());
    let content = serde_json::to_string_pretty(bundle).map_err(|source| SinkError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, content).map_err(|source| SinkError::Io {
        path: path.clone(),
        source,
    })?;

    info!(
        "Saved {} run records to {}",
        bundle.result.len(),
        path.display()
    );
    Ok(path)
}

/// Parse a bundle written by [`write_bundle`].
pub fn read_bundle(path: impl AsRef<Path>) -> Result<ResultBundle, SinkError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SinkError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::{Phase, PhaseTiming, RunRecord, RETRIEVE_PRECISION, WRITE_PRECISION};
    use tempfile::TempDir;

    fn bundle(dir: &Path, operation: &str) -> ResultBundle {
        let result = (1..=3)
            .map(|run| {
                let start = 1_700_000_000.0 + run as f64;
                let mut record = RunRecord::new(run, run * 10);
                record.push(PhaseTiming::new(
                    Phase::Insert,
                    start,
                    start + 0.125,
                    WRITE_PRECISION,
                ));
                record.push(PhaseTiming::new(
                    Phase::Update,
                    start + 0.125,
                    start + 0.5,
                    WRITE_PRECISION,
                ));
                record.push(PhaseTiming::new(
                    Phase::Delete,
                    start + 0.5,
                    start + 0.75,
                    WRITE_PRECISION,
                ));
                record
            })
            .collect();
        ResultBundle {
            save_directory: dir.display().to_string(),
            table_name: "loans".to_string(),
            dbms: "MongoDB".to_string(),
            operation: operation.to_string(),
            result,
        }
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let original = bundle(dir.path(), "runTest");

        let path = write_bundle(&original, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("MongoDB_loans_runTest.json"));

        let parsed = read_bundle(&path).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_written_file_uses_flat_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_bundle(&bundle(dir.path(), "runTest"), dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["dbms"], "MongoDB");
        assert_eq!(raw["tableName"], "loans");
        assert_eq!(raw["operation"], "runTest");
        assert_eq!(raw["result"][1]["run"], 2);
        assert_eq!(raw["result"][1]["qSize"], 20);
        assert_eq!(raw["result"][1]["inTime"], 0.13);
        assert_eq!(raw["result"][1]["upTime"], 0.38);
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let sink = ResultSink::new(dir.path());

        let mut first = bundle(dir.path(), "search");
        first.result.truncate(1);
        sink.write(&first).unwrap();

        let mut second = bundle(dir.path(), "search");
        second.result[0].phases = vec![PhaseTiming::new(
            Phase::Retrieve,
            1.0,
            1.123456,
            RETRIEVE_PRECISION,
        )];
        sink.write(&second).unwrap();

        let parsed = sink.read_matching(&second).unwrap();
        assert_eq!(parsed.result.len(), 3);
        assert_eq!(parsed.result[0].phases[0].elapsed, 0.12346);
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("results").join("mongodb");
        let path = write_bundle(&bundle(&nested, "runTest"), &nested).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_bundle(&bundle(&blocker, "runTest"), &blocker).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_bundle(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
