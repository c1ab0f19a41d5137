//! Running one scenario end to end: load, connect, run, persist, close.

use crate::backend::{Backend, Connections};
use crate::config::BenchOpts;
use anyhow::Context;
use bench_core::{BackendAdapter, BenchmarkRunner, Dataset, Scenario, Target};
use bench_dataset::DatasetKind;
use bench_results::ResultSink;
use std::path::PathBuf;
use tracing::info;

/// Run `scenario` over `dataset` against an open adapter and write the
/// result file. Returns the written path.
pub async fn run_benchmark(
    adapter: &mut dyn BackendAdapter,
    scenario: Scenario,
    dataset_kind: DatasetKind,
    dataset: &Dataset,
    opts: &BenchOpts,
) -> anyhow::Result<PathBuf> {
    let plan = opts.plan(scenario, dataset_kind);
    let mut runner = BenchmarkRunner::new(plan, dataset, dataset_kind.target_name())
        .context("Invalid benchmark configuration")?;

    let bundle = runner
        .run(adapter)
        .await
        .with_context(|| format!("{scenario} on {} failed", adapter.name()))?;

    let sink = ResultSink::new(&opts.save_data_directory);
    let path = sink
        .write(&bundle)
        .with_context(|| format!("Failed to write results to {:?}", sink.dir()))?;

    info!(
        "{} {} finished: {} runs written to {}",
        bundle.dbms,
        bundle.operation,
        bundle.result.len(),
        path.display()
    );
    Ok(path)
}

/// Load the dataset, connect to `backend` and run one scenario.
pub async fn run_session(
    connections: &Connections,
    backend: Backend,
    scenario: Scenario,
    dataset_kind: DatasetKind,
    opts: &BenchOpts,
) -> anyhow::Result<PathBuf> {
    let dataset = load_dataset(dataset_kind, opts)?;
    let adapter = connections.connect(backend).await?;
    run_connected(adapter, backend, scenario, dataset_kind, &dataset, opts).await
}

pub fn load_dataset(dataset_kind: DatasetKind, opts: &BenchOpts) -> anyhow::Result<Dataset> {
    dataset_kind
        .load(&opts.data_directory)
        .with_context(|| format!("Failed to load {dataset_kind} dataset"))
}

/// Run one scenario on an open handle and close it.
///
/// The handle is closed even when the run fails; the run error wins.
pub async fn run_connected(
    mut adapter: Box<dyn BackendAdapter>,
    backend: Backend,
    scenario: Scenario,
    dataset_kind: DatasetKind,
    dataset: &Dataset,
    opts: &BenchOpts,
) -> anyhow::Result<PathBuf> {
    let result = async {
        if backend == Backend::Memory {
            seed_memory(adapter.as_mut(), scenario, dataset_kind, dataset).await?;
        }
        run_benchmark(adapter.as_mut(), scenario, dataset_kind, dataset, opts).await
    }
    .await;

    info!("Process finished. Closing {} connection", backend);
    let closed = adapter
        .close()
        .await
        .with_context(|| format!("Failed to close {backend} connection"));

    let path = result?;
    closed?;
    Ok(path)
}

/// Give read-only scenarios something to read on the in-process store.
async fn seed_memory(
    adapter: &mut dyn BackendAdapter,
    scenario: Scenario,
    dataset_kind: DatasetKind,
    dataset: &Dataset,
) -> anyhow::Result<()> {
    let target = Target::new(dataset_kind.target_name(), dataset.schema().clone());
    match scenario {
        Scenario::RetrieveOnly
        | Scenario::UpdateSlice
        | Scenario::DeleteSlice
        | Scenario::RetrieveSlice => {
            adapter.insert_batch(&target, dataset.records()).await?;
        }
        Scenario::RetrieveHash => {
            adapter
                .insert_hash(dataset_kind.target_name(), &dataset.hash_pairs())
                .await?;
        }
        _ => {}
    }
    Ok(())
}
