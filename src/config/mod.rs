//! Command-line configuration shared by the `run` and `menu` commands.

mod duration;

pub use duration::parse_duration;

use bench_core::{PatchRule, Scenario, ScenarioPlan, DEFAULT_ITERATIONS, MAX_PRECISION};
use bench_dataset::DatasetKind;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Options every benchmark run takes, whatever the backend.
#[derive(Args, Clone, Debug)]
pub struct BenchOpts {
    /// Directory holding loans.csv and user_post_comments.csv
    #[arg(long, env = "DATA_DIRECTORY", default_value = "data")]
    pub data_directory: PathBuf,

    /// Directory result files are written to
    #[arg(long, env = "SAVE_DATA_DIRECTORY", default_value = "results")]
    pub save_data_directory: PathBuf,

    /// Number of iterations per scenario
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Pause between the insert and update phases of a write cycle (e.g. "300ms", "1s")
    #[arg(long, value_parser = parse_duration)]
    pub pause: Option<Duration>,

    /// Decimal places for every recorded elapsed time (default: 2 for writes, 5 for retrieval)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64))]
    pub precision: Option<u32>,

    /// Seed for generated update text
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

impl BenchOpts {
    /// Build the plan for `scenario` over `dataset`.
    pub fn plan(&self, scenario: Scenario, dataset: DatasetKind) -> ScenarioPlan {
        let mut plan = ScenarioPlan::new(scenario, self.iterations)
            .with_pause(self.pause)
            .with_save_directory(self.save_data_directory.display().to_string());
        if let Some(precision) = self.precision {
            plan = plan.with_precision(precision, precision);
        }
        if scenario == Scenario::WriteCycle {
            plan = plan.with_patch(self.patch_rule(dataset));
        }
        plan
    }

    fn patch_rule(&self, dataset: DatasetKind) -> PatchRule {
        dataset.patch_rule(self.seed)
    }
}

/// Scenario selection for `run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    /// Insert, update and delete a growing slice
    #[value(name = "write-cycle")]
    WriteCycle,
    /// Retrieve a growing id range
    #[value(name = "retrieve")]
    Retrieve,
    /// Insert a growing slice
    #[value(name = "insert")]
    Insert,
    /// Write every record into one hash
    #[value(name = "insert-hash")]
    InsertHash,
    /// Fetch the whole hash
    #[value(name = "retrieve-hash")]
    RetrieveHash,
    /// Rewrite stored records of a growing slice, one record at a time
    #[value(name = "update-slice")]
    UpdateSlice,
    /// Delete stored records of a growing slice by id
    #[value(name = "delete-slice")]
    DeleteSlice,
    /// Fetch stored records of a growing slice by id
    #[value(name = "retrieve-slice")]
    RetrieveSlice,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::WriteCycle => Scenario::WriteCycle,
            ScenarioArg::Retrieve => Scenario::RetrieveOnly,
            ScenarioArg::Insert => Scenario::InsertOnly,
            ScenarioArg::InsertHash => Scenario::InsertHash,
            ScenarioArg::RetrieveHash => Scenario::RetrieveHash,
            ScenarioArg::UpdateSlice => Scenario::UpdateSlice,
            ScenarioArg::DeleteSlice => Scenario::DeleteSlice,
            ScenarioArg::RetrieveSlice => Scenario::RetrieveSlice,
        }
    }
}

/// Dataset selection for `run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatasetArg {
    /// Library loans (loans.csv)
    #[value(name = "loans")]
    Loans,
    /// Social media comments (user_post_comments.csv)
    #[value(name = "user-post-comments")]
    UserPostComments,
}

impl From<DatasetArg> for DatasetKind {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Loans => DatasetKind::Loans,
            DatasetArg::UserPostComments => DatasetKind::UserPostComments,
        }
    }
}

/// Scenario and dataset for one `run` invocation.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Workload to run
    #[arg(long, value_enum)]
    pub scenario: ScenarioArg,

    /// Dataset to load
    #[arg(long, value_enum, default_value = "loans")]
    pub dataset: DatasetArg,

    #[command(flatten)]
    pub bench: BenchOpts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn opts() -> BenchOpts {
        BenchOpts {
            data_directory: PathBuf::from("data"),
            save_data_directory: PathBuf::from("out"),
            iterations: 5,
            pause: None,
            precision: None,
            seed: 1,
        }
    }

    #[test]
    fn test_plan_for_write_cycle_has_patch() {
        let plan = opts().plan(Scenario::WriteCycle, DatasetKind::Loans);
        assert!(plan.validate().is_ok());
        assert_eq!(plan.patch.as_ref().map(|p| p.field()), Some("ReturnDate"));
        assert_eq!(plan.save_directory, "out");
    }

    #[test]
    fn test_plan_precision_override() {
        let mut opts = opts();
        opts.precision = Some(3);
        let plan = opts.plan(Scenario::RetrieveOnly, DatasetKind::Loans);
        assert_eq!(plan.write_precision, 3);
        assert_eq!(plan.retrieve_precision, 3);
        assert!(plan.patch.is_none());
    }

    #[test]
    fn test_precision_is_bounded() {
        let cli = TestCli::try_parse_from(["test", "--scenario", "retrieve", "--precision", "15"])
            .unwrap();
        assert_eq!(cli.run.bench.precision, Some(15));

        let err = TestCli::try_parse_from(["test", "--scenario", "retrieve", "--precision", "16"]);
        assert!(err.is_err());
        let err = TestCli::try_parse_from(["test", "--scenario", "retrieve", "--precision", "400"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_slice_scenario_args() {
        let cli = TestCli::try_parse_from(["test", "--scenario", "delete-slice"]).unwrap();
        assert_eq!(Scenario::from(cli.run.scenario), Scenario::DeleteSlice);
        assert_eq!(
            Scenario::from(ScenarioArg::UpdateSlice),
            Scenario::UpdateSlice
        );
        assert_eq!(
            Scenario::from(ScenarioArg::RetrieveSlice),
            Scenario::RetrieveSlice
        );

        let plan = opts().plan(Scenario::UpdateSlice, DatasetKind::Loans);
        assert!(plan.patch.is_none());
        assert!(plan.validate().is_ok());
    }
}
