use bench_core::{PatchRule, Scenario};
use bench_dataset::{DatasetKind, CONTENT_LENGTH};
use dbms_bench::BenchOpts;
use std::path::PathBuf;
use std::time::Duration;

fn opts() -> BenchOpts {
    BenchOpts {
        data_directory: PathBuf::from("data"),
        save_data_directory: PathBuf::from("results"),
        iterations: 5,
        pause: Some(Duration::from_millis(300)),
        precision: None,
        seed: 42,
    }
}

#[test]
fn test_write_cycle_plan_for_loans_stamps_return_date() {
    let plan = opts().plan(Scenario::WriteCycle, DatasetKind::Loans);

    assert_eq!(plan.iterations, 5);
    assert_eq!(plan.pause, Some(Duration::from_millis(300)));
    assert_eq!(plan.save_directory, "results");
    match plan.patch {
        Some(PatchRule::CurrentTime { ref field }) => assert_eq!(field, "ReturnDate"),
        ref other => panic!("unexpected patch rule: {other:?}"),
    }
}

#[test]
fn test_write_cycle_plan_for_comments_replaces_content() {
    let plan = opts().plan(Scenario::WriteCycle, DatasetKind::UserPostComments);

    match plan.patch {
        Some(PatchRule::Fixed(ref patch)) => {
            assert_eq!(patch.field, "Content");
            assert_eq!(patch.value.to_text().chars().count(), CONTENT_LENGTH);
        }
        ref other => panic!("unexpected patch rule: {other:?}"),
    }
}

#[test]
fn test_retrieve_plan_has_no_patch() {
    let plan = opts().plan(Scenario::RetrieveOnly, DatasetKind::Loans);
    assert!(plan.patch.is_none());
    assert!(plan.validate().is_ok());
}

#[test]
fn test_precision_override_applies_to_both_phases() {
    let mut opts = opts();
    opts.precision = Some(3);
    let plan = opts.plan(Scenario::WriteCycle, DatasetKind::Loans);
    assert_eq!(plan.write_precision, 3);
    assert_eq!(plan.retrieve_precision, 3);
}
