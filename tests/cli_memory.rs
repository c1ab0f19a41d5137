//! End-to-end CLI runs against the in-process backend.

use std::path::Path;
use std::process::{Command, Output};

fn execute_dbms_bench(args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_dbms-bench"))
        .args(args)
        .env("RUST_LOG", "dbms_bench=debug")
        .output()?;
    Ok(output)
}

fn assert_cli_success(output: &Output, command_desc: &str) {
    if !output.status.success() {
        panic!(
            "{} failed!\nExit code: {:?}\nStdout: {}\nStderr: {}",
            command_desc,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn write_comments(dir: &Path, count: usize) -> std::io::Result<()> {
    let mut csv = String::from("PostCommentID,UserID,PostID,Content\n");
    for i in 1..=count {
        csv.push_str(&format!("{i},{i},{i},comment {i}\n"));
    }
    std::fs::write(dir.join("user_post_comments.csv"), csv)
}

#[test]
fn test_memory_write_cycle_cli() -> Result<(), Box<dyn std::error::Error>> {
    let data = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    write_comments(data.path(), 40)?;

    let data_dir = data.path().to_string_lossy().to_string();
    let out_dir = out.path().to_string_lossy().to_string();
    let output = execute_dbms_bench(&[
        "run",
        "memory",
        "--scenario",
        "write-cycle",
        "--dataset",
        "user-post-comments",
        "--data-directory",
        &data_dir,
        "--save-data-directory",
        &out_dir,
        "--iterations",
        "4",
    ])?;
    assert_cli_success(&output, "memory write cycle");

    let path = out.path().join("Memory_UserPostComment_runTest.json");
    let bundle: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(bundle["dbms"], "Memory");
    assert_eq!(bundle["operation"], "runTest");

    let sizes: Vec<u64> = bundle["result"]
        .as_array()
        .ok_or("result is not an array")?
        .iter()
        .filter_map(|run| run["qSize"].as_u64())
        .collect();
    assert_eq!(sizes, vec![10, 20, 30, 40]);
    Ok(())
}

#[test]
fn test_missing_dataset_fails_cli() -> Result<(), Box<dyn std::error::Error>> {
    let data = tempfile::tempdir()?;
    let data_dir = data.path().to_string_lossy().to_string();

    let output = execute_dbms_bench(&[
        "run",
        "memory",
        "--scenario",
        "retrieve",
        "--data-directory",
        &data_dir,
    ])?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load loans dataset"), "{stderr}");
    Ok(())
}

#[test]
fn test_menu_stops_on_end_of_input() -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = Command::new(env!("CARGO_BIN_EXE_dbms-bench"))
        .arg("menu")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    child.stdin.take().ok_or("no stdin")?.write_all(b"7\n")?;
    let output = child.wait_with_output()?;

    assert_cli_success(&output, "menu");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DBMS Options:"));
    assert!(stdout.contains("Invalid selection: '7'"));
    Ok(())
}

#[test]
fn test_memory_update_slice_cli() -> Result<(), Box<dyn std::error::Error>> {
    let data = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    write_comments(data.path(), 30)?;

    let data_dir = data.path().to_string_lossy().to_string();
    let out_dir = out.path().to_string_lossy().to_string();
    let output = execute_dbms_bench(&[
        "run",
        "memory",
        "--scenario",
        "update-slice",
        "--dataset",
        "user-post-comments",
        "--data-directory",
        &data_dir,
        "--save-data-directory",
        &out_dir,
        "--iterations",
        "3",
    ])?;
    assert_cli_success(&output, "memory update slice");

    let path = out.path().join("Memory_UserPostComment_Update.json");
    let bundle: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let runs = bundle["result"].as_array().ok_or("result is not an array")?;
    assert_eq!(runs.len(), 3);
    assert!(runs.iter().all(|run| run["upIdsTime"].is_number()));
    assert_eq!(runs[2]["qSize"], 30);
    Ok(())
}

#[test]
fn test_precision_out_of_range_fails_cli() -> Result<(), Box<dyn std::error::Error>> {
    let output = execute_dbms_bench(&[
        "run",
        "memory",
        "--scenario",
        "retrieve",
        "--precision",
        "400",
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--precision"));
    Ok(())
}
