//! Integration tests for the `run` command.
use energyroi::cli::{RunOpts, handle_run_command};
use energyroi::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example input file.
fn get_input_path() -> PathBuf {
    PathBuf::from("demos/motor_retrofit/input.toml")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("ENERGYROI_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        ..RunOpts::default()
    };
    handle_run_command(&get_input_path(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "summary.csv",
        "cash_flows.csv",
        "metadata.toml",
        "energyroi_info.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
    }
    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("investment_signal,Highly Favorable,"));

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("results2")),
        ..RunOpts::default()
    };
    assert_eq!(
        handle_run_command(&get_input_path(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}

/// The output folder is not overwritten unless requested
#[test]
fn test_handle_run_command_existing_output() {
    let tempdir = tempdir().unwrap();
    fs::write(tempdir.path().join("notes.txt"), "keep me").unwrap();

    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        ..RunOpts::default()
    };
    let err = handle_run_command(&get_input_path(), &opts, Some(Settings::default()))
        .unwrap_err()
        .to_string();
    assert!(err.starts_with("Failed to create output directory"));
    assert!(tempdir.path().join("notes.txt").is_file());
}
