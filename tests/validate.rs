//! Integration tests for the `validate` command.
use energyroi::cli::handle_validate_command;
use energyroi::log::is_logger_initialised;
use energyroi::settings::Settings;
use std::path::PathBuf;

/// Get the path to the example input file.
fn get_input_path() -> PathBuf {
    PathBuf::from("demos/pump_upgrade/input.toml")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("ENERGYROI_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    handle_validate_command(&get_input_path(), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
}
