//! Code for loading program settings.
use crate::appraisal::DEFAULT_PAYBACK_BENCHMARK;
use crate::energy::DEFAULT_GRID_EMISSION_FACTOR;
use crate::get_energyroi_config_dir;
use crate::history::DEFAULT_HISTORY_SIZE;
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use crate::units::{EmissionsPerEnergy, Year};
use anyhow::{Result, ensure};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# This file contains the program settings for EnergyROI
# Remove the leading '#' from a line to change a setting from its default value
";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_grid_emission_factor() -> EmissionsPerEnergy {
    DEFAULT_GRID_EMISSION_FACTOR
}

fn default_payback_benchmark() -> Year {
    DEFAULT_PAYBACK_BENCHMARK
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    let mut path = get_energyroi_config_dir();
    path.push(SETTINGS_FILE_NAME);

    path
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// The default program log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether to overwrite output files by default
    #[serde(default)]
    pub overwrite: bool,
    /// CO2 emitted per kWh of grid electricity (kg/kWh)
    #[serde(default = "default_grid_emission_factor")]
    pub grid_emission_factor: EmissionsPerEnergy,
    /// Payback period (years) against which projects are benchmarked
    #[serde(default = "default_payback_benchmark")]
    pub payback_benchmark: Year,
    /// The maximum number of analyses kept in the history
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            grid_emission_factor: default_grid_emission_factor(),
            payback_benchmark: default_payback_benchmark(),
            history_size: default_history_size(),
        }
    }
}

impl Settings {
    /// Read the contents of the program settings file.
    ///
    /// If the file is not present, default values for settings will be used
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read from the specified path, returning default settings if the file doesn't exist
    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        let settings: Settings = read_toml(file_path)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Check that the settings values are usable
    fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_emission_factor.is_finite()
                && self.grid_emission_factor >= EmissionsPerEnergy(0.0),
            "grid_emission_factor must be a non-negative number"
        );
        ensure!(
            self.payback_benchmark.is_finite() && self.payback_benchmark > Year(0.0),
            "payback_benchmark must be a positive number"
        );
        ensure!(self.history_size > 0, "history_size must be at least 1");

        Ok(())
    }

    /// The contents of the default settings file
    pub fn default_file_contents() -> String {
        // Settings object with default values set by serde
        let settings: Settings =
            toml::from_str("").expect("Cannot create settings from empty TOML file");

        // Convert to TOML
        let settings_raw = toml::to_string(&settings).expect("Could not convert settings to TOML");

        // Iterate through the generated TOML, commenting out lines and adding docs
        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for line in settings_raw.split('\n') {
            if let Some(last) = line.find('=') {
                // Add documentation from doc comments
                let field = line[..last].trim();

                // Use doc comment to document parameter. All fields should have doc comments.
                let docs = Settings::get_field_docs(field).expect("Missing doc comment for field");
                for line in docs.split('\n') {
                    write!(&mut out, "\n# # {}\n", line.trim()).unwrap();
                }

                writeln!(&mut out, "# {}", line.trim()).unwrap();
            }
        }

        out
    }
}
