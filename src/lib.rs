//! Common functionality for EnergyROI.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod appraisal;
pub mod cli;
pub mod energy;
pub mod finance;
pub mod history;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is where settings and the analysis history are stored. Falls back on the current
/// directory if no config dir can be determined for the platform.
pub fn get_energyroi_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::new();
    };
    dir.push("energyroi");

    dir
}
