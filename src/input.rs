//! Common routines for reading and validating input data.
use crate::units::{Money, MoneyPerEnergy, Percent, Power};
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The minimum number of characters in an equipment name
const MIN_EQUIPMENT_NAME_LENGTH: usize = 3;

/// The parameters describing a single retrofit project.
///
/// Fields are read from a TOML file whose keys match the field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParameters {
    /// Free-text label for the equipment being replaced. Display only.
    pub equipment_name: String,
    /// Power draw of the existing equipment (kW)
    pub existing_power: Power,
    /// Power draw of the proposed equipment (kW)
    pub proposed_power: Power,
    /// Operating hours per day
    pub operating_hours_per_day: f64,
    /// Operating days per year
    pub operating_days_per_year: f64,
    /// Electricity tariff (currency per kWh)
    pub electricity_cost: MoneyPerEnergy,
    /// Up-front capital cost of the retrofit
    pub initial_investment: Money,
    /// Number of years over which savings accrue
    pub project_life: u32,
    /// Discount rate as a percentage
    pub discount_rate: Percent,
}

impl InputParameters {
    /// Check that the parameters lie within the ranges accepted by the application.
    ///
    /// The calculation itself does not require this (and does not call it), but results for
    /// parameters outside these ranges are not meaningful.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.equipment_name.trim().chars().count() >= MIN_EQUIPMENT_NAME_LENGTH,
            "Equipment Name: must be at least {MIN_EQUIPMENT_NAME_LENGTH} characters"
        );

        check_range("Baseline Power", self.existing_power.value(), 0.01, 1000.0)?;
        check_range("Target Power", self.proposed_power.value(), 0.01, 1000.0)?;
        ensure!(
            self.proposed_power < self.existing_power,
            "Target Power: must be less than baseline power ({} kW)",
            self.existing_power
        );

        check_range("Daily Runtime", self.operating_hours_per_day, 0.01, 24.0)?;
        check_range("Annual Days", self.operating_days_per_year, 1.0, 365.0)?;
        check_range("Energy Rate", self.electricity_cost.value(), 0.01, 100.0)?;
        check_range(
            "Capital Investment",
            self.initial_investment.value(),
            1.0,
            f64::INFINITY,
        )?;
        ensure!(
            (1..=50).contains(&self.project_life),
            "Asset Life: must be between 1 and 50 years"
        );
        check_range("Discount Rate", self.discount_rate.value(), 0.0, 50.0)?;

        Ok(())
    }
}

/// Check that a numeric field is finite and within `min..=max`
fn check_range(label: &str, value: f64, min: f64, max: f64) -> Result<()> {
    ensure!(value.is_finite(), "{label}: must be a finite number");
    ensure!(value >= min, "{label}: must be at least {min}");
    ensure!(value <= max, "{label}: must be at most {max}");

    Ok(())
}

/// Format an error message for a file which could not be read
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read and validate project parameters from the specified TOML file
pub fn read_input(file_path: &Path) -> Result<InputParameters> {
    let input: InputParameters = read_toml(file_path)?;
    input.validate().with_context(|| input_err_msg(file_path))?;

    Ok(input)
}
