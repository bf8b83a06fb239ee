//! The energy and cost reduction model.
//!
//! Converts the power draw, operating schedule and tariff of a retrofit into annual energy, cost
//! and CO₂ figures for the existing and proposed equipment. Everything here is closed-form
//! arithmetic.
use crate::input::InputParameters;
use crate::units::{
    EmissionsPerEnergy, EmissionsPerYear, EnergyPerYear, HoursPerYear, MoneyPerYear, Percent,
    Power,
};
use serde::{Deserialize, Serialize};

/// The default grid emission factor (kg CO₂ per kWh)
pub const DEFAULT_GRID_EMISSION_FACTOR: EmissionsPerEnergy = EmissionsPerEnergy(0.82);

/// Kilograms per tonne
const KG_PER_TONNE: f64 = 1000.0;

/// Annual energy, cost and emissions for the existing and proposed equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCostResult {
    /// Reduction in power draw (kW)
    pub power_reduction: Power,
    /// Reduction in power draw as a percentage of the existing power draw
    pub power_reduction_percent: Percent,
    /// Annual consumption of the existing equipment (kWh/yr)
    pub existing_annual_consumption: EnergyPerYear,
    /// Annual consumption of the proposed equipment (kWh/yr)
    pub proposed_annual_consumption: EnergyPerYear,
    /// Reduction in annual consumption (kWh/yr)
    pub annual_energy_savings: EnergyPerYear,
    /// Annual electricity cost of the existing equipment
    pub existing_annual_cost: MoneyPerYear,
    /// Annual electricity cost of the proposed equipment
    pub proposed_annual_cost: MoneyPerYear,
    /// Reduction in annual electricity cost
    pub annual_cost_savings: MoneyPerYear,
    /// Annual emissions of the existing equipment (t CO₂/yr)
    pub existing_carbon_emissions: EmissionsPerYear,
    /// Annual emissions of the proposed equipment (t CO₂/yr)
    pub proposed_carbon_emissions: EmissionsPerYear,
    /// Avoided annual emissions (t CO₂/yr)
    pub co2_reduction: EmissionsPerYear,
}

/// Annual emissions in tonnes for the given consumption
fn annual_emissions(
    consumption: EnergyPerYear,
    grid_emission_factor: EmissionsPerEnergy,
) -> EmissionsPerYear {
    EmissionsPerYear(consumption.value() * grid_emission_factor.value() / KG_PER_TONNE)
}

/// Calculate annual energy, cost and emission figures for a retrofit.
///
/// If the proposed power draw is not lower than the existing one, the savings figures are zero
/// or negative. It is up to the caller whether to reject such inputs.
///
/// # Arguments
///
/// * `input` - Project parameters
/// * `grid_emission_factor` - CO₂ emitted per kWh drawn from the grid
pub fn compute_energy_cost(
    input: &InputParameters,
    grid_emission_factor: EmissionsPerEnergy,
) -> EnergyCostResult {
    let hours = HoursPerYear::from_schedule(
        input.operating_hours_per_day,
        input.operating_days_per_year,
    );

    let existing_annual_consumption = input.existing_power * hours;
    let proposed_annual_consumption = input.proposed_power * hours;
    let existing_annual_cost = existing_annual_consumption * input.electricity_cost;
    let proposed_annual_cost = proposed_annual_consumption * input.electricity_cost;
    let existing_carbon_emissions =
        annual_emissions(existing_annual_consumption, grid_emission_factor);
    let proposed_carbon_emissions =
        annual_emissions(proposed_annual_consumption, grid_emission_factor);

    let annual_energy_savings = existing_annual_consumption - proposed_annual_consumption;

    let power_reduction = input.existing_power - input.proposed_power;
    let power_reduction_percent = if input.existing_power > Power(0.0) {
        Percent::from_fraction(power_reduction / input.existing_power)
    } else {
        Percent(0.0)
    };

    EnergyCostResult {
        power_reduction,
        power_reduction_percent,
        existing_annual_consumption,
        proposed_annual_consumption,
        annual_energy_savings,
        existing_annual_cost,
        proposed_annual_cost,
        annual_cost_savings: existing_annual_cost - proposed_annual_cost,
        existing_carbon_emissions,
        proposed_carbon_emissions,
        co2_reduction: annual_emissions(annual_energy_savings, grid_emission_factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::input;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_compute_energy_cost(input: InputParameters) {
        let result = compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR);

        assert_approx_eq!(
            EnergyPerYear,
            result.existing_annual_consumption,
            EnergyPerYear(179_040.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            EnergyPerYear,
            result.proposed_annual_consumption,
            EnergyPerYear(143_040.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            EnergyPerYear,
            result.annual_energy_savings,
            EnergyPerYear(36_000.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            MoneyPerYear,
            result.annual_cost_savings,
            MoneyPerYear(270_000.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            MoneyPerYear,
            result.existing_annual_cost - result.proposed_annual_cost,
            result.annual_cost_savings,
            epsilon = 1e-6
        );
        assert_approx_eq!(
            EmissionsPerYear,
            result.co2_reduction,
            EmissionsPerYear(29.52),
            epsilon = 1e-9
        );
        assert_approx_eq!(
            EmissionsPerYear,
            result.existing_carbon_emissions - result.proposed_carbon_emissions,
            result.co2_reduction,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_compute_energy_cost_power_reduction(input: InputParameters) {
        let result = compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR);
        assert_approx_eq!(Power, result.power_reduction, Power(7.5), epsilon = 1e-9);
        assert_approx_eq!(
            Percent,
            result.power_reduction_percent,
            Percent(7.5 / 37.3 * 100.0),
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_compute_energy_cost_power_reduction_no_existing_power(mut input: InputParameters) {
        input.existing_power = Power(0.0);
        input.proposed_power = Power(0.0);
        let result = compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR);
        assert_eq!(result.power_reduction, Power(0.0));
        assert_eq!(result.power_reduction_percent, Percent(0.0));
    }

    #[rstest]
    fn test_compute_energy_cost_custom_factor(input: InputParameters) {
        let result = compute_energy_cost(&input, EmissionsPerEnergy(0.5));
        assert_approx_eq!(
            EmissionsPerYear,
            result.co2_reduction,
            EmissionsPerYear(18.0),
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_compute_energy_cost_no_reduction(mut input: InputParameters) {
        input.proposed_power = Power(40.0);
        let result = compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR);
        assert!(result.annual_energy_savings < EnergyPerYear(0.0));
        assert!(result.annual_cost_savings < MoneyPerYear(0.0));
        assert!(result.co2_reduction < EmissionsPerYear(0.0));
    }

    #[rstest]
    fn test_compute_energy_cost_deterministic(input: InputParameters) {
        assert_eq!(
            compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR),
            compute_energy_cost(&input, DEFAULT_GRID_EMISSION_FACTOR)
        );
    }
}
