//! Fixtures for tests
use crate::appraisal::{Appraisal, AppraisalOptions, appraise};
use crate::input::InputParameters;
use crate::units::{Money, MoneyPerEnergy, Percent, Power};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The motor retrofit from the bundled demo data
#[fixture]
pub fn input() -> InputParameters {
    InputParameters {
        equipment_name: "Chiller pump motor".into(),
        existing_power: Power(37.3),
        proposed_power: Power(29.8),
        operating_hours_per_day: 16.0,
        operating_days_per_year: 300.0,
        electricity_cost: MoneyPerEnergy(7.5),
        initial_investment: Money(185_000.0),
        project_life: 10,
        discount_rate: Percent(10.0),
    }
}

/// A retrofit which saves too little to recover its cost within the project life
#[fixture]
pub fn unprofitable_input() -> InputParameters {
    InputParameters {
        equipment_name: "Corridor lighting".into(),
        existing_power: Power(2.0),
        proposed_power: Power(1.8),
        operating_hours_per_day: 8.0,
        operating_days_per_year: 250.0,
        electricity_cost: MoneyPerEnergy(7.5),
        initial_investment: Money(50_000.0),
        project_life: 10,
        discount_rate: Percent(8.0),
    }
}

#[fixture]
pub fn appraisal(input: InputParameters) -> Appraisal {
    appraise(&input, &AppraisalOptions::default())
}
