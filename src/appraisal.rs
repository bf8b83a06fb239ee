//! Code for appraising a retrofit project from start to finish.
//!
//! An appraisal runs the energy model, then the financial engine, then derives a few headline
//! figures used to support the investment decision.
use crate::energy::{DEFAULT_GRID_EMISSION_FACTOR, EnergyCostResult, compute_energy_cost};
use crate::finance::{FinancialResult, IrrSolver, compute_financials};
use crate::input::InputParameters;
use crate::settings::Settings;
use crate::units::{Dimensionless, Emissions, EmissionsPerEnergy, Money, Percent, Year};
use ::log::{debug, warn};
use serde::{Deserialize, Serialize};

/// The default payback period against which projects are benchmarked
pub const DEFAULT_PAYBACK_BENCHMARK: Year = Year(4.5);

/// Number of trees needed to absorb one tonne of CO₂ in a year
const TREES_PER_TONNE_CO2: f64 = 45.0;

/// Parameters for an appraisal which do not depend on the project
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppraisalOptions {
    /// CO₂ emitted per kWh of grid electricity
    pub grid_emission_factor: EmissionsPerEnergy,
    /// Typical payback period for efficiency projects
    pub payback_benchmark: Year,
    /// Root finder for the IRR
    pub solver: IrrSolver,
}

impl Default for AppraisalOptions {
    fn default() -> Self {
        Self {
            grid_emission_factor: DEFAULT_GRID_EMISSION_FACTOR,
            payback_benchmark: DEFAULT_PAYBACK_BENCHMARK,
            solver: IrrSolver::default(),
        }
    }
}

impl AppraisalOptions {
    /// Take options from the program settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            grid_emission_factor: settings.grid_emission_factor,
            payback_benchmark: settings.payback_benchmark,
            ..Self::default()
        }
    }
}

/// Headline figures derived from the energy and financial results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionInsights {
    /// Undiscounted savings over the whole project life
    pub lifetime_cost_savings: Money,
    /// Lifetime savings net of the investment, as a percentage of the investment
    pub return_on_investment: Percent,
    /// Lifetime savings divided by the investment
    pub savings_multiple: Dimensionless,
    /// Avoided CO₂ over the whole project life (t)
    pub lifetime_co2_reduction: Emissions,
    /// Number of trees which would absorb the same CO₂ over a year
    pub trees_equivalent: u64,
    /// How much faster than the benchmark the project pays back, as a percentage of the
    /// benchmark. Negative if slower; `None` if the project never pays back.
    pub payback_vs_benchmark: Option<Percent>,
    /// Recommendation text for the investment signal
    pub recommendation: String,
}

impl DecisionInsights {
    /// Derive the insights for a project
    fn new(
        input: &InputParameters,
        energy: &EnergyCostResult,
        financial: &FinancialResult,
        payback_benchmark: Year,
    ) -> Self {
        let life = Year(input.project_life as f64);
        let lifetime_cost_savings = energy.annual_cost_savings * life;
        let savings_multiple = lifetime_cost_savings / input.initial_investment;
        let lifetime_co2_reduction = energy.co2_reduction * life;

        let payback = financial.simple_payback_period;
        let payback_vs_benchmark = payback
            .is_finite()
            .then(|| Percent::from_fraction((payback_benchmark - payback) / payback_benchmark));

        Self {
            lifetime_cost_savings,
            return_on_investment: Percent::from_fraction(savings_multiple - Dimensionless(1.0)),
            savings_multiple,
            lifetime_co2_reduction,
            trees_equivalent: (lifetime_co2_reduction.value() * TREES_PER_TONNE_CO2)
                .round()
                .max(0.0) as u64,
            payback_vs_benchmark,
            recommendation: financial.investment_signal.recommendation().to_string(),
        }
    }
}

/// The complete results of appraising a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appraisal {
    /// The parameters which were appraised
    pub input: InputParameters,
    /// Annual energy, cost and emissions figures
    pub energy: EnergyCostResult,
    /// Financial metrics
    pub financial: FinancialResult,
    /// Derived headline figures
    pub insights: DecisionInsights,
}

/// Appraise a retrofit project.
///
/// This is a pure function of its arguments. Input parameters are not validated here; see
/// [`InputParameters::validate`].
pub fn appraise(input: &InputParameters, options: &AppraisalOptions) -> Appraisal {
    let energy = compute_energy_cost(input, options.grid_emission_factor);
    let financial = compute_financials(input, &energy, &options.solver);
    let insights = DecisionInsights::new(input, &energy, &financial, options.payback_benchmark);

    debug!(
        "Appraised {}: savings {}/yr, NPV {}, IRR {:?}, signal {}",
        input.equipment_name,
        energy.annual_cost_savings,
        financial.npv,
        financial.irr,
        financial.investment_signal
    );
    if financial.irr.is_none() {
        warn!(
            "IRR could not be computed for {} (annual savings: {})",
            input.equipment_name, energy.annual_cost_savings
        );
    }

    Appraisal {
        input: input.clone(),
        energy,
        financial,
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::InvestmentSignal;
    use crate::fixture::{appraisal, input, unprofitable_input};
    use crate::units::Power;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_appraise_insights(appraisal: Appraisal) {
        let insights = &appraisal.insights;
        assert_approx_eq!(
            Money,
            insights.lifetime_cost_savings,
            Money(2_700_000.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Dimensionless,
            insights.savings_multiple,
            Dimensionless(2_700_000.0 / 185_000.0),
            epsilon = 1e-9
        );
        assert_approx_eq!(
            Percent,
            insights.return_on_investment,
            Percent((2_700_000.0 / 185_000.0 - 1.0) * 100.0),
            epsilon = 1e-6
        );
        assert_approx_eq!(
            Emissions,
            insights.lifetime_co2_reduction,
            Emissions(295.2),
            epsilon = 1e-6
        );
        assert_eq!(insights.trees_equivalent, 13284);

        // Payback of 0.685 years against a benchmark of 4.5 years
        assert_approx_eq!(
            Percent,
            insights.payback_vs_benchmark.unwrap(),
            Percent((4.5 - 185_000.0 / 270_000.0) / 4.5 * 100.0),
            epsilon = 1e-6
        );
        assert_eq!(
            insights.recommendation,
            InvestmentSignal::HighlyFavorable.recommendation()
        );
    }

    #[rstest]
    fn test_appraise_unprofitable(unprofitable_input: InputParameters) {
        let appraisal = appraise(&unprofitable_input, &AppraisalOptions::default());
        assert!(appraisal.insights.return_on_investment < Percent(0.0));
        assert!(appraisal.insights.payback_vs_benchmark.unwrap() < Percent(0.0));
        assert_eq!(
            appraisal.financial.investment_signal,
            InvestmentSignal::ReviewRequired
        );
    }

    #[rstest]
    fn test_appraise_no_savings(mut input: InputParameters) {
        input.proposed_power = Power(50.0);
        let appraisal = appraise(&input, &AppraisalOptions::default());
        assert_eq!(appraisal.financial.irr, None);
        assert_eq!(appraisal.insights.payback_vs_benchmark, None);
        assert_eq!(appraisal.insights.trees_equivalent, 0);
    }

    #[rstest]
    fn test_appraise_uses_options(input: InputParameters) {
        let options = AppraisalOptions {
            grid_emission_factor: EmissionsPerEnergy(0.41),
            payback_benchmark: Year(1.0),
            ..AppraisalOptions::default()
        };
        let appraisal = appraise(&input, &options);
        assert_approx_eq!(
            Emissions,
            appraisal.insights.lifetime_co2_reduction,
            Emissions(147.6),
            epsilon = 1e-6
        );
        assert!(appraisal.insights.payback_vs_benchmark.unwrap() > Percent(0.0));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            grid_emission_factor: EmissionsPerEnergy(0.5),
            payback_benchmark: Year(3.0),
            ..Settings::default()
        };
        let options = AppraisalOptions::from_settings(&settings);
        assert_eq!(options.grid_emission_factor, EmissionsPerEnergy(0.5));
        assert_eq!(options.payback_benchmark, Year(3.0));
        assert_eq!(options.solver, IrrSolver::default());
    }
}
