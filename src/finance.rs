//! General functions related to finance.
//!
//! All cash flows are modelled as an annuity: an up-front investment followed by the same annual
//! saving at the end of every year of the project life.
use crate::energy::EnergyCostResult;
use crate::input::InputParameters;
use crate::units::{Dimensionless, Money, MoneyPerYear, Percent, Year};
use ::log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The starting guess for the IRR Newton-Raphson iteration (10%)
const IRR_INITIAL_GUESS: Dimensionless = Dimensionless(0.1);

/// NPV below which a rate is considered to be a root, in currency units
const IRR_TOLERANCE: Money = Money(1e-4);

/// Maximum number of iterations for each stage of the IRR solver
const IRR_MAX_ITERATIONS: u32 = 100;

/// Bounds within which Newton-Raphson iterates are kept
const NEWTON_RATE_BOUNDS: (Dimensionless, Dimensionless) =
    (Dimensionless(-0.99), Dimensionless(10.0));

/// Bracket used by the bisection fallback
const BISECTION_BRACKET: (Dimensionless, Dimensionless) =
    (Dimensionless(-0.99), Dimensionless(5.0));

/// Calculates the simple (undiscounted) payback period.
///
/// Returns infinity if the project never pays back, i.e. if the annual savings are not positive.
pub fn simple_payback_period(initial_investment: Money, annual_savings: MoneyPerYear) -> Year {
    if annual_savings > MoneyPerYear(0.0) {
        initial_investment / annual_savings
    } else {
        Year(f64::INFINITY)
    }
}

/// The factor by which a cash flow `year` years in the future is discounted
fn discount_factor(rate: Dimensionless, year: u32) -> Dimensionless {
    (Dimensionless(1.0) + rate).powi(year as i32)
}

/// Calculates the net present value of an annuity of savings.
///
/// # Arguments
///
/// * `initial_investment` - The up-front cost, incurred at year zero
/// * `annual_savings` - The saving received at the end of each year
/// * `rate` - The discount rate as a fraction (e.g. 0.1 for 10%)
/// * `project_life` - The number of years for which savings are received
pub fn npv(
    initial_investment: Money,
    annual_savings: MoneyPerYear,
    rate: Dimensionless,
    project_life: u32,
) -> Money {
    let saving = annual_savings * Year(1.0);
    let present_value: Money = (1..=project_life)
        .map(|year| saving / discount_factor(rate, year))
        .sum();

    present_value - initial_investment
}

/// Calculates the derivative of [`npv`] with respect to the discount rate.
///
/// The value is in currency units per unit change of the rate (as a fraction).
pub fn npv_derivative(
    annual_savings: MoneyPerYear,
    rate: Dimensionless,
    project_life: u32,
) -> Money {
    let saving = annual_savings * Year(1.0);
    (1..=project_life)
        .map(|year| -(Dimensionless(year as f64) * saving) / discount_factor(rate, year + 1))
        .sum()
}

/// A root finder for the internal rate of return of an annuity.
///
/// Newton-Raphson is tried first. If it does not converge, bisection is used within a fixed
/// bracket instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSolver {
    /// Starting rate for Newton-Raphson (as a fraction)
    pub initial_guess: Dimensionless,
    /// Absolute NPV below which a rate is accepted as the IRR
    pub tolerance: Money,
    /// Iteration budget for each of the two stages
    pub max_iterations: u32,
    /// Newton-Raphson iterates are clamped to this range
    pub newton_bounds: (Dimensionless, Dimensionless),
    /// The initial bracket for bisection. The IRR can only be found by bisection if it lies
    /// within this range.
    pub bisection_bracket: (Dimensionless, Dimensionless),
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            initial_guess: IRR_INITIAL_GUESS,
            tolerance: IRR_TOLERANCE,
            max_iterations: IRR_MAX_ITERATIONS,
            newton_bounds: NEWTON_RATE_BOUNDS,
            bisection_bracket: BISECTION_BRACKET,
        }
    }
}

impl IrrSolver {
    /// Calculates the internal rate of return (as a percentage) of an annuity.
    ///
    /// Returns `None` if the IRR cannot be computed. This is the case if the annual savings are
    /// not positive, or if neither solver finds a root.
    pub fn solve(
        &self,
        initial_investment: Money,
        annual_savings: MoneyPerYear,
        project_life: u32,
    ) -> Option<Percent> {
        if annual_savings.value().is_nan() || annual_savings <= MoneyPerYear(0.0) {
            debug!("Savings are not positive: IRR is undefined");
            return None;
        }

        let rate = self
            .newton_raphson(initial_investment, annual_savings, project_life)
            .or_else(|| {
                debug!("Newton-Raphson did not converge; falling back on bisection");
                self.bisection(initial_investment, annual_savings, project_life)
            })?;

        Some(Percent::from_fraction(rate))
    }

    /// Search for the IRR with Newton-Raphson, returning `None` if it fails to converge
    fn newton_raphson(
        &self,
        initial_investment: Money,
        annual_savings: MoneyPerYear,
        project_life: u32,
    ) -> Option<Dimensionless> {
        let (min_rate, max_rate) = self.newton_bounds;
        let mut rate = self.initial_guess;
        for iteration in 0..self.max_iterations {
            let value = npv(initial_investment, annual_savings, rate, project_life);
            if value.value().abs() < self.tolerance.value() {
                debug!("Newton-Raphson converged after {iteration} iterations");
                return Some(rate);
            }

            let derivative = npv_derivative(annual_savings, rate, project_life);
            if derivative == Money(0.0) || !value.is_finite() || !derivative.is_finite() {
                return None;
            }

            let next = rate.value() - value.value() / derivative.value();
            rate = Dimensionless(next.clamp(min_rate.value(), max_rate.value()));
        }

        None
    }

    /// Search for the IRR by bisection.
    ///
    /// Returns `None` if the NPV has the same sign at both ends of the bracket, as there is then
    /// no root to find. If the tolerance is not reached within the iteration budget, the midpoint
    /// of the final bracket is returned.
    fn bisection(
        &self,
        initial_investment: Money,
        annual_savings: MoneyPerYear,
        project_life: u32,
    ) -> Option<Dimensionless> {
        let npv_at = |rate| npv(initial_investment, annual_savings, rate, project_life).value();
        let (mut low, mut high) = self.bisection_bracket;
        let npv_low = npv_at(low);
        let npv_high = npv_at(high);
        if npv_low.is_nan() || npv_high.is_nan() || npv_low * npv_high > 0.0 {
            debug!("No sign change in NPV within the bisection bracket: IRR is undefined");
            return None;
        }

        let midpoint = |low: Dimensionless, high: Dimensionless| {
            Dimensionless((low.value() + high.value()) / 2.0)
        };
        for _ in 0..self.max_iterations {
            let mid = midpoint(low, high);
            let value = npv_at(mid);
            if value.abs() < self.tolerance.value() {
                return Some(mid);
            }

            if (value > 0.0) == (npv_low > 0.0) {
                low = mid;
            } else {
                high = mid;
            }
        }

        Some(midpoint(low, high))
    }
}

/// The cumulative (undiscounted) savings at the end of a given year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    /// Years since the investment was made
    pub year: u32,
    /// Savings to date minus the initial investment
    pub cumulative_savings: Money,
}

/// Generate the cumulative cash-flow series for years `0..=project_life`.
///
/// Year zero is the initial investment (as a negative value), with the annual savings added for
/// each subsequent year. If the project pays back, later years are measured from the payback
/// period, so the series changes sign exactly at [`simple_payback_period`].
pub fn cash_flow_series(
    initial_investment: Money,
    annual_savings: MoneyPerYear,
    project_life: u32,
) -> Vec<CashFlowPoint> {
    let payback = simple_payback_period(initial_investment, annual_savings);
    (0..=project_life)
        .map(|year| {
            let elapsed = Year(year as f64);
            let cumulative_savings = if year == 0 {
                -initial_investment
            } else if payback.is_finite() {
                annual_savings * (elapsed - payback)
            } else {
                annual_savings * elapsed - initial_investment
            };

            CashFlowPoint {
                year,
                cumulative_savings,
            }
        })
        .collect()
}

/// A classification of how attractive an investment is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum InvestmentSignal {
    /// Exceptional returns with a rapid payback
    #[strum(to_string = "Highly Favorable")]
    #[serde(rename = "Highly Favorable")]
    HighlyFavorable,
    /// Good returns
    #[strum(to_string = "Favorable")]
    #[serde(rename = "Favorable")]
    Favorable,
    /// Positive but modest returns
    #[strum(to_string = "Marginal")]
    #[serde(rename = "Marginal")]
    Marginal,
    /// Returns may not justify the investment
    #[strum(to_string = "Review Required")]
    #[serde(rename = "Review Required")]
    ReviewRequired,
}

impl InvestmentSignal {
    /// Classify an investment from its IRR and payback period.
    ///
    /// The rules are checked in order and the first which matches is used:
    ///
    /// | Condition                     | Signal            |
    /// |-------------------------------|-------------------|
    /// | IRR > 25% and payback < 3 yrs | `HighlyFavorable` |
    /// | IRR > 12% and payback < 5 yrs | `Favorable`       |
    /// | IRR > 6%                      | `Marginal`        |
    /// | otherwise                     | `ReviewRequired`  |
    ///
    /// An IRR which cannot be computed always gives `ReviewRequired`.
    pub fn classify(irr: Option<Percent>, simple_payback_period: Year) -> Self {
        let Some(irr) = irr else {
            return Self::ReviewRequired;
        };

        if irr > Percent(25.0) && simple_payback_period < Year(3.0) {
            Self::HighlyFavorable
        } else if irr > Percent(12.0) && simple_payback_period < Year(5.0) {
            Self::Favorable
        } else if irr > Percent(6.0) {
            Self::Marginal
        } else {
            Self::ReviewRequired
        }
    }

    /// A short recommendation to accompany the signal
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::HighlyFavorable => {
                "This investment demonstrates exceptional returns with a rapid payback period. \
                 Strong recommendation to proceed."
            }
            Self::Favorable => {
                "This investment shows favorable returns. Recommended for implementation with \
                 standard due diligence."
            }
            Self::Marginal => {
                "This investment shows marginal returns. Consider optimization opportunities or \
                 alternative solutions."
            }
            Self::ReviewRequired => {
                "This investment requires further review. Returns may not justify the capital \
                 outlay."
            }
        }
    }
}

/// The financial appraisal of a retrofit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialResult {
    /// Years for the undiscounted savings to repay the investment (may be infinite)
    pub simple_payback_period: Year,
    /// Net present value at the project's discount rate
    pub npv: Money,
    /// Internal rate of return, or `None` if it cannot be computed
    pub irr: Option<Percent>,
    /// Cumulative savings for each year of the project life, starting at year zero
    pub cash_flows: Vec<CashFlowPoint>,
    /// Overall classification of the investment
    pub investment_signal: InvestmentSignal,
}

/// Calculate the financial metrics for a retrofit.
///
/// # Arguments
///
/// * `input` - Project parameters
/// * `energy_cost` - The annual savings calculated for the project
/// * `solver` - The root finder used for the IRR
pub fn compute_financials(
    input: &InputParameters,
    energy_cost: &EnergyCostResult,
    solver: &IrrSolver,
) -> FinancialResult {
    let savings = energy_cost.annual_cost_savings;
    let simple_payback_period = simple_payback_period(input.initial_investment, savings);
    let npv = npv(
        input.initial_investment,
        savings,
        input.discount_rate.to_fraction(),
        input.project_life,
    );
    let irr = solver.solve(input.initial_investment, savings, input.project_life);

    FinancialResult {
        simple_payback_period,
        npv,
        irr,
        cash_flows: cash_flow_series(input.initial_investment, savings, input.project_life),
        investment_signal: InvestmentSignal::classify(irr, simple_payback_period),
    }
}
