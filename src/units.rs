//! This module defines the unit types used for physical and financial quantities.
//!
//! Each quantity is a thin wrapper around an `f64`. Only the arithmetic which makes physical
//! sense is implemented, e.g. multiplying a [`Power`] by [`HoursPerYear`] gives an
//! [`EnergyPerYear`], but adding a [`Power`] to a [`Money`] value will not compile.
use serde::{Deserialize, Serialize};

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless::from(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless::from(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Raise to an integer power
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless::from(self.0.powi(rhs))
    }

    /// Returns the value as a f64.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl float_cmp::ApproxEq for Dimensionless {
    type Margin = float_cmp::F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn from(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Returns true if the value is neither infinite nor NaN.
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::ops::Neg for $name {
            type Output = $name;
            fn neg(self) -> $name {
                $name::from(-self.0)
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name::from(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name::from(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name::from(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = $name>>(iter: I) -> $name {
                $name::from(iter.map(|x| x.0).sum())
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::from(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::from(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Year);
unit_struct!(Power);
unit_struct!(Emissions);
unit_struct!(Percent);

// Derived quantities
unit_struct!(HoursPerYear);
unit_struct!(EnergyPerYear);
unit_struct!(MoneyPerYear);
unit_struct!(MoneyPerEnergy);
unit_struct!(EmissionsPerYear);
unit_struct!(EmissionsPerEnergy);

// Division rules
impl_div!(Money, MoneyPerYear, Year);
impl_div!(Money, Year, MoneyPerYear);

// Multiplication rules
impl_mul!(Power, HoursPerYear, EnergyPerYear);
impl_mul!(EnergyPerYear, MoneyPerEnergy, MoneyPerYear);
impl_mul!(MoneyPerYear, Year, Money);
impl_mul!(EmissionsPerYear, Year, Emissions);

impl Percent {
    /// Convert a percentage into a fraction (e.g. 10% into 0.1)
    pub fn to_fraction(self) -> Dimensionless {
        Dimensionless(self.0 / 100.0)
    }

    /// Convert a fraction into a percentage (e.g. 0.1 into 10%)
    pub fn from_fraction(fraction: Dimensionless) -> Self {
        Self(fraction.0 * 100.0)
    }
}

impl HoursPerYear {
    /// The number of operating hours per year for a daily schedule
    pub fn from_schedule(hours_per_day: f64, days_per_year: f64) -> Self {
        Self(hours_per_day * days_per_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_energy_cost_chain() {
        let hours = HoursPerYear::from_schedule(16.0, 300.0);
        let energy = Power(7.5) * hours;
        assert_approx_eq!(EnergyPerYear, energy, EnergyPerYear(36000.0));

        let cost = energy * MoneyPerEnergy(7.5);
        assert_approx_eq!(MoneyPerYear, cost, MoneyPerYear(270_000.0));
    }

    #[test]
    fn test_money_over_savings_is_years() {
        let payback = Money(185_000.0) / MoneyPerYear(270_000.0);
        assert_approx_eq!(Year, payback, Year(0.685_185_185_185_185), epsilon = 1e-12);
        assert_approx_eq!(Money, MoneyPerYear(100.0) * Year(3.0), Money(300.0));
    }

    #[test]
    fn test_percent_conversion() {
        assert_eq!(Percent(12.5).to_fraction(), Dimensionless(0.125));
        assert_approx_eq!(Percent, Percent::from_fraction(Dimensionless(0.07)), Percent(7.0));
    }

    #[test]
    fn test_ratio_and_sum() {
        assert_eq!(Money(50.0) / Money(200.0), Dimensionless(0.25));
        let total: Money = [Money(1.0), Money(2.5), -Money(0.5)].into_iter().sum();
        assert_eq!(total, Money(3.0));
    }
}
