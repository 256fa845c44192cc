//! Currency rounding policy.
//!
//! All monetary outputs are whole currency units (UGX has no usable minor
//! unit). A single configurable policy is applied at every monetary
//! boundary so rounding behaviour is consistent across the engine.
//!
//! Because rounding is applied independently per line item and per
//! aggregate, a sum of rounded parts may differ from the rounded sum by a
//! few units; consumers must tolerate that rather than expect exact
//! equality with unrounded arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How monetary amounts are rounded to whole currency units.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::RoundingPolicy;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("1666.67").unwrap();
/// assert_eq!(RoundingPolicy::Round.apply(amount), Decimal::from(1667));
/// assert_eq!(RoundingPolicy::Floor.apply(amount), Decimal::from(1666));
/// assert_eq!(RoundingPolicy::Ceil.apply(amount), Decimal::from(1667));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Round half away from zero to the nearest whole unit.
    Round,
    /// Round down to the nearest whole unit.
    Floor,
    /// Round up to the nearest whole unit.
    Ceil,
}

impl RoundingPolicy {
    /// Rounds an amount to whole currency units under this policy.
    pub fn apply(self, amount: Decimal) -> Decimal {
        let strategy = match self {
            RoundingPolicy::Round => RoundingStrategy::MidpointAwayFromZero,
            RoundingPolicy::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingPolicy::Ceil => RoundingStrategy::ToPositiveInfinity,
        };
        amount.round_dp_with_strategy(0, strategy)
    }
}

/// Clamps a monetary input to zero if negative.
///
/// Malformed inputs must never propagate negative amounts through the tax
/// calculators; the clamp happens once at the calculator boundary.
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    if amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        amount
    }
}
