//! PAYE (Pay-As-You-Earn) calculation.
//!
//! This module computes progressive monthly income tax by walking an
//! ordered band table and accumulating the tax owed on the income segment
//! falling inside each band.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayeConfig;

use super::rounding::{clamp_non_negative, RoundingPolicy};

/// Tax detail for a single PAYE band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeBandDetail {
    /// Lower bound of the band.
    pub lower: Decimal,
    /// Upper bound of the band; `None` for the open top band.
    pub upper: Option<Decimal>,
    /// Marginal rate applied inside this band.
    pub rate: Decimal,
    /// The income segment that fell inside this band.
    pub amount_in_band: Decimal,
    /// Tax charged on that segment.
    pub tax: Decimal,
}

/// The complete result of a PAYE calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeBreakdown {
    /// Per-band amounts for the bands the income reached.
    pub bands: Vec<PayeBandDetail>,
    /// Total tax across all bands.
    pub total_tax: Decimal,
    /// Total tax divided by taxable income (0 when income is 0).
    pub effective_rate: Decimal,
    /// Tax after reliefs. No reliefs are applied by default, so this
    /// equals `total_tax`.
    pub net_paye: Decimal,
}

/// Computes progressive PAYE on a monthly taxable income.
///
/// Walks the ordered band table; for each band the income segment falling
/// inside it is taxed at the band's marginal rate. Negative income is
/// clamped to zero, and the result is never negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_paye, RoundingPolicy};
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::uganda_defaults();
/// let breakdown = calculate_paye(
///     Decimal::from(1_000_000),
///     &config.statutory().paye,
///     RoundingPolicy::Round,
/// );
/// assert_eq!(breakdown.total_tax, Decimal::from(202_000));
/// ```
pub fn calculate_paye(
    taxable_income: Decimal,
    config: &PayeConfig,
    rounding: RoundingPolicy,
) -> PayeBreakdown {
    let income = clamp_non_negative(taxable_income);

    let mut bands = Vec::new();
    let mut total_tax = Decimal::ZERO;

    for band in &config.bands {
        if income <= band.lower {
            break;
        }
        let reach = match band.upper {
            Some(upper) => income.min(upper),
            None => income,
        };
        let amount_in_band = reach - band.lower;
        let tax = rounding.apply(amount_in_band * band.rate);
        total_tax += tax;

        bands.push(PayeBandDetail {
            lower: band.lower,
            upper: band.upper,
            rate: band.rate,
            amount_in_band,
            tax,
        });
    }

    let effective_rate = if income > Decimal::ZERO {
        (total_tax / income).round_dp(4)
    } else {
        Decimal::ZERO
    };

    PayeBreakdown {
        bands,
        total_tax,
        effective_rate,
        net_paye: total_tax,
    }
}
