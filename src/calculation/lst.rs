//! LST (Local Service Tax) calculation.
//!
//! LST is an annual tax collected monthly. Each month the employee's
//! annual income is re-projected from year-to-date gross plus the current
//! monthly gross extrapolated over the remaining fiscal months; the
//! projection selects a band whose annual liability is then spread over
//! the remaining months. Re-projecting every month guarantees the annual
//! liability is fully collected by fiscal year-end even when the salary
//! changes mid-year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LstConfig;

use super::rounding::{clamp_non_negative, RoundingPolicy};

/// The complete result of an LST calculation for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LstBreakdown {
    /// Annual income projected from YTD gross and the current month.
    pub projected_annual_income: Decimal,
    /// Lower bound of the selected band.
    pub band_lower: Decimal,
    /// Upper bound of the selected band; `None` for the top band.
    pub band_upper: Option<Decimal>,
    /// The full-year liability for the selected band.
    pub annual_tax: Decimal,
    /// LST already paid this fiscal year.
    pub ytd_lst_paid: Decimal,
    /// Liability still outstanding for the fiscal year.
    pub remaining_lst: Decimal,
    /// The amount charged this month.
    pub monthly_lst: Decimal,
    /// How many fiscal months remained, counting the current one.
    pub remaining_months: u32,
}

/// Computes the LST charge for one month.
///
/// `remaining_months` counts the current month; passing 0 charges the
/// entire outstanding liability immediately (year-end true-up).
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_lst, RoundingPolicy};
/// use payroll_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::uganda_defaults();
/// // 670,000/month with 6 months left projects to 4,020,000/year.
/// let breakdown = calculate_lst(
///     Decimal::from(670_000),
///     Decimal::ZERO,
///     Decimal::ZERO,
///     6,
///     &config.statutory().lst,
///     RoundingPolicy::Round,
/// );
/// assert_eq!(breakdown.annual_tax, Decimal::from(10_000));
/// assert_eq!(breakdown.monthly_lst, Decimal::from(1_667));
/// ```
pub fn calculate_lst(
    monthly_gross: Decimal,
    ytd_gross: Decimal,
    ytd_lst_paid: Decimal,
    remaining_months: u32,
    config: &LstConfig,
    rounding: RoundingPolicy,
) -> LstBreakdown {
    let monthly_gross = clamp_non_negative(monthly_gross);
    let ytd_gross = clamp_non_negative(ytd_gross);
    let ytd_lst_paid = clamp_non_negative(ytd_lst_paid);

    let projected_annual_income = ytd_gross + monthly_gross * Decimal::from(remaining_months);

    // Bands are contiguous and ordered, so the first band whose upper bound
    // covers the projection is the one that contains it. A validated table
    // always ends in an open band; an empty table charges nothing.
    let band = config.bands.iter().find(|b| match b.upper {
        Some(upper) => projected_annual_income <= upper,
        None => true,
    });
    let Some(band) = band else {
        return LstBreakdown {
            projected_annual_income,
            band_lower: Decimal::ZERO,
            band_upper: None,
            annual_tax: Decimal::ZERO,
            ytd_lst_paid,
            remaining_lst: Decimal::ZERO,
            monthly_lst: Decimal::ZERO,
            remaining_months,
        };
    };

    let remaining_lst = (band.annual_tax - ytd_lst_paid).max(Decimal::ZERO);
    let monthly_lst = if remaining_months > 0 {
        rounding.apply(remaining_lst / Decimal::from(remaining_months))
    } else {
        remaining_lst
    };

    LstBreakdown {
        projected_annual_income,
        band_lower: band.lower,
        band_upper: band.upper,
        annual_tax: band.annual_tax,
        ytd_lst_paid,
        remaining_lst,
        monthly_lst,
        remaining_months,
    }
}
