//! Overtime pay calculation.
//!
//! Approved overtime hours are paid at a multiple of the hourly rate
//! derived from the monthly basic salary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::OvertimePolicy;

use super::rounding::{clamp_non_negative, RoundingPolicy};

/// The kind of overtime worked, which selects the pay multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeKind {
    /// Weekday overtime (1.5x by default).
    Regular,
    /// Weekend overtime (2.0x by default).
    Weekend,
    /// Public-holiday overtime (2.0x by default).
    Holiday,
}

/// One approved overtime entry for an employee in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// The date the overtime was worked.
    pub date: NaiveDate,
    /// Approved hours.
    pub hours: Decimal,
    /// The kind of overtime.
    pub kind: OvertimeKind,
}

/// One priced overtime line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeLine {
    /// The date the overtime was worked.
    pub date: NaiveDate,
    /// Approved hours.
    pub hours: Decimal,
    /// The kind of overtime.
    pub kind: OvertimeKind,
    /// The multiplier applied.
    pub multiplier: Decimal,
    /// The rounded pay for this line.
    pub amount: Decimal,
}

/// The result of pricing a period's overtime entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeResult {
    /// The hourly rate derived from the basic salary.
    pub hourly_rate: Decimal,
    /// Priced lines, in input order.
    pub lines: Vec<OvertimeLine>,
    /// Sum of the line amounts.
    pub total: Decimal,
}

/// Prices a period's approved overtime entries.
///
/// The hourly rate is `basic_salary / standard_monthly_hours`; each entry
/// pays `hours x hourly rate x multiplier`, rounded per line.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_overtime, OvertimeEntry, OvertimeKind, RoundingPolicy};
/// use payroll_engine::config::PayrollConfig;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::uganda_defaults();
/// let entries = vec![OvertimeEntry {
///     date: NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
///     hours: Decimal::from(4),
///     kind: OvertimeKind::Regular,
/// }];
/// let result = calculate_overtime(
///     Decimal::from(2_080_000),
///     &entries,
///     &config.policy().overtime,
///     RoundingPolicy::Round,
/// );
/// // 2,080,000 / 208 = 10,000/hour; 4h x 1.5 = 60,000.
/// assert_eq!(result.total, Decimal::from(60_000));
/// ```
pub fn calculate_overtime(
    basic_salary: Decimal,
    entries: &[OvertimeEntry],
    policy: &OvertimePolicy,
    rounding: RoundingPolicy,
) -> OvertimeResult {
    let basic = clamp_non_negative(basic_salary);
    let hourly_rate = if policy.standard_monthly_hours > Decimal::ZERO {
        basic / policy.standard_monthly_hours
    } else {
        Decimal::ZERO
    };

    let mut lines = Vec::with_capacity(entries.len());
    let mut total = Decimal::ZERO;

    for entry in entries {
        let multiplier = match entry.kind {
            OvertimeKind::Regular => policy.regular_multiplier,
            OvertimeKind::Weekend => policy.weekend_multiplier,
            OvertimeKind::Holiday => policy.holiday_multiplier,
        };
        let hours = clamp_non_negative(entry.hours);
        let amount = rounding.apply(hours * hourly_rate * multiplier);
        total += amount;

        lines.push(OvertimeLine {
            date: entry.date,
            hours,
            kind: entry.kind,
            multiplier,
            amount,
        });
    }

    OvertimeResult {
        hourly_rate,
        lines,
        total,
    }
}
