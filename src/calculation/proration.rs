//! Proration for partial-period employment.
//!
//! Computes the worked-day fraction of a pay period for employees who
//! joined or exited mid-period or took unpaid leave. The reductions
//! compose: a mid-period joiner who also takes unpaid leave is prorated
//! by both.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ProrationBasis, ProrationPolicy};

/// The dominant cause of proration, for audit display.
///
/// The proration factor itself is a single composed number; the reason
/// records the most specific applicable cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationReason {
    /// The employee worked the full period.
    None,
    /// The employee joined mid-period.
    Joining,
    /// The employee exited mid-period.
    Exit,
    /// The employee took unpaid leave.
    UnpaidLeave,
}

/// The result of a proration computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationDetail {
    /// Days the employee is paid for.
    pub worked_days: u32,
    /// The period's day denominator under the configured basis.
    pub total_days: u32,
    /// `min(worked_days / total_days, 1)`.
    pub factor: Decimal,
    /// The most specific applicable cause.
    pub reason: ProrationReason,
}

impl ProrationDetail {
    /// A full-period detail with factor 1.
    pub fn full(total_days: u32) -> Self {
        Self {
            worked_days: total_days,
            total_days,
            factor: Decimal::ONE,
            reason: ProrationReason::None,
        }
    }
}

/// Counts the days in `[from, to]` under the given basis. Empty when
/// `from > to`.
fn count_days(from: NaiveDate, to: NaiveDate, basis: ProrationBasis) -> u32 {
    if from > to {
        return 0;
    }
    match basis {
        ProrationBasis::CalendarDays => (to - from).num_days() as u32 + 1,
        ProrationBasis::WorkingDays => from
            .iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| d.weekday() != Weekday::Sun)
            .count() as u32,
    }
}

/// Computes the proration detail for one employee in one period.
///
/// Starts from the period's total days and subtracts days before joining,
/// days after exit, and explicit unpaid-leave days. The factor is clamped
/// to `[0, 1]`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_proration, ProrationReason};
/// use payroll_engine::config::{ProrationBasis, ProrationPolicy};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let policy = ProrationPolicy { basis: ProrationBasis::CalendarDays };
/// let detail = calculate_proration(
///     NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
///     None,
///     0,
///     NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
///     &policy,
/// );
/// assert_eq!(detail.worked_days, 16);
/// assert_eq!(detail.total_days, 30);
/// assert_eq!(detail.reason, ProrationReason::Joining);
/// ```
pub fn calculate_proration(
    joining_date: NaiveDate,
    exit_date: Option<NaiveDate>,
    unpaid_leave_days: u32,
    period_start: NaiveDate,
    period_end: NaiveDate,
    policy: &ProrationPolicy,
) -> ProrationDetail {
    let basis = policy.basis;
    let total_days = count_days(period_start, period_end, basis);
    if total_days == 0 {
        return ProrationDetail::full(0);
    }

    let mut worked_days = total_days;

    let joined_mid_period = joining_date > period_start;
    if joined_mid_period {
        let missed = count_days(period_start, joining_date.pred_opt().unwrap_or(period_start), basis);
        worked_days = worked_days.saturating_sub(missed);
    }

    let exited_mid_period = exit_date.is_some_and(|exit| exit < period_end);
    if let Some(exit) = exit_date {
        if exit < period_end {
            let missed = count_days(exit.succ_opt().unwrap_or(period_end), period_end, basis);
            worked_days = worked_days.saturating_sub(missed);
        }
    }

    worked_days = worked_days.saturating_sub(unpaid_leave_days);

    let factor = (Decimal::from(worked_days) / Decimal::from(total_days)).min(Decimal::ONE);

    let reason = if joined_mid_period {
        ProrationReason::Joining
    } else if exited_mid_period {
        ProrationReason::Exit
    } else if unpaid_leave_days > 0 {
        ProrationReason::UnpaidLeave
    } else {
        ProrationReason::None
    };

    ProrationDetail {
        worked_days,
        total_days,
        factor,
        reason,
    }
}
