//! The batch status transition table.
//!
//! Every valid transition of the batch lifecycle is enumerated here; any
//! transition not in the table fails with `InvalidStatusTransition`.

use crate::error::{PayrollError, PayrollResult};
use crate::models::BatchStatus;

/// Returns the statuses a batch may move to from `from`.
///
/// `cancelled` is terminal; `reversed` only allows a restart to `draft`.
pub fn allowed_transitions(from: BatchStatus) -> &'static [BatchStatus] {
    use BatchStatus::*;
    match from {
        Draft => &[Calculating, Cancelled],
        Calculating => &[Calculated, Draft],
        Calculated => &[HrReview, Draft],
        HrReview => &[HrApproved, Calculated, Cancelled],
        HrApproved => &[FinanceReview],
        FinanceReview => &[FinanceApproved, HrApproved, Cancelled],
        FinanceApproved => &[CeoReview, Approved],
        CeoReview => &[Approved, FinanceApproved, Cancelled],
        Approved => &[ProcessingPayment],
        ProcessingPayment => &[Paid, Approved],
        Paid => &[Reversed],
        Cancelled => &[],
        Reversed => &[Draft],
    }
}

/// Fails with `InvalidStatusTransition` unless `from -> to` is in the
/// transition table.
pub fn ensure_transition(from: BatchStatus, to: BatchStatus) -> PayrollResult<()> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PayrollError::InvalidStatusTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}
