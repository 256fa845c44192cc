//! Payroll batch models.
//!
//! A batch is one subsidiary's payroll run for one period. It owns the
//! linkage to its employee payroll records, the approval audit trail, the
//! aggregate totals, and the payment sub-batches produced after approval.
//!
//! The status history and approval records are append-only event lists:
//! past entries are never mutated, and derived fields are recomputed from
//! the latest state.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payroll::{EmployeePayroll, PayrollTotals};

/// The lifecycle status of a payroll batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Created, not yet calculated.
    Draft,
    /// Bulk calculation in progress.
    Calculating,
    /// Bulk calculation finished.
    Calculated,
    /// Awaiting HR review.
    HrReview,
    /// HR approved.
    HrApproved,
    /// Awaiting Finance review.
    FinanceReview,
    /// Finance approved.
    FinanceApproved,
    /// Awaiting CEO review.
    CeoReview,
    /// Fully approved for payment.
    Approved,
    /// Payment execution in progress.
    ProcessingPayment,
    /// All payments complete.
    Paid,
    /// Cancelled before payment.
    Cancelled,
    /// Reversed after payment.
    Reversed,
}

impl BatchStatus {
    /// Returns the wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Draft => "draft",
            BatchStatus::Calculating => "calculating",
            BatchStatus::Calculated => "calculated",
            BatchStatus::HrReview => "hr_review",
            BatchStatus::HrApproved => "hr_approved",
            BatchStatus::FinanceReview => "finance_review",
            BatchStatus::FinanceApproved => "finance_approved",
            BatchStatus::CeoReview => "ceo_review",
            BatchStatus::Approved => "approved",
            BatchStatus::ProcessingPayment => "processing_payment",
            BatchStatus::Paid => "paid",
            BatchStatus::Cancelled => "cancelled",
            BatchStatus::Reversed => "reversed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which employees a batch covers.
///
/// An explicit employee list takes precedence; otherwise an optional
/// department filter narrows "all active employees in the subsidiary".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScope {
    /// The subsidiary being paid.
    pub subsidiary: String,
    /// Optional department filter.
    #[serde(default)]
    pub department: Option<String>,
    /// Explicit employee list; `None` means all active in scope.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}

/// The person performing a lifecycle action.
///
/// Identity is opaque here; authentication happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Opaque actor identifier.
    pub id: String,
    /// Display name for audit trails.
    pub name: String,
}

/// One entry in a batch's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// The status entered.
    pub status: BatchStatus,
    /// Who caused the transition.
    pub actor: Actor,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An approval sign-off stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    /// Human resources review.
    Hr,
    /// Finance review.
    Finance,
    /// CEO review, required above the net-pay threshold.
    Ceo,
}

/// What an approver did at their stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    /// Advance the batch to the next stage.
    Approve,
    /// Cancel the batch.
    Reject,
    /// Send the batch back exactly one stage.
    Return,
}

/// One entry in a batch's append-only approval audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// The approval stage.
    pub level: ApprovalLevel,
    /// The action taken.
    pub action: ApprovalAction,
    /// Who acted.
    pub actor: Actor,
    /// When they acted.
    pub timestamp: DateTime<Utc>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// The batch status before the action.
    pub previous_status: BatchStatus,
    /// The batch status after the action.
    pub new_status: BatchStatus,
}

/// Which approval stages a batch requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalThresholds {
    /// HR review is always required.
    pub hr_required: bool,
    /// Finance review is always required.
    pub finance_required: bool,
    /// CEO review, recomputed after every calculation from total net pay.
    pub ceo_required: bool,
}

impl Default for ApprovalThresholds {
    fn default() -> Self {
        Self {
            hr_required: true,
            finance_required: true,
            ceo_required: false,
        }
    }
}

/// One employee whose calculation failed during a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationFailure {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name, when known.
    pub employee_name: Option<String>,
    /// The error message.
    pub error: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Aggregate totals across a batch's successfully calculated employees.
///
/// Each field equals the sum of the corresponding per-employee field
/// across the batch's payroll records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Sum of gross pay.
    pub total_gross_pay: Decimal,
    /// Sum of taxable income.
    pub total_taxable_income: Decimal,
    /// Sum of PAYE.
    pub total_paye: Decimal,
    /// Sum of NSSF employee contributions.
    pub total_nssf_employee: Decimal,
    /// Sum of NSSF employer contributions.
    pub total_nssf_employer: Decimal,
    /// Sum of LST.
    pub total_lst: Decimal,
    /// Sum of statutory deductions.
    pub total_statutory_deductions: Decimal,
    /// Sum of non-statutory deductions.
    pub total_voluntary_deductions: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net_pay: Decimal,
}

impl BatchTotals {
    /// Adds one payroll record's totals and statutory amounts.
    pub fn accumulate(&mut self, payroll: &EmployeePayroll) {
        let totals: &PayrollTotals = &payroll.totals;
        self.total_gross_pay += totals.gross_pay;
        self.total_taxable_income += totals.taxable_income;
        self.total_paye += payroll.paye.total_tax;
        self.total_nssf_employee += payroll.nssf.employee_contribution;
        self.total_nssf_employer += payroll.nssf.employer_contribution;
        self.total_lst += payroll.lst.monthly_lst;
        self.total_statutory_deductions += totals.total_statutory_deductions;
        self.total_voluntary_deductions += totals.total_voluntary_deductions;
        self.total_deductions += totals.total_deductions;
        self.total_net_pay += totals.net_pay;
    }
}

/// The payment method discriminant used to group payment sub-batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Bank transfers, further grouped by bank.
    BankTransfer,
    /// Mobile money transfers.
    MobileMoney,
    /// Cash payments.
    Cash,
    /// Cheque payments.
    Cheque,
}

/// The execution status of one payment sub-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentBatchStatus {
    /// Not yet executed.
    Pending,
    /// Every line paid.
    Completed,
    /// No line paid.
    Failed,
    /// Some lines paid, some failed.
    Partial,
}

/// One transfer line inside a payment sub-batch, ready for file export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLineItem {
    /// The employee identifier.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// Receiving account or wallet, when the method has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Amount to pay.
    pub amount: Decimal,
    /// Payment reference.
    pub reference: String,
}

/// A group of payroll records sharing a payment method (and bank).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBatch {
    /// Unique sub-batch identifier.
    pub id: Uuid,
    /// The payment method of every record in the group.
    pub method: PaymentMethodKind,
    /// The bank name, for bank-transfer groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    /// The payroll records in this group.
    pub payroll_ids: Vec<Uuid>,
    /// Number of employees in the group.
    pub employee_count: usize,
    /// Sum of the group's net pay, rounded.
    pub total_amount: Decimal,
    /// Execution status.
    pub status: PaymentBatchStatus,
    /// Transfer lines for export.
    pub lines: Vec<TransferLineItem>,
    /// How many lines were processed, reported on completion.
    pub processed_count: usize,
    /// Employees whose payment failed, reported on completion.
    pub failed_employee_ids: Vec<String>,
    /// External (bank/provider) reference, reported on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

/// The outcome reported for one payment sub-batch by payment execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// The resulting sub-batch status (completed, failed or partial).
    pub status: PaymentBatchStatus,
    /// How many lines were processed successfully.
    pub processed_count: usize,
    /// Employees whose payment failed.
    #[serde(default)]
    pub failed_employee_ids: Vec<String>,
    /// External (bank/provider) reference.
    #[serde(default)]
    pub external_reference: Option<String>,
}

/// Batch-level payment progress derived from the sub-batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No sub-batch outcome yet, or no sub-batches.
    Pending,
    /// At least one sub-batch failed or was partial.
    Partial,
    /// Every sub-batch completed.
    Complete,
}

/// One subsidiary/period payroll calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollBatch {
    /// Unique batch identifier.
    pub id: Uuid,
    /// Which employees this batch covers.
    pub scope: BatchScope,
    /// Pay period year.
    pub year: i32,
    /// Pay period month (1-12).
    pub month: u32,
    /// Current lifecycle status.
    pub status: BatchStatus,
    /// Append-only status history.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Employees in scope at calculation time.
    pub employee_count: usize,
    /// Employees calculated successfully.
    pub calculated_count: usize,
    /// Employees whose calculation failed.
    pub error_count: usize,
    /// Aggregate totals over successfully calculated employees.
    pub totals: BatchTotals,
    /// Which approval stages this batch requires.
    pub thresholds: ApprovalThresholds,
    /// Append-only approval audit trail.
    pub approvals: Vec<ApprovalRecord>,
    /// Per-employee calculation failures.
    pub failures: Vec<CalculationFailure>,
    /// Payment sub-batches, created during payment processing.
    pub payment_batches: Vec<PaymentBatch>,
    /// Derived batch-level payment progress.
    pub payment_status: PaymentStatus,
    /// Net pay already disbursed.
    pub paid_amount: Decimal,
    /// Net pay still pending disbursement.
    pub pending_amount: Decimal,
    /// The payroll records this batch owns.
    pub payroll_ids: Vec<Uuid>,
    /// Monotonic version for optimistic concurrency.
    pub version: u64,
    /// When the batch was created.
    pub created_at: DateTime<Utc>,
    /// When the batch was last modified.
    pub updated_at: DateTime<Utc>,
}

impl PayrollBatch {
    /// Creates a new draft batch and seeds the status history.
    pub fn new(scope: BatchScope, year: i32, month: u32, actor: Actor) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scope,
            year,
            month,
            status: BatchStatus::Draft,
            status_history: vec![StatusHistoryEntry {
                status: BatchStatus::Draft,
                actor,
                timestamp: now,
                notes: None,
            }],
            employee_count: 0,
            calculated_count: 0,
            error_count: 0,
            totals: BatchTotals::default(),
            thresholds: ApprovalThresholds::default(),
            approvals: Vec::new(),
            failures: Vec::new(),
            payment_batches: Vec::new(),
            payment_status: PaymentStatus::Pending,
            paid_amount: Decimal::ZERO,
            pending_amount: Decimal::ZERO,
            payroll_ids: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the status and appends one history entry.
    ///
    /// Transition validity is the caller's responsibility; see
    /// [`crate::batch::ensure_transition`].
    pub fn record_status(&mut self, status: BatchStatus, actor: Actor, notes: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.status_history.push(StatusHistoryEntry {
            status,
            actor,
            timestamp: now,
            notes,
        });
        self.updated_at = now;
    }

    /// Recomputes the derived payment status and paid/pending amounts
    /// from the sub-batches.
    ///
    /// Complete only when every sub-batch completed; partial when any
    /// failed or partially completed; otherwise pending. Paid amounts are
    /// summed from the sub-batch lines, excluding failed employees.
    pub fn recompute_payment_status(&mut self) {
        let all_completed = !self.payment_batches.is_empty()
            && self
                .payment_batches
                .iter()
                .all(|pb| pb.status == PaymentBatchStatus::Completed);
        let any_failed = self.payment_batches.iter().any(|pb| {
            matches!(
                pb.status,
                PaymentBatchStatus::Failed | PaymentBatchStatus::Partial
            )
        });

        self.payment_status = if all_completed {
            PaymentStatus::Complete
        } else if any_failed {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        };

        let mut paid = Decimal::ZERO;
        for pb in &self.payment_batches {
            match pb.status {
                PaymentBatchStatus::Completed => paid += pb.total_amount,
                PaymentBatchStatus::Partial => {
                    for line in &pb.lines {
                        if !pb.failed_employee_ids.contains(&line.employee_id) {
                            paid += line.amount;
                        }
                    }
                }
                PaymentBatchStatus::Pending | PaymentBatchStatus::Failed => {}
            }
        }
        self.paid_amount = paid;
        self.pending_amount = self.totals.total_net_pay - paid;
        self.updated_at = Utc::now();
    }
}
