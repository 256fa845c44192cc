//! The batch lifecycle manager.
//!
//! Owns the batch state machine: creation, bulk calculation, submission,
//! multi-level approval, payment processing and completion, cancellation
//! and reversal. Every batch write goes through the store's
//! version-checked save, so concurrent actors cannot both advance the
//! same batch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::engine::{CalculationOverrides, PayrollEngine};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    Actor, ApprovalAction, ApprovalLevel, ApprovalRecord, BatchScope, BatchStatus, BatchTotals,
    CalculationFailure, Employee, PaymentOutcome, PayrollBatch, PayrollStatus, PayslipSummary,
};
use crate::sources::{EmployeeDirectory, PeriodRecordsSource};
use crate::store::PayrollStore;

use super::partitioner::partition_payments;
use super::state::ensure_transition;

/// Drives payroll batches through their lifecycle.
pub struct BatchManager {
    config: Arc<PayrollConfig>,
    engine: PayrollEngine,
    directory: Arc<dyn EmployeeDirectory>,
    store: Arc<dyn PayrollStore>,
}

impl BatchManager {
    /// Creates a manager over the given collaborators.
    pub fn new(
        config: Arc<PayrollConfig>,
        directory: Arc<dyn EmployeeDirectory>,
        records: Arc<dyn PeriodRecordsSource>,
        store: Arc<dyn PayrollStore>,
    ) -> Self {
        let engine = PayrollEngine::new(
            config.clone(),
            directory.clone(),
            records,
            store.clone(),
        );
        Self {
            config,
            engine,
            directory,
            store,
        }
    }

    /// Returns the per-employee calculation engine.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }

    /// Returns a batch by id.
    pub fn batch(&self, batch_id: Uuid) -> PayrollResult<PayrollBatch> {
        self.store
            .batch(batch_id)
            .ok_or_else(|| PayrollError::BatchNotFound {
                batch_id: batch_id.to_string(),
            })
    }

    /// Creates a new draft batch for a subsidiary and period.
    pub fn create_batch(
        &self,
        scope: BatchScope,
        year: i32,
        month: u32,
        actor: Actor,
    ) -> PayrollResult<PayrollBatch> {
        if crate::models::PayPeriod::monthly(year, month).is_none() {
            return Err(PayrollError::CalculationError {
                message: format!("invalid pay period {}-{}", year, month),
            });
        }
        let batch = PayrollBatch::new(scope, year, month, actor);
        info!(batch_id = %batch.id, subsidiary = %batch.scope.subsidiary, "Batch created");
        self.store.insert_batch(batch.clone());
        Ok(batch)
    }

    /// Resolves the employee roster for a batch scope.
    ///
    /// Explicit id lists are fetched in chunks bounded by the directory's
    /// query limit; otherwise the subsidiary's payable employees are
    /// listed, optionally narrowed by department.
    fn resolve_roster(&self, scope: &BatchScope) -> Vec<Employee> {
        match &scope.employee_ids {
            Some(ids) => {
                let chunk_size = self.directory.query_chunk_size();
                let mut employees = Vec::with_capacity(ids.len());
                for chunk in ids.chunks(chunk_size) {
                    employees.extend(self.directory.employees_by_ids(chunk));
                }
                employees
            }
            None => self
                .directory
                .active_employees(&scope.subsidiary, scope.department.as_deref()),
        }
    }

    /// Runs bulk calculation for a batch. Only valid from `draft`.
    ///
    /// Per-employee failures are caught and recorded on the batch without
    /// aborting the run; the batch reaches `calculated` with a non-zero
    /// `error_count` if any employee failed. Aggregate totals cover the
    /// successfully calculated employees only, and CEO approval is
    /// required iff total net pay reaches the configured threshold.
    pub fn calculate(&self, batch_id: Uuid, actor: Actor) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        ensure_transition(batch.status, BatchStatus::Calculating)?;
        batch.record_status(BatchStatus::Calculating, actor.clone(), None);
        let mut batch = self.store.save_batch(batch)?;

        let roster = self.resolve_roster(&batch.scope);
        batch.employee_count = roster.len();
        batch.calculated_count = 0;
        batch.error_count = 0;
        batch.totals = BatchTotals::default();
        batch.failures.clear();
        batch.payroll_ids.clear();

        let (year, month) = (batch.year, batch.month);
        for employee in &roster {
            let result = self.calculate_one(&mut batch, employee, year, month);
            match result {
                Ok(()) => {
                    batch.calculated_count += 1;
                }
                Err(error) => {
                    warn!(
                        batch_id = %batch.id,
                        employee_id = %employee.id,
                        error = %error,
                        "Employee calculation failed"
                    );
                    batch.error_count += 1;
                    batch.failures.push(CalculationFailure {
                        employee_id: employee.id.clone(),
                        employee_name: Some(employee.name.clone()),
                        error: error.to_string(),
                        timestamp: Utc::now(),
                    });
                }
            }
            info!(
                batch_id = %batch.id,
                completed = batch.calculated_count,
                failed = batch.error_count,
                current_employee = %employee.id,
                "Batch calculation progress"
            );
        }

        batch.thresholds.ceo_required =
            batch.totals.total_net_pay >= self.config.policy().approvals.ceo_threshold_amount;

        let summary = format!(
            "{} calculated, {} failed",
            batch.calculated_count, batch.error_count
        );
        batch.record_status(BatchStatus::Calculated, actor, Some(summary));
        self.store.save_batch(batch)
    }

    /// Calculates one roster member and links the record to the batch.
    fn calculate_one(
        &self,
        batch: &mut PayrollBatch,
        employee: &Employee,
        year: i32,
        month: u32,
    ) -> PayrollResult<()> {
        // A record already owned by another batch cannot be taken over.
        if let Some(existing) = self.store.payroll(&employee.id, year, month) {
            if existing
                .payroll_period_id
                .is_some_and(|owner| owner != batch.id)
            {
                return Err(PayrollError::AlreadyCalculated {
                    employee_id: employee.id.clone(),
                    year,
                    month,
                });
            }
        }

        let mut payroll = self.engine.calculate_employee_payroll(
            &employee.id,
            year,
            month,
            &CalculationOverrides::default(),
            true,
        )?;
        payroll.payroll_period_id = Some(batch.id);
        self.store.save_payroll(payroll.clone());

        batch.totals.accumulate(&payroll);
        batch.payroll_ids.push(payroll.id);
        Ok(())
    }

    /// Submits a calculated batch for HR review.
    ///
    /// Gated on a clean run: a batch with calculation errors cannot be
    /// submitted.
    pub fn submit_for_review(&self, batch_id: Uuid, actor: Actor) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        ensure_transition(batch.status, BatchStatus::HrReview)?;
        if batch.error_count > 0 {
            return Err(PayrollError::HasCalculationErrors {
                batch_id: batch.id.to_string(),
                error_count: batch.error_count,
            });
        }
        batch.record_status(BatchStatus::HrReview, actor, None);
        self.store.save_batch(batch)
    }

    /// Applies an approval action (approve, reject or return) at the
    /// level implied by the batch's current review status.
    ///
    /// Reject cancels the batch unconditionally. Return steps back
    /// exactly one stage. Approve advances: HR approval moves straight
    /// into Finance review, Finance approval routes through CEO review
    /// only when the batch requires it, and CEO approval lands on
    /// `approved`. Every action appends one approval record and one
    /// status history entry per transition.
    pub fn approval_action(
        &self,
        batch_id: Uuid,
        action: ApprovalAction,
        actor: Actor,
        notes: Option<String>,
    ) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        let previous_status = batch.status;

        let level = match batch.status {
            BatchStatus::HrReview => ApprovalLevel::Hr,
            BatchStatus::FinanceReview => ApprovalLevel::Finance,
            BatchStatus::CeoReview => ApprovalLevel::Ceo,
            other => {
                let to = match action {
                    ApprovalAction::Approve => BatchStatus::Approved,
                    ApprovalAction::Reject => BatchStatus::Cancelled,
                    ApprovalAction::Return => BatchStatus::Calculated,
                };
                return Err(PayrollError::InvalidStatusTransition {
                    from: other.as_str().to_string(),
                    to: to.as_str().to_string(),
                });
            }
        };

        match action {
            ApprovalAction::Reject => {
                ensure_transition(batch.status, BatchStatus::Cancelled)?;
                batch.record_status(BatchStatus::Cancelled, actor.clone(), notes.clone());
            }
            ApprovalAction::Return => {
                let target = match level {
                    ApprovalLevel::Hr => BatchStatus::Calculated,
                    ApprovalLevel::Finance => BatchStatus::HrApproved,
                    ApprovalLevel::Ceo => BatchStatus::FinanceApproved,
                };
                ensure_transition(batch.status, target)?;
                batch.record_status(target, actor.clone(), notes.clone());
            }
            ApprovalAction::Approve => match level {
                ApprovalLevel::Hr => {
                    ensure_transition(batch.status, BatchStatus::HrApproved)?;
                    batch.record_status(BatchStatus::HrApproved, actor.clone(), notes.clone());
                    ensure_transition(batch.status, BatchStatus::FinanceReview)?;
                    batch.record_status(BatchStatus::FinanceReview, actor.clone(), None);
                    self.set_payroll_statuses(&batch, PayrollStatus::Reviewed);
                }
                ApprovalLevel::Finance => {
                    ensure_transition(batch.status, BatchStatus::FinanceApproved)?;
                    batch.record_status(BatchStatus::FinanceApproved, actor.clone(), notes.clone());
                    if batch.thresholds.ceo_required {
                        ensure_transition(batch.status, BatchStatus::CeoReview)?;
                        batch.record_status(BatchStatus::CeoReview, actor.clone(), None);
                    } else {
                        ensure_transition(batch.status, BatchStatus::Approved)?;
                        batch.record_status(BatchStatus::Approved, actor.clone(), None);
                        self.set_payroll_statuses(&batch, PayrollStatus::Approved);
                    }
                }
                ApprovalLevel::Ceo => {
                    ensure_transition(batch.status, BatchStatus::Approved)?;
                    batch.record_status(BatchStatus::Approved, actor.clone(), notes.clone());
                    self.set_payroll_statuses(&batch, PayrollStatus::Approved);
                }
            },
        }

        batch.approvals.push(ApprovalRecord {
            level,
            action,
            actor,
            timestamp: Utc::now(),
            notes,
            previous_status,
            new_status: batch.status,
        });

        info!(
            batch_id = %batch.id,
            level = ?level,
            action = ?action,
            from = %previous_status,
            to = %batch.status,
            "Approval action applied"
        );
        self.store.save_batch(batch)
    }

    /// Moves an approved batch into payment processing and partitions
    /// its records into payment sub-batches.
    ///
    /// The batch stays in `processing_payment`; completion is reported
    /// per sub-batch via [`complete_payment_batch`](Self::complete_payment_batch).
    pub fn process_payments(&self, batch_id: Uuid, actor: Actor) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        ensure_transition(batch.status, BatchStatus::ProcessingPayment)?;
        batch.record_status(BatchStatus::ProcessingPayment, actor, None);

        let payrolls = self.store.payrolls_by_batch(batch.id);
        batch.payment_batches =
            partition_payments(batch.id, &payrolls, self.config.rounding());
        batch.recompute_payment_status();

        info!(
            batch_id = %batch.id,
            sub_batches = batch.payment_batches.len(),
            total_net = %batch.totals.total_net_pay,
            "Payment sub-batches created"
        );
        self.store.save_batch(batch)
    }

    /// Records one payment sub-batch's outcome.
    ///
    /// Recomputes the batch-level payment status and paid/pending
    /// amounts. Once every sub-batch has completed, the batch moves to
    /// `paid` and every linked payroll record is marked paid in the same
    /// consistency unit.
    pub fn complete_payment_batch(
        &self,
        batch_id: Uuid,
        payment_batch_id: Uuid,
        outcome: PaymentOutcome,
        actor: Actor,
    ) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        if batch.status != BatchStatus::ProcessingPayment {
            return Err(PayrollError::InvalidState {
                batch_id: batch.id.to_string(),
                action: "completed".to_string(),
                status: batch.status.as_str().to_string(),
            });
        }

        let sub_batch = batch
            .payment_batches
            .iter_mut()
            .find(|pb| pb.id == payment_batch_id)
            .ok_or_else(|| PayrollError::PaymentBatchNotFound {
                batch_id: batch.id.to_string(),
                payment_batch_id: payment_batch_id.to_string(),
            })?;

        sub_batch.status = outcome.status;
        sub_batch.processed_count = outcome.processed_count;
        sub_batch.failed_employee_ids = outcome.failed_employee_ids;
        sub_batch.external_reference = outcome.external_reference;

        batch.recompute_payment_status();

        if batch.payment_status == crate::models::PaymentStatus::Complete {
            ensure_transition(batch.status, BatchStatus::Paid)?;
            batch.record_status(BatchStatus::Paid, actor, None);
            self.set_payroll_statuses(&batch, PayrollStatus::Paid);
            info!(batch_id = %batch.id, paid = %batch.paid_amount, "Batch fully paid");
        }

        self.store.save_batch(batch)
    }

    /// Cancels a batch before payment, recording a reason.
    ///
    /// Valid only from draft, calculated or one of the review stages;
    /// cancellation never deletes the underlying payroll records.
    pub fn cancel(
        &self,
        batch_id: Uuid,
        reason: String,
        actor: Actor,
    ) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        let cancellable = matches!(
            batch.status,
            BatchStatus::Draft
                | BatchStatus::Calculated
                | BatchStatus::HrReview
                | BatchStatus::FinanceReview
                | BatchStatus::CeoReview
        );
        if !cancellable {
            return Err(PayrollError::InvalidState {
                batch_id: batch.id.to_string(),
                action: "cancelled".to_string(),
                status: batch.status.as_str().to_string(),
            });
        }
        batch.record_status(BatchStatus::Cancelled, actor, Some(reason));
        self.store.save_batch(batch)
    }

    /// Reverses a paid batch, recording a reason. Linked payroll records
    /// move to `reversed` but are never deleted.
    pub fn reverse(
        &self,
        batch_id: Uuid,
        reason: String,
        actor: Actor,
    ) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        ensure_transition(batch.status, BatchStatus::Reversed)?;
        batch.record_status(BatchStatus::Reversed, actor, Some(reason));
        self.set_payroll_statuses(&batch, PayrollStatus::Reversed);
        self.store.save_batch(batch)
    }

    /// Restarts a reversed batch back to draft for a fresh run.
    pub fn restart(&self, batch_id: Uuid, actor: Actor) -> PayrollResult<PayrollBatch> {
        let mut batch = self.batch(batch_id)?;
        ensure_transition(batch.status, BatchStatus::Draft)?;
        batch.record_status(BatchStatus::Draft, actor, None);
        self.store.save_batch(batch)
    }

    /// Returns payslip-ready summaries for a batch's records.
    pub fn payslips(&self, batch_id: Uuid) -> PayrollResult<Vec<PayslipSummary>> {
        let batch = self.batch(batch_id)?;
        Ok(self
            .store
            .payrolls_by_batch(batch.id)
            .iter()
            .map(|p| p.payslip_summary())
            .collect())
    }

    /// Advances every linked payroll record whose status allows the move.
    fn set_payroll_statuses(&self, batch: &PayrollBatch, to: PayrollStatus) {
        for payroll_id in &batch.payroll_ids {
            if let Some(mut payroll) = self.store.payroll_by_id(*payroll_id) {
                if payroll.status.can_transition_to(to) {
                    payroll.status = to;
                    payroll.updated_at = Utc::now();
                    self.store.save_payroll(payroll);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Contract, EmploymentStatus, PaymentBatchStatus, PaymentMethod, PaymentStatus,
    };
    use crate::sources::{InMemoryDirectory, InMemoryRecords};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    struct Fixture {
        manager: BatchManager,
        directory: Arc<InMemoryDirectory>,
        store: Arc<InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let config = Arc::new(PayrollConfig::uganda_defaults());
        let directory = Arc::new(InMemoryDirectory::new());
        let records = Arc::new(InMemoryRecords::new());
        let store = Arc::new(InMemoryStore::new());
        let manager = BatchManager::new(
            config,
            directory.clone(),
            records,
            store.clone(),
        );
        Fixture {
            manager,
            directory,
            store,
        }
    }

    fn actor() -> Actor {
        Actor {
            id: "usr_1".to_string(),
            name: "Namuli Joan".to_string(),
        }
    }

    fn seed_employee(f: &Fixture, id: &str, basic: i64) {
        f.directory.insert_employee(Employee {
            id: id.to_string(),
            employee_number: format!("E-{}", id),
            name: format!("Employee {}", id),
            department: "Finance".to_string(),
            subsidiary: "kampala".to_string(),
            status: EmploymentStatus::Active,
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            exit_date: None,
            date_of_birth: None,
            payment_method: PaymentMethod::BankTransfer {
                bank_name: "Stanbic".to_string(),
                account_number: format!("0140-{}", id),
            },
            nssf_exemption: None,
            nssf_exempt_category: None,
        });
        f.directory.insert_contract(Contract {
            reference: format!("CTR-{}", id),
            employee_id: id.to_string(),
            basic_salary: Decimal::from(basic),
            allowances: vec![],
            deductions: vec![],
            active: true,
        });
    }

    fn scope() -> BatchScope {
        BatchScope {
            subsidiary: "kampala".to_string(),
            department: None,
            employee_ids: None,
        }
    }

    fn calculated_batch(f: &Fixture) -> PayrollBatch {
        let batch = f.manager.create_batch(scope(), 2025, 9, actor()).unwrap();
        f.manager.calculate(batch.id, actor()).unwrap()
    }

    fn approved_batch(f: &Fixture) -> PayrollBatch {
        let batch = calculated_batch(f);
        f.manager.submit_for_review(batch.id, actor()).unwrap();
        f.manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        f.manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap()
    }

    #[test]
    fn test_calculate_only_valid_from_draft() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);

        let result = f.manager.calculate(batch.id, actor());
        assert!(matches!(
            result,
            Err(PayrollError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_calculate_aggregates_roster() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        seed_employee(&f, "e2", 2_000_000);
        let batch = calculated_batch(&f);

        assert_eq!(batch.status, BatchStatus::Calculated);
        assert_eq!(batch.employee_count, 2);
        assert_eq!(batch.calculated_count, 2);
        assert_eq!(batch.error_count, 0);
        assert_eq!(batch.totals.total_gross_pay, Decimal::from(3_000_000));
        assert_eq!(batch.payroll_ids.len(), 2);

        // Aggregates match the sum over the stored records.
        let payrolls = f.store.payrolls_by_batch(batch.id);
        let net: Decimal = payrolls.iter().map(|p| p.totals.net_pay).sum();
        assert_eq!(batch.totals.total_net_pay, net);
    }

    #[test]
    fn test_explicit_roster_is_chunked() {
        let config = Arc::new(PayrollConfig::uganda_defaults());
        let directory = Arc::new(InMemoryDirectory::with_chunk_size(2));
        let records = Arc::new(InMemoryRecords::new());
        let store = Arc::new(InMemoryStore::new());
        let manager = BatchManager::new(
            config,
            directory.clone(),
            records,
            store,
        );
        let f = Fixture {
            manager,
            directory,
            store: Arc::new(InMemoryStore::new()),
        };
        for id in ["e1", "e2", "e3", "e4", "e5"] {
            seed_employee(&f, id, 500_000);
        }

        let batch = f
            .manager
            .create_batch(
                BatchScope {
                    subsidiary: "kampala".to_string(),
                    department: None,
                    employee_ids: Some(
                        ["e1", "e2", "e3", "e4", "e5"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    ),
                },
                2025,
                9,
                actor(),
            )
            .unwrap();
        let batch = f.manager.calculate(batch.id, actor()).unwrap();
        assert_eq!(batch.calculated_count, 5);
    }

    #[test]
    fn test_partial_failure_is_recorded_not_fatal() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        // e2 has no contract.
        f.directory.insert_employee(Employee {
            id: "e2".to_string(),
            employee_number: "E-e2".to_string(),
            name: "Employee e2".to_string(),
            department: "Finance".to_string(),
            subsidiary: "kampala".to_string(),
            status: EmploymentStatus::Active,
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            exit_date: None,
            date_of_birth: None,
            payment_method: PaymentMethod::Cash,
            nssf_exemption: None,
            nssf_exempt_category: None,
        });

        let batch = calculated_batch(&f);
        assert_eq!(batch.status, BatchStatus::Calculated);
        assert_eq!(batch.calculated_count, 1);
        assert_eq!(batch.error_count, 1);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].employee_id, "e2");
        assert!(batch.failures[0].error.contains("no active contract"));
        // Totals cover the successful employee only.
        assert_eq!(batch.totals.total_gross_pay, Decimal::from(1_000_000));
    }

    #[test]
    fn test_submit_blocked_by_calculation_errors() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        f.directory.insert_employee(Employee {
            id: "e2".to_string(),
            employee_number: "E-e2".to_string(),
            name: "Employee e2".to_string(),
            department: "Finance".to_string(),
            subsidiary: "kampala".to_string(),
            status: EmploymentStatus::Active,
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            exit_date: None,
            date_of_birth: None,
            payment_method: PaymentMethod::Cash,
            nssf_exemption: None,
            nssf_exempt_category: None,
        });

        let batch = calculated_batch(&f);
        let result = f.manager.submit_for_review(batch.id, actor());
        assert!(matches!(
            result,
            Err(PayrollError::HasCalculationErrors { error_count: 1, .. })
        ));
    }

    #[test]
    fn test_approve_on_draft_fails_with_invalid_transition() {
        let f = fixture();
        let batch = f.manager.create_batch(scope(), 2025, 9, actor()).unwrap();
        let result =
            f.manager
                .approval_action(batch.id, ApprovalAction::Approve, actor(), None);
        assert!(matches!(
            result,
            Err(PayrollError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_full_approval_path_without_ceo() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);
        assert!(!batch.thresholds.ceo_required);

        let batch = f.manager.submit_for_review(batch.id, actor()).unwrap();
        assert_eq!(batch.status, BatchStatus::HrReview);

        let batch = f
            .manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::FinanceReview);

        let batch = f
            .manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Approved);
        assert_eq!(batch.approvals.len(), 2);

        // Linked records advanced with the batch.
        let payrolls = f.store.payrolls_by_batch(batch.id);
        assert!(payrolls
            .iter()
            .all(|p| p.status == PayrollStatus::Approved));
    }

    #[test]
    fn test_large_batch_routes_through_ceo_review() {
        let f = fixture();
        // Net pay comfortably above the 100M threshold.
        for i in 0..10 {
            seed_employee(&f, &format!("e{}", i), 20_000_000);
        }
        let batch = calculated_batch(&f);
        assert!(batch.thresholds.ceo_required);

        f.manager.submit_for_review(batch.id, actor()).unwrap();
        f.manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        let batch = f
            .manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::CeoReview);

        let batch = f
            .manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Approved);
        assert_eq!(batch.approvals.len(), 3);
        assert_eq!(batch.approvals[2].level, ApprovalLevel::Ceo);
    }

    #[test]
    fn test_reject_cancels_unconditionally() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);
        f.manager.submit_for_review(batch.id, actor()).unwrap();

        let batch = f
            .manager
            .approval_action(
                batch.id,
                ApprovalAction::Reject,
                actor(),
                Some("numbers look wrong".to_string()),
            )
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Cancelled);
        assert_eq!(batch.approvals[0].action, ApprovalAction::Reject);
    }

    #[test]
    fn test_return_steps_back_one_stage() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);
        f.manager.submit_for_review(batch.id, actor()).unwrap();
        f.manager
            .approval_action(batch.id, ApprovalAction::Approve, actor(), None)
            .unwrap();

        // Finance returns to HR-approved.
        let batch = f
            .manager
            .approval_action(
                batch.id,
                ApprovalAction::Return,
                actor(),
                Some("verify overtime".to_string()),
            )
            .unwrap();
        assert_eq!(batch.status, BatchStatus::HrApproved);
    }

    #[test]
    fn test_process_payments_partitions_records() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        seed_employee(&f, "e2", 2_000_000);
        let batch = approved_batch(&f);

        let batch = f.manager.process_payments(batch.id, actor()).unwrap();
        assert_eq!(batch.status, BatchStatus::ProcessingPayment);
        // Both employees bank with Stanbic, so one sub-batch.
        assert_eq!(batch.payment_batches.len(), 1);
        assert_eq!(batch.payment_batches[0].employee_count, 2);
        assert_eq!(batch.payment_status, PaymentStatus::Pending);
        assert_eq!(batch.pending_amount, batch.totals.total_net_pay);

        let sub_total: Decimal = batch.payment_batches.iter().map(|pb| pb.total_amount).sum();
        assert_eq!(sub_total, batch.totals.total_net_pay);
    }

    #[test]
    fn test_complete_payment_moves_batch_to_paid() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = approved_batch(&f);
        let batch = f.manager.process_payments(batch.id, actor()).unwrap();
        let sub_id = batch.payment_batches[0].id;

        let batch = f
            .manager
            .complete_payment_batch(
                batch.id,
                sub_id,
                PaymentOutcome {
                    status: PaymentBatchStatus::Completed,
                    processed_count: 1,
                    failed_employee_ids: vec![],
                    external_reference: Some("STB-20250930-001".to_string()),
                },
                actor(),
            )
            .unwrap();

        assert_eq!(batch.status, BatchStatus::Paid);
        assert_eq!(batch.payment_status, PaymentStatus::Complete);
        assert_eq!(batch.paid_amount, batch.totals.total_net_pay);
        assert_eq!(batch.pending_amount, Decimal::ZERO);

        let payrolls = f.store.payrolls_by_batch(batch.id);
        assert!(payrolls.iter().all(|p| p.status == PayrollStatus::Paid));
    }

    #[test]
    fn test_failed_sub_batch_leaves_batch_partial() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        f.directory.insert_employee(Employee {
            id: "e2".to_string(),
            employee_number: "E-e2".to_string(),
            name: "Employee e2".to_string(),
            department: "Finance".to_string(),
            subsidiary: "kampala".to_string(),
            status: EmploymentStatus::Active,
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            exit_date: None,
            date_of_birth: None,
            payment_method: PaymentMethod::Cash,
            nssf_exemption: None,
            nssf_exempt_category: None,
        });
        f.directory.insert_contract(Contract {
            reference: "CTR-e2".to_string(),
            employee_id: "e2".to_string(),
            basic_salary: Decimal::from(2_000_000),
            allowances: vec![],
            deductions: vec![],
            active: true,
        });

        let batch = approved_batch(&f);
        let batch = f.manager.process_payments(batch.id, actor()).unwrap();
        assert_eq!(batch.payment_batches.len(), 2);

        let bank_sub = batch
            .payment_batches
            .iter()
            .find(|pb| pb.method == crate::models::PaymentMethodKind::BankTransfer)
            .unwrap()
            .id;
        let cash_sub = batch
            .payment_batches
            .iter()
            .find(|pb| pb.method == crate::models::PaymentMethodKind::Cash)
            .unwrap()
            .id;

        let batch = f
            .manager
            .complete_payment_batch(
                batch.id,
                bank_sub,
                PaymentOutcome {
                    status: PaymentBatchStatus::Completed,
                    processed_count: 1,
                    failed_employee_ids: vec![],
                    external_reference: None,
                },
                actor(),
            )
            .unwrap();
        assert_eq!(batch.status, BatchStatus::ProcessingPayment);

        let batch = f
            .manager
            .complete_payment_batch(
                batch.id,
                cash_sub,
                PaymentOutcome {
                    status: PaymentBatchStatus::Failed,
                    processed_count: 0,
                    failed_employee_ids: vec!["e2".to_string()],
                    external_reference: None,
                },
                actor(),
            )
            .unwrap();

        assert_eq!(batch.status, BatchStatus::ProcessingPayment);
        assert_eq!(batch.payment_status, PaymentStatus::Partial);
        assert!(batch.pending_amount > Decimal::ZERO);
    }

    #[test]
    fn test_cancel_valid_states_only() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = approved_batch(&f);

        let result = f
            .manager
            .cancel(batch.id, "too late".to_string(), actor());
        assert!(matches!(result, Err(PayrollError::InvalidState { .. })));
    }

    #[test]
    fn test_cancel_records_reason() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);

        let batch = f
            .manager
            .cancel(batch.id, "duplicate run".to_string(), actor())
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Cancelled);
        assert_eq!(
            batch.status_history.last().unwrap().notes.as_deref(),
            Some("duplicate run")
        );
        // Cancellation keeps the payroll records.
        assert_eq!(f.store.payrolls_by_batch(batch.id).len(), 1);
    }

    #[test]
    fn test_reverse_and_restart() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = approved_batch(&f);
        let batch = f.manager.process_payments(batch.id, actor()).unwrap();
        let sub_id = batch.payment_batches[0].id;
        let batch = f
            .manager
            .complete_payment_batch(
                batch.id,
                sub_id,
                PaymentOutcome {
                    status: PaymentBatchStatus::Completed,
                    processed_count: 1,
                    failed_employee_ids: vec![],
                    external_reference: None,
                },
                actor(),
            )
            .unwrap();

        let batch = f
            .manager
            .reverse(batch.id, "bank recall".to_string(), actor())
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Reversed);
        let payrolls = f.store.payrolls_by_batch(batch.id);
        assert!(payrolls.iter().all(|p| p.status == PayrollStatus::Reversed));

        let batch = f.manager.restart(batch.id, actor()).unwrap();
        assert_eq!(batch.status, BatchStatus::Draft);
    }

    #[test]
    fn test_status_history_records_every_transition_once() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = approved_batch(&f);

        let statuses: Vec<BatchStatus> =
            batch.status_history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                BatchStatus::Draft,
                BatchStatus::Calculating,
                BatchStatus::Calculated,
                BatchStatus::HrReview,
                BatchStatus::HrApproved,
                BatchStatus::FinanceReview,
                BatchStatus::FinanceApproved,
                BatchStatus::Approved,
            ]
        );
    }

    #[test]
    fn test_stale_writer_gets_concurrent_modification() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = f.manager.create_batch(scope(), 2025, 9, actor()).unwrap();

        // First actor calculates; the stored version moves on.
        f.manager.calculate(batch.id, actor()).unwrap();

        // A second actor holding the stale draft copy tries to write it
        // back directly.
        let result = f.store.save_batch(batch);
        assert!(matches!(
            result,
            Err(PayrollError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn test_recalculation_after_return_resets_aggregates() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);
        f.manager.submit_for_review(batch.id, actor()).unwrap();

        // HR returns the batch for recalculation.
        let batch = f
            .manager
            .approval_action(batch.id, ApprovalAction::Return, actor(), None)
            .unwrap();
        assert_eq!(batch.status, BatchStatus::Calculated);

        // Back to draft is not allowed from calculated via calculate();
        // the transition table allows calculated -> draft explicitly.
        let mut draft = batch.clone();
        ensure_transition(draft.status, BatchStatus::Draft).unwrap();
        draft.record_status(BatchStatus::Draft, actor(), None);
        let draft = f.store.save_batch(draft).unwrap();

        let recalculated = f.manager.calculate(draft.id, actor()).unwrap();
        assert_eq!(recalculated.calculated_count, 1);
        assert_eq!(
            recalculated.totals.total_gross_pay,
            Decimal::from(1_000_000)
        );
        // Aggregates were rebuilt, not doubled.
        assert_eq!(recalculated.payroll_ids.len(), 1);
    }

    #[test]
    fn test_payslips_expose_summaries() {
        let f = fixture();
        seed_employee(&f, "e1", 1_000_000);
        let batch = calculated_batch(&f);

        let payslips = f.manager.payslips(batch.id).unwrap();
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].gross_pay, Decimal::from(1_000_000));
        assert_eq!(
            payslips[0].net_pay,
            payslips[0].gross_pay - payslips[0].total_deductions
        );
    }
}
