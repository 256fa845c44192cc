//! Persistence abstraction.
//!
//! Payroll records, batches and YTD ledgers are persisted as documents
//! behind the [`PayrollStore`] trait; the storage technology stays out of
//! scope. Batch saves are version-checked: every successful write
//! increments the batch's monotonic `version`, and a stale write fails
//! with `ConcurrentModification` so no two actors can advance the same
//! batch concurrently.

mod memory;

use uuid::Uuid;

use crate::error::PayrollResult;
use crate::models::{BatchStatus, EmployeePayroll, PayrollBatch, PeriodContribution, YtdTotals};

pub use memory::InMemoryStore;

/// Document store for payroll records, batches and YTD ledgers.
pub trait PayrollStore: Send + Sync {
    /// Returns the payroll record for an employee/period, if any.
    fn payroll(&self, employee_id: &str, year: i32, month: u32) -> Option<EmployeePayroll>;

    /// Returns a payroll record by id.
    fn payroll_by_id(&self, id: Uuid) -> Option<EmployeePayroll>;

    /// Creates or replaces a payroll record.
    fn save_payroll(&self, payroll: EmployeePayroll);

    /// Returns all payroll records linked to a batch.
    fn payrolls_by_batch(&self, batch_id: Uuid) -> Vec<EmployeePayroll>;

    /// Returns a batch by id.
    fn batch(&self, batch_id: Uuid) -> Option<PayrollBatch>;

    /// Inserts a newly created batch.
    fn insert_batch(&self, batch: PayrollBatch);

    /// Saves a batch under optimistic concurrency control.
    ///
    /// The incoming batch must carry the version it was loaded at. On
    /// success the stored version is incremented and the updated batch is
    /// returned; on a version mismatch the save fails with
    /// `ConcurrentModification` and nothing is written.
    fn save_batch(&self, batch: PayrollBatch) -> PayrollResult<PayrollBatch>;

    /// Returns the batches for a subsidiary and period.
    fn batches_by_period(&self, subsidiary: &str, year: i32, month: u32) -> Vec<PayrollBatch>;

    /// Returns all batches currently in one of the given statuses.
    fn batches_by_status(&self, statuses: &[BatchStatus]) -> Vec<PayrollBatch>;

    /// Returns an employee's YTD totals excluding the given period.
    ///
    /// The store keeps per-period contributions, so recalculating a period
    /// replaces its contribution instead of double-counting it. Returns an
    /// empty zero record when the employee has no history in the fiscal
    /// year.
    fn ytd_before(
        &self,
        employee_id: &str,
        fiscal_year: i32,
        year: i32,
        month: u32,
    ) -> YtdTotals;

    /// Records (or replaces) one period's contribution to an employee's
    /// YTD ledger.
    fn record_period_contribution(
        &self,
        employee_id: &str,
        fiscal_year: i32,
        year: i32,
        month: u32,
        contribution: PeriodContribution,
    );
}
