//! External data-source interfaces.
//!
//! The engine consumes two collaborators it does not own: the
//! employee/contract directory and the period-scoped overtime/loan
//! records source. Both are traits so the transport behind them stays
//! out of scope; the in-memory implementations back tests and the
//! bundled API state.

mod memory;

use crate::calculation::OvertimeEntry;
use crate::models::{Contract, Employee, LoanRecovery};

pub use memory::{InMemoryDirectory, InMemoryRecords};

/// Lookup into the employee/contract directory.
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the employee with the given id, if any.
    fn employee(&self, employee_id: &str) -> Option<Employee>;

    /// Returns the employees for one chunk of ids.
    ///
    /// Callers iterate explicit id lists in chunks of at most
    /// [`query_chunk_size`](Self::query_chunk_size) ids per call. Unknown
    /// ids are silently absent from the result.
    fn employees_by_ids(&self, ids: &[String]) -> Vec<Employee>;

    /// Returns all payable (active or on-leave) employees in a
    /// subsidiary, optionally narrowed to one department.
    fn active_employees(&self, subsidiary: &str, department: Option<&str>) -> Vec<Employee>;

    /// Returns the employee's active contract, if any.
    fn active_contract(&self, employee_id: &str) -> Option<Contract>;

    /// The maximum id-list size per [`employees_by_ids`](Self::employees_by_ids)
    /// query.
    fn query_chunk_size(&self) -> usize {
        100
    }
}

/// Period-scoped overtime, leave and loan records.
pub trait PeriodRecordsSource: Send + Sync {
    /// Approved overtime entries for an employee in a period.
    fn approved_overtime(&self, employee_id: &str, year: i32, month: u32) -> Vec<OvertimeEntry>;

    /// Unpaid leave days taken by an employee in a period.
    fn unpaid_leave_days(&self, employee_id: &str, year: i32, month: u32) -> u32;

    /// Active loan recoveries against an employee's pay.
    fn active_loans(&self, employee_id: &str) -> Vec<LoanRecovery>;
}
