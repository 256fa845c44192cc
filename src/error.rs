//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll calculation and
//! batch lifecycle processing.
//!
//! The errors fall into four groups with different blast radii:
//!
//! - **Precondition errors** ([`EmployeeNotFound`](PayrollError::EmployeeNotFound),
//!   [`NoActiveContract`](PayrollError::NoActiveContract),
//!   [`InvalidEmploymentStatus`](PayrollError::InvalidEmploymentStatus),
//!   [`AlreadyCalculated`](PayrollError::AlreadyCalculated)) abort a single
//!   employee's calculation and are non-fatal to a batch run.
//! - **Workflow errors** ([`InvalidStatusTransition`](PayrollError::InvalidStatusTransition),
//!   [`HasCalculationErrors`](PayrollError::HasCalculationErrors),
//!   [`InvalidState`](PayrollError::InvalidState)) reject the requested
//!   action entirely; batch and record state remain unchanged.
//! - **Concurrency errors** ([`ConcurrentModification`](PayrollError::ConcurrentModification))
//!   mean the caller must retry with fresh state.
//! - **Configuration errors** cover missing or malformed YAML configuration.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::EmployeeNotFound {
///     employee_id: "emp_042".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_042");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No employee exists with the given identifier.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was not found.
        employee_id: String,
    },

    /// The employee's employment status does not allow payment.
    #[error("Employee '{employee_id}' cannot be paid while {status}")]
    InvalidEmploymentStatus {
        /// The employee identifier.
        employee_id: String,
        /// The disqualifying employment status.
        status: String,
    },

    /// The employee has no active contract for the period.
    #[error("Employee '{employee_id}' has no active contract")]
    NoActiveContract {
        /// The employee identifier.
        employee_id: String,
    },

    /// A payroll record already exists for this employee and period.
    #[error("Payroll already calculated for employee '{employee_id}' in {year}-{month:02}")]
    AlreadyCalculated {
        /// The employee identifier.
        employee_id: String,
        /// The payroll year.
        year: i32,
        /// The payroll month (1-12).
        month: u32,
    },

    /// The requested batch status transition is not allowed.
    #[error("Invalid batch status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current batch status.
        from: String,
        /// The requested target status.
        to: String,
    },

    /// The batch has per-employee calculation errors and cannot proceed.
    #[error("Batch '{batch_id}' has {error_count} calculation error(s)")]
    HasCalculationErrors {
        /// The batch identifier.
        batch_id: String,
        /// The number of failed employee calculations.
        error_count: usize,
    },

    /// The batch is not in a state that allows the requested action.
    #[error("Batch '{batch_id}' cannot be {action} while {status}")]
    InvalidState {
        /// The batch identifier.
        batch_id: String,
        /// The action that was attempted.
        action: String,
        /// The current batch status.
        status: String,
    },

    /// A stale write was detected on a versioned record.
    #[error(
        "Concurrent modification of batch '{batch_id}': expected version {expected}, found {found}"
    )]
    ConcurrentModification {
        /// The batch identifier.
        batch_id: String,
        /// The version the writer expected.
        expected: u64,
        /// The version actually stored.
        found: u64,
    },

    /// The payroll record has been paid and may only be reversed.
    #[error("Payroll for employee '{employee_id}' is {status} and cannot be recalculated")]
    ImmutablePayroll {
        /// The employee identifier.
        employee_id: String,
        /// The record's final status.
        status: String,
    },

    /// A referenced batch does not exist.
    #[error("Batch not found: {batch_id}")]
    BatchNotFound {
        /// The batch identifier that was not found.
        batch_id: String,
    },

    /// A referenced payment sub-batch does not exist.
    #[error("Payment batch '{payment_batch_id}' not found in batch '{batch_id}'")]
    PaymentBatchNotFound {
        /// The owning batch identifier.
        batch_id: String,
        /// The payment sub-batch identifier.
        payment_batch_id: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return [`PayrollError`].
pub type PayrollResult<T> = Result<T, PayrollError>;

impl PayrollError {
    /// Returns true for precondition errors, which abort a single employee's
    /// calculation without being fatal to the surrounding batch run.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PayrollError::EmployeeNotFound { .. }
                | PayrollError::InvalidEmploymentStatus { .. }
                | PayrollError::NoActiveContract { .. }
                | PayrollError::AlreadyCalculated { .. }
        )
    }
}
