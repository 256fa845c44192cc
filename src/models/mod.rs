//! Domain models for the payroll engine.
//!
//! This module contains the employee/contract input models, the
//! per-employee payroll record, year-to-date totals, and the payroll
//! batch with its approval and payment structures.

mod batch;
mod employee;
mod payroll;
mod ytd;

pub use batch::{
    Actor, ApprovalAction, ApprovalLevel, ApprovalRecord, ApprovalThresholds, BatchScope,
    BatchStatus, BatchTotals, CalculationFailure, PaymentBatch, PaymentBatchStatus,
    PaymentMethodKind, PaymentOutcome, PaymentStatus, PayrollBatch, StatusHistoryEntry,
    TransferLineItem,
};
pub use employee::{
    AllowanceType, Contract, ContractAllowance, ContractDeduction, Employee, EmploymentStatus,
    LoanRecovery, PaymentMethod,
};
pub use payroll::{
    DeductionCategory, DeductionItem, EarningsItem, EarningsKind, EmployeePayroll, LoanProgress,
    PayPeriod, PaymentFrequency, PayrollStatus, PayrollTotals, PayslipSummary,
};
pub use ytd::{PeriodContribution, YtdTotals};
