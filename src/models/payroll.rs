//! Per-employee payroll record models.
//!
//! This module contains the [`EmployeePayroll`] aggregate and its line
//! items: earnings with independently tracked taxable and NSSF-applicable
//! sub-amounts, categorized deductions, statutory breakdowns and totals.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{LstBreakdown, NssfBreakdown, PayeBreakdown, ProrationDetail};

use super::employee::PaymentMethod;
use super::ytd::YtdTotals;

/// How often an employee is paid. Only monthly runs are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    /// Paid once per calendar month.
    Monthly,
}

/// One pay period: a calendar month with explicit boundary dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// The date pay is disbursed.
    pub payment_date: NaiveDate,
    /// Payment frequency.
    pub frequency: PaymentFrequency,
}

impl PayPeriod {
    /// Builds the monthly period for the given year and month.
    ///
    /// Pay is dated on the period's last day.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod::monthly(2025, 9).unwrap();
    /// assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
    /// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
    /// ```
    pub fn monthly(year: i32, month: u32) -> Option<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let end_date = next_month.pred_opt()?;
        Some(Self {
            year,
            month,
            start_date,
            end_date,
            payment_date: end_date,
            frequency: PaymentFrequency::Monthly,
        })
    }
}

/// Where an earnings line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningsKind {
    /// Prorated basic salary.
    Basic,
    /// A prorated contract allowance.
    Allowance,
    /// Approved overtime.
    Overtime,
    /// A manual additional earning.
    Other,
}

/// One earnings line on a payroll record.
///
/// The taxable and NSSF-applicable sub-amounts are tracked independently
/// of the line amount, so an item may be partially taxable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsItem {
    /// Where this line came from.
    pub kind: EarningsKind,
    /// Description shown on the payslip.
    pub description: String,
    /// The full line amount.
    pub amount: Decimal,
    /// How much of the amount counts toward taxable income.
    pub taxable_amount: Decimal,
    /// How much of the amount counts toward the NSSF base.
    pub nssf_amount: Decimal,
}

/// The category of a deduction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    /// Statutory deductions (PAYE, NSSF, LST).
    Statutory,
    /// Voluntary deductions (savings, associations).
    Voluntary,
    /// Loan or advance recoveries.
    Recovery,
    /// Court-ordered deductions.
    Court,
}

/// Installment progress carried on a loan-recovery deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProgress {
    /// The loan identifier.
    pub loan_id: String,
    /// Which installment this recovery is (1-based).
    pub installment_number: u32,
    /// Total installments on the loan.
    pub total_installments: u32,
}

/// One deduction line on a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionItem {
    /// Description shown on the payslip.
    pub description: String,
    /// The deduction category.
    pub category: DeductionCategory,
    /// The deduction amount.
    pub amount: Decimal,
    /// Whether the deduction is mandatory.
    pub mandatory: bool,
    /// Installment progress, for loan recoveries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan: Option<LoanProgress>,
}

/// Aggregated totals for one payroll record.
///
/// Invariant: `net_pay == gross_pay - total_deductions`, and each total is
/// the sum of its constituent lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Sum of all earnings lines.
    pub total_earnings: Decimal,
    /// Gross pay (equals total earnings).
    pub gross_pay: Decimal,
    /// Sum of the taxable sub-amounts.
    pub taxable_income: Decimal,
    /// Sum of the NSSF-applicable sub-amounts.
    pub nssf_applicable_income: Decimal,
    /// Sum of statutory deduction lines.
    pub total_statutory_deductions: Decimal,
    /// Sum of non-statutory deduction lines.
    pub total_voluntary_deductions: Decimal,
    /// Sum of all deduction lines.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_pay: Decimal,
}

/// The lifecycle status of a payroll record.
///
/// Progression is linear; the only move out of `Paid` is `Reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Created but not yet calculated.
    Draft,
    /// Calculation complete.
    Calculated,
    /// Reviewed by HR.
    Reviewed,
    /// Approved for payment.
    Approved,
    /// Payment disbursed.
    Paid,
    /// Payment reversed after disbursement.
    Reversed,
}

impl PayrollStatus {
    /// Returns true if the record may move from `self` to `to`.
    pub fn can_transition_to(self, to: PayrollStatus) -> bool {
        use PayrollStatus::*;
        matches!(
            (self, to),
            (Draft, Calculated)
                | (Calculated, Reviewed)
                | (Reviewed, Approved)
                | (Approved, Paid)
                | (Paid, Reversed)
        )
    }

    /// Returns true once the record is immutable (except for reversal).
    pub fn is_final(self) -> bool {
        matches!(self, PayrollStatus::Paid | PayrollStatus::Reversed)
    }
}

/// One employee's payroll for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayroll {
    /// Unique record identifier.
    pub id: Uuid,
    /// The employee identifier.
    pub employee_id: String,
    /// Human-facing employee number.
    pub employee_number: String,
    /// Employee display name.
    pub employee_name: String,
    /// Department name.
    pub department: String,
    /// The contract this payroll was calculated from.
    pub contract_reference: String,
    /// How this employee's net pay is disbursed.
    pub payment_method: PaymentMethod,
    /// The pay period.
    pub period: PayPeriod,
    /// Partial-period proration detail.
    pub proration: ProrationDetail,
    /// Ordered earnings lines.
    pub earnings: Vec<EarningsItem>,
    /// PAYE breakdown.
    pub paye: PayeBreakdown,
    /// NSSF breakdown.
    pub nssf: NssfBreakdown,
    /// LST breakdown.
    pub lst: LstBreakdown,
    /// Ordered deduction lines.
    pub deductions: Vec<DeductionItem>,
    /// Aggregated totals.
    pub totals: PayrollTotals,
    /// YTD totals after this period was merged.
    pub ytd: YtdTotals,
    /// Record lifecycle status.
    pub status: PayrollStatus,
    /// Version, incremented on every recalculation.
    pub version: u32,
    /// The batch that owns this record, once linked.
    pub payroll_period_id: Option<Uuid>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last recalculated or transitioned.
    pub updated_at: DateTime<Utc>,
}

impl EmployeePayroll {
    /// Builds the payslip-ready summary consumed by document rendering.
    pub fn payslip_summary(&self) -> PayslipSummary {
        PayslipSummary {
            employee_id: self.employee_id.clone(),
            employee_number: self.employee_number.clone(),
            employee_name: self.employee_name.clone(),
            department: self.department.clone(),
            year: self.period.year,
            month: self.period.month,
            earnings: self.earnings.clone(),
            deductions: self.deductions.clone(),
            gross_pay: self.totals.gross_pay,
            total_deductions: self.totals.total_deductions,
            net_pay: self.totals.net_pay,
            ytd: self.ytd.clone(),
        }
    }
}

/// The payslip-ready aggregate handed to document rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipSummary {
    /// The employee identifier.
    pub employee_id: String,
    /// Human-facing employee number.
    pub employee_number: String,
    /// Employee display name.
    pub employee_name: String,
    /// Department name.
    pub department: String,
    /// Pay period year.
    pub year: i32,
    /// Pay period month.
    pub month: u32,
    /// Earnings lines.
    pub earnings: Vec<EarningsItem>,
    /// Deduction lines.
    pub deductions: Vec<DeductionItem>,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
    /// YTD totals after this period.
    pub ytd: YtdTotals,
}
