//! Employee, contract and compensation-structure models.
//!
//! These types mirror what the employee/contract directory returns: the
//! employee identity and payment details, plus the contract carrying the
//! compensation structure (basic salary, allowances, recurring deductions).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payroll::DeductionCategory;

/// The employment status of an employee.
///
/// Only `Active` and `OnLeave` employees may be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Actively employed.
    Active,
    /// On (paid) leave.
    OnLeave,
    /// Suspended pending review.
    Suspended,
    /// Employment has ended.
    Terminated,
}

impl EmploymentStatus {
    /// Returns true if this status allows the employee to be paid.
    pub fn is_payable(self) -> bool {
        matches!(self, EmploymentStatus::Active | EmploymentStatus::OnLeave)
    }

    /// Returns the wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::OnLeave => "on_leave",
            EmploymentStatus::Suspended => "suspended",
            EmploymentStatus::Terminated => "terminated",
        }
    }
}

/// How an employee receives their net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Salary paid into a bank account.
    BankTransfer {
        /// The receiving bank's name.
        bank_name: String,
        /// The receiving account number.
        account_number: String,
    },
    /// Salary paid to a mobile money wallet.
    MobileMoney {
        /// The mobile money provider.
        provider: String,
        /// The wallet's phone number.
        phone_number: String,
    },
    /// Salary paid in cash.
    Cash,
    /// Salary paid by cheque.
    Cheque,
}

impl PaymentMethod {
    /// The account identifier used on transfer line items, if any.
    pub fn account(&self) -> Option<&str> {
        match self {
            PaymentMethod::BankTransfer { account_number, .. } => Some(account_number),
            PaymentMethod::MobileMoney { phone_number, .. } => Some(phone_number),
            PaymentMethod::Cash | PaymentMethod::Cheque => None,
        }
    }
}

/// An employee as returned by the employee directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: String,
    /// Human-facing employee number.
    pub employee_number: String,
    /// Display name.
    pub name: String,
    /// Department name.
    pub department: String,
    /// Owning subsidiary.
    pub subsidiary: String,
    /// Current employment status.
    pub status: EmploymentStatus,
    /// Date employment started.
    pub joining_date: NaiveDate,
    /// Date employment ends/ended, if set.
    pub exit_date: Option<NaiveDate>,
    /// Date of birth, when on record.
    pub date_of_birth: Option<NaiveDate>,
    /// How net pay is disbursed.
    pub payment_method: PaymentMethod,
    /// Explicit NSSF exemption reason, if declared.
    #[serde(default)]
    pub nssf_exemption: Option<String>,
    /// NSSF-exempt employment category, if applicable.
    #[serde(default)]
    pub nssf_exempt_category: Option<String>,
}

impl Employee {
    /// Returns the employee's age in whole years on the given date, when a
    /// date of birth is on record.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut age = date.year() - dob.year();
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        Some(age.max(0) as u32)
    }
}

/// A closed set of allowance types with fixed tax treatment.
///
/// The treatment table decides how much of each contract allowance counts
/// toward taxable income and the NSSF contribution base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceType {
    /// Housing allowance.
    Housing,
    /// Transport allowance.
    Transport,
    /// Medical allowance.
    Medical,
    /// Meal allowance.
    Meal,
    /// Airtime allowance.
    Airtime,
    /// Any other allowance.
    Other,
}

impl AllowanceType {
    /// Whether this allowance counts toward taxable income.
    pub fn taxable(self) -> bool {
        match self {
            AllowanceType::Housing
            | AllowanceType::Transport
            | AllowanceType::Meal
            | AllowanceType::Airtime
            | AllowanceType::Other => true,
            AllowanceType::Medical => false,
        }
    }

    /// Whether this allowance counts toward the NSSF contribution base.
    pub fn nssf_applicable(self) -> bool {
        match self {
            AllowanceType::Housing | AllowanceType::Transport | AllowanceType::Other => true,
            AllowanceType::Medical | AllowanceType::Meal | AllowanceType::Airtime => false,
        }
    }

    /// Display label for earnings lines.
    pub fn label(self) -> &'static str {
        match self {
            AllowanceType::Housing => "Housing allowance",
            AllowanceType::Transport => "Transport allowance",
            AllowanceType::Medical => "Medical allowance",
            AllowanceType::Meal => "Meal allowance",
            AllowanceType::Airtime => "Airtime allowance",
            AllowanceType::Other => "Allowance",
        }
    }
}

/// A recurring allowance defined on a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAllowance {
    /// The allowance type, which fixes its tax treatment.
    pub allowance_type: AllowanceType,
    /// Monthly amount before proration.
    pub amount: Decimal,
}

/// A recurring deduction defined on a contract.
///
/// Statutory deductions are computed by the engine, never defined here;
/// contract deductions are voluntary or court-ordered amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDeduction {
    /// Description shown on the payslip.
    pub description: String,
    /// The deduction category.
    pub category: DeductionCategory,
    /// Monthly amount.
    pub amount: Decimal,
    /// Whether the deduction is mandatory.
    pub mandatory: bool,
}

/// An employment contract with its compensation structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract reference.
    pub reference: String,
    /// The employee this contract belongs to.
    pub employee_id: String,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Recurring allowances.
    pub allowances: Vec<ContractAllowance>,
    /// Recurring non-statutory deductions.
    pub deductions: Vec<ContractDeduction>,
    /// Whether the contract is currently active.
    pub active: bool,
}

/// An active loan recovery against an employee's pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecovery {
    /// The loan identifier.
    pub loan_id: String,
    /// Description shown on the payslip.
    pub description: String,
    /// The monthly installment to recover.
    pub monthly_installment: Decimal,
    /// Which installment this period's recovery is (1-based).
    pub installment_number: u32,
    /// Total installments on the loan.
    pub total_installments: u32,
    /// Balance outstanding before this installment.
    pub remaining_balance: Decimal,
}
