//! Year-to-date cumulative totals.
//!
//! YTD totals are an explicit aggregate keyed by (employee, fiscal year),
//! never ambient state. Each payroll period contributes additively; within
//! a fiscal year the totals are monotonically non-decreasing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cumulative fiscal-year totals for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdTotals {
    /// The employee these totals belong to.
    pub employee_id: String,
    /// The fiscal year, labelled by its starting calendar year.
    pub fiscal_year: i32,
    /// Cumulative gross earnings.
    pub gross_earnings: Decimal,
    /// Cumulative taxable income.
    pub taxable_income: Decimal,
    /// Cumulative PAYE.
    pub paye: Decimal,
    /// Cumulative NSSF employee contributions.
    pub nssf_employee: Decimal,
    /// Cumulative NSSF employer contributions.
    pub nssf_employer: Decimal,
    /// Cumulative LST paid.
    pub lst: Decimal,
    /// Cumulative total deductions.
    pub total_deductions: Decimal,
    /// Cumulative net pay.
    pub net_pay: Decimal,
    /// Number of periods contributing to these totals.
    pub periods: u32,
}

/// One payroll period's contribution to an employee's YTD totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodContribution {
    /// Gross earnings this period.
    pub gross_earnings: Decimal,
    /// Taxable income this period.
    pub taxable_income: Decimal,
    /// PAYE this period.
    pub paye: Decimal,
    /// NSSF employee contribution this period.
    pub nssf_employee: Decimal,
    /// NSSF employer contribution this period.
    pub nssf_employer: Decimal,
    /// LST this period.
    pub lst: Decimal,
    /// Total deductions this period.
    pub total_deductions: Decimal,
    /// Net pay this period.
    pub net_pay: Decimal,
}

impl YtdTotals {
    /// An empty zero record for an employee/fiscal-year with no history.
    pub fn empty(employee_id: impl Into<String>, fiscal_year: i32) -> Self {
        Self {
            employee_id: employee_id.into(),
            fiscal_year,
            ..Default::default()
        }
    }

    /// Returns these totals with one period's contribution merged in.
    ///
    /// YTD after period N = YTD before period N + period N contribution.
    pub fn merged(&self, contribution: &PeriodContribution) -> Self {
        Self {
            employee_id: self.employee_id.clone(),
            fiscal_year: self.fiscal_year,
            gross_earnings: self.gross_earnings + contribution.gross_earnings,
            taxable_income: self.taxable_income + contribution.taxable_income,
            paye: self.paye + contribution.paye,
            nssf_employee: self.nssf_employee + contribution.nssf_employee,
            nssf_employer: self.nssf_employer + contribution.nssf_employer,
            lst: self.lst + contribution.lst,
            total_deductions: self.total_deductions + contribution.total_deductions,
            net_pay: self.net_pay + contribution.net_pay,
            periods: self.periods + 1,
        }
    }
}
