//! The payroll record builder.
//!
//! [`PayrollEngine`] assembles one employee's payroll for one period:
//! precondition checks, proration, the earnings list with its tax
//! treatment, the statutory calculators, the deductions list, totals and
//! the YTD merge. Batch orchestration lives in [`crate::batch`]; this
//! module only ever touches a single employee at a time.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{
    calculate_lst, calculate_nssf, calculate_overtime, calculate_paye, calculate_proration,
    NssfOptions, OvertimeKind,
};
use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    DeductionCategory, DeductionItem, EarningsItem, EarningsKind, EmployeePayroll, LoanProgress,
    PayPeriod, PayrollStatus, PayrollTotals, PeriodContribution,
};
use crate::sources::{EmployeeDirectory, PeriodRecordsSource};
use crate::store::PayrollStore;

/// A manual additional earning passed as a calculation override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEarning {
    /// Description shown on the payslip.
    pub description: String,
    /// The amount.
    pub amount: Decimal,
    /// Whether the amount counts toward taxable income.
    pub taxable: bool,
    /// Whether the amount counts toward the NSSF base.
    pub nssf_applicable: bool,
}

/// A manual additional deduction passed as a calculation override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualDeduction {
    /// Description shown on the payslip.
    pub description: String,
    /// The deduction category.
    pub category: DeductionCategory,
    /// The amount.
    pub amount: Decimal,
}

/// Manual per-calculation overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationOverrides {
    /// Additional earnings beyond the contract.
    #[serde(default)]
    pub additional_earnings: Vec<ManualEarning>,
    /// Additional deductions beyond the contract.
    #[serde(default)]
    pub additional_deductions: Vec<ManualDeduction>,
}

/// Builds per-employee payroll records.
pub struct PayrollEngine {
    config: Arc<PayrollConfig>,
    directory: Arc<dyn EmployeeDirectory>,
    records: Arc<dyn PeriodRecordsSource>,
    store: Arc<dyn PayrollStore>,
}

impl PayrollEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(
        config: Arc<PayrollConfig>,
        directory: Arc<dyn EmployeeDirectory>,
        records: Arc<dyn PeriodRecordsSource>,
        store: Arc<dyn PayrollStore>,
    ) -> Self {
        Self {
            config,
            directory,
            records,
            store,
        }
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Calculates (or recalculates) one employee's payroll for a period.
    ///
    /// Precondition failures abort this employee only, with no side
    /// effects; a batch run catches them per employee. On success the
    /// record is persisted with status `calculated`, the period's
    /// contribution is merged into the employee's YTD ledger, and the
    /// record version is incremented if this was a recalculation.
    ///
    /// # Errors
    ///
    /// - `AlreadyCalculated` when a record exists and `recalculate` is false
    /// - `ImmutablePayroll` when the existing record is already paid
    /// - `EmployeeNotFound`, `InvalidEmploymentStatus`, `NoActiveContract`
    ///   as precondition checks
    pub fn calculate_employee_payroll(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        overrides: &CalculationOverrides,
        recalculate: bool,
    ) -> PayrollResult<EmployeePayroll> {
        let period = PayPeriod::monthly(year, month).ok_or_else(|| {
            PayrollError::CalculationError {
                message: format!("invalid pay period {}-{}", year, month),
            }
        })?;

        let existing = self.store.payroll(employee_id, year, month);
        if let Some(existing) = &existing {
            if !recalculate {
                return Err(PayrollError::AlreadyCalculated {
                    employee_id: employee_id.to_string(),
                    year,
                    month,
                });
            }
            // Paid records are immutable; reversed records may be replaced
            // by a fresh calculation on a restarted run.
            if existing.status == PayrollStatus::Paid {
                return Err(PayrollError::ImmutablePayroll {
                    employee_id: employee_id.to_string(),
                    status: "paid".to_string(),
                });
            }
        }

        let employee =
            self.directory
                .employee(employee_id)
                .ok_or_else(|| PayrollError::EmployeeNotFound {
                    employee_id: employee_id.to_string(),
                })?;
        if !employee.status.is_payable() {
            return Err(PayrollError::InvalidEmploymentStatus {
                employee_id: employee_id.to_string(),
                status: employee.status.as_str().to_string(),
            });
        }
        let contract = self.directory.active_contract(employee_id).ok_or_else(|| {
            PayrollError::NoActiveContract {
                employee_id: employee_id.to_string(),
            }
        })?;

        let rounding = self.config.rounding();
        let fiscal_year = self.config.fiscal_year_for(year, month);
        let ytd_before = self
            .store
            .ytd_before(employee_id, fiscal_year, year, month);

        let unpaid_leave = self.records.unpaid_leave_days(employee_id, year, month);
        let proration = calculate_proration(
            employee.joining_date,
            employee.exit_date,
            unpaid_leave,
            period.start_date,
            period.end_date,
            &self.config.policy().proration,
        );

        // Earnings: prorated basic, prorated allowances, overtime, manual.
        let mut earnings: Vec<EarningsItem> = Vec::new();

        let basic = rounding.apply(contract.basic_salary * proration.factor);
        earnings.push(EarningsItem {
            kind: EarningsKind::Basic,
            description: "Basic salary".to_string(),
            amount: basic,
            taxable_amount: basic,
            nssf_amount: basic,
        });

        for allowance in &contract.allowances {
            let amount = rounding.apply(allowance.amount * proration.factor);
            let treatment = allowance.allowance_type;
            earnings.push(EarningsItem {
                kind: EarningsKind::Allowance,
                description: treatment.label().to_string(),
                amount,
                taxable_amount: if treatment.taxable() { amount } else { Decimal::ZERO },
                nssf_amount: if treatment.nssf_applicable() {
                    amount
                } else {
                    Decimal::ZERO
                },
            });
        }

        let overtime_entries = self.records.approved_overtime(employee_id, year, month);
        let overtime = calculate_overtime(
            contract.basic_salary,
            &overtime_entries,
            &self.config.policy().overtime,
            rounding,
        );
        for line in &overtime.lines {
            let kind_label = match line.kind {
                OvertimeKind::Regular => "regular",
                OvertimeKind::Weekend => "weekend",
                OvertimeKind::Holiday => "holiday",
            };
            earnings.push(EarningsItem {
                kind: EarningsKind::Overtime,
                description: format!("Overtime {} ({})", line.date, kind_label),
                amount: line.amount,
                taxable_amount: line.amount,
                nssf_amount: line.amount,
            });
        }

        for manual in &overrides.additional_earnings {
            let amount = rounding.apply(manual.amount);
            earnings.push(EarningsItem {
                kind: EarningsKind::Other,
                description: manual.description.clone(),
                amount,
                taxable_amount: if manual.taxable { amount } else { Decimal::ZERO },
                nssf_amount: if manual.nssf_applicable {
                    amount
                } else {
                    Decimal::ZERO
                },
            });
        }

        let total_earnings: Decimal = earnings.iter().map(|e| e.amount).sum();
        let taxable_income: Decimal = earnings.iter().map(|e| e.taxable_amount).sum();
        let nssf_applicable_income: Decimal = earnings.iter().map(|e| e.nssf_amount).sum();

        // Statutory calculators.
        let paye = calculate_paye(taxable_income, &self.config.statutory().paye, rounding);
        let nssf_options = NssfOptions {
            declared_exemption: employee.nssf_exemption.clone(),
            age: employee.age_on(period.end_date),
            exempt_category: employee.nssf_exempt_category.clone(),
        };
        let nssf = calculate_nssf(
            nssf_applicable_income,
            &nssf_options,
            &self.config.statutory().nssf,
            rounding,
        );
        let lst = calculate_lst(
            total_earnings,
            ytd_before.gross_earnings,
            ytd_before.lst,
            self.config.remaining_fiscal_months(month),
            &self.config.statutory().lst,
            rounding,
        );

        // Deductions: statutory first, then contract, loans and manual.
        let mut deductions: Vec<DeductionItem> = Vec::new();
        if paye.total_tax > Decimal::ZERO {
            deductions.push(DeductionItem {
                description: "PAYE".to_string(),
                category: DeductionCategory::Statutory,
                amount: paye.total_tax,
                mandatory: true,
                loan: None,
            });
        }
        if nssf.employee_contribution > Decimal::ZERO {
            deductions.push(DeductionItem {
                description: "NSSF employee contribution".to_string(),
                category: DeductionCategory::Statutory,
                amount: nssf.employee_contribution,
                mandatory: true,
                loan: None,
            });
        }
        if lst.monthly_lst > Decimal::ZERO {
            deductions.push(DeductionItem {
                description: "Local service tax".to_string(),
                category: DeductionCategory::Statutory,
                amount: lst.monthly_lst,
                mandatory: true,
                loan: None,
            });
        }

        for deduction in &contract.deductions {
            // Statutory amounts are computed above, never taken from the
            // contract.
            if deduction.category == DeductionCategory::Statutory {
                continue;
            }
            deductions.push(DeductionItem {
                description: deduction.description.clone(),
                category: deduction.category,
                amount: rounding.apply(deduction.amount),
                mandatory: deduction.mandatory,
                loan: None,
            });
        }

        for loan in self.records.active_loans(employee_id) {
            deductions.push(DeductionItem {
                description: loan.description.clone(),
                category: DeductionCategory::Recovery,
                amount: rounding.apply(loan.monthly_installment),
                mandatory: true,
                loan: Some(LoanProgress {
                    loan_id: loan.loan_id.clone(),
                    installment_number: loan.installment_number,
                    total_installments: loan.total_installments,
                }),
            });
        }

        for manual in &overrides.additional_deductions {
            deductions.push(DeductionItem {
                description: manual.description.clone(),
                category: manual.category,
                amount: rounding.apply(manual.amount),
                mandatory: false,
                loan: None,
            });
        }

        let total_statutory: Decimal = deductions
            .iter()
            .filter(|d| d.category == DeductionCategory::Statutory)
            .map(|d| d.amount)
            .sum();
        let total_voluntary: Decimal = deductions
            .iter()
            .filter(|d| d.category != DeductionCategory::Statutory)
            .map(|d| d.amount)
            .sum();
        let total_deductions = total_statutory + total_voluntary;
        let gross_pay = total_earnings;
        let net_pay = gross_pay - total_deductions;

        let totals = PayrollTotals {
            total_earnings,
            gross_pay,
            taxable_income,
            nssf_applicable_income,
            total_statutory_deductions: total_statutory,
            total_voluntary_deductions: total_voluntary,
            total_deductions,
            net_pay,
        };

        // Merge this period into the YTD ledger; recalculations replace
        // the period's previous contribution.
        let contribution = PeriodContribution {
            gross_earnings: gross_pay,
            taxable_income,
            paye: paye.total_tax,
            nssf_employee: nssf.employee_contribution,
            nssf_employer: nssf.employer_contribution,
            lst: lst.monthly_lst,
            total_deductions,
            net_pay,
        };
        self.store.record_period_contribution(
            employee_id,
            fiscal_year,
            year,
            month,
            contribution.clone(),
        );
        let ytd = ytd_before.merged(&contribution);

        let now = Utc::now();
        let payroll = EmployeePayroll {
            id: existing.as_ref().map(|e| e.id).unwrap_or_else(Uuid::new_v4),
            employee_id: employee.id.clone(),
            employee_number: employee.employee_number.clone(),
            employee_name: employee.name.clone(),
            department: employee.department.clone(),
            contract_reference: contract.reference.clone(),
            payment_method: employee.payment_method.clone(),
            period,
            proration,
            earnings,
            paye,
            nssf,
            lst,
            deductions,
            totals,
            ytd,
            status: PayrollStatus::Calculated,
            version: existing.as_ref().map(|e| e.version + 1).unwrap_or(1),
            payroll_period_id: existing.as_ref().and_then(|e| e.payroll_period_id),
            created_at: existing.as_ref().map(|e| e.created_at).unwrap_or(now),
            updated_at: now,
        };

        debug!(
            employee_id = %payroll.employee_id,
            gross_pay = %payroll.totals.gross_pay,
            net_pay = %payroll.totals.net_pay,
            version = payroll.version,
            "Payroll calculated"
        );

        self.store.save_payroll(payroll.clone());
        Ok(payroll)
    }
}
