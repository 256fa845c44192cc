//! Property-based tests for the payroll engine's arithmetic invariants.
//!
//! These cover the properties that must hold for any input, not just the
//! statutory anchor values:
//! - PAYE is monotonic, bounded by income, and covers income exactly
//! - Net pay equals gross minus deductions for any generated record
//! - Payment partitioning preserves the batch total
//! - LST collection reconciles with the remaining liability within
//!   rounding tolerance

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::batch::partition_payments;
use payroll_engine::calculation::{
    calculate_lst, calculate_paye, LstBreakdown, NssfBreakdown, PayeBreakdown, ProrationDetail,
    RoundingPolicy,
};
use payroll_engine::config::PayrollConfig;
use payroll_engine::engine::CalculationOverrides;
use payroll_engine::models::{
    AllowanceType, Contract, ContractAllowance, Employee, EmployeePayroll, EmploymentStatus,
    PayPeriod, PaymentMethod, PayrollStatus, PayrollTotals, YtdTotals,
};
use payroll_engine::sources::{InMemoryDirectory, InMemoryRecords};
use payroll_engine::store::InMemoryStore;

fn config() -> PayrollConfig {
    PayrollConfig::uganda_defaults()
}

fn payment_method(choice: u8, bank: u8) -> PaymentMethod {
    match choice % 4 {
        0 => PaymentMethod::BankTransfer {
            bank_name: format!("Bank {}", bank % 3),
            account_number: "0140000000".to_string(),
        },
        1 => PaymentMethod::MobileMoney {
            provider: "MTN".to_string(),
            phone_number: "256772000001".to_string(),
        },
        2 => PaymentMethod::Cash,
        _ => PaymentMethod::Cheque,
    }
}

fn record_with_net(index: usize, net: i64, method: PaymentMethod) -> EmployeePayroll {
    let net = Decimal::from(net);
    EmployeePayroll {
        id: Uuid::new_v4(),
        employee_id: format!("e{}", index),
        employee_number: format!("E-{:04}", index),
        employee_name: format!("Employee {}", index),
        department: "Ops".to_string(),
        contract_reference: format!("CTR-{}", index),
        payment_method: method,
        period: PayPeriod::monthly(2025, 9).unwrap(),
        proration: ProrationDetail::full(30),
        earnings: vec![],
        paye: PayeBreakdown {
            bands: vec![],
            total_tax: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            net_paye: Decimal::ZERO,
        },
        nssf: NssfBreakdown {
            contribution_base: Decimal::ZERO,
            employee_contribution: Decimal::ZERO,
            employer_contribution: Decimal::ZERO,
            capped_at_maximum: false,
            exemption: None,
        },
        lst: LstBreakdown {
            projected_annual_income: Decimal::ZERO,
            band_lower: Decimal::ZERO,
            band_upper: None,
            annual_tax: Decimal::ZERO,
            ytd_lst_paid: Decimal::ZERO,
            remaining_lst: Decimal::ZERO,
            monthly_lst: Decimal::ZERO,
            remaining_months: 12,
        },
        deductions: vec![],
        totals: PayrollTotals {
            total_earnings: net,
            gross_pay: net,
            net_pay: net,
            ..Default::default()
        },
        ytd: YtdTotals::empty(format!("e{}", index), 2025),
        status: PayrollStatus::Calculated,
        version: 1,
        payroll_period_id: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

proptest! {
    #[test]
    fn paye_is_bounded_by_income(income in 0i64..50_000_000) {
        let config = config();
        let breakdown = calculate_paye(
            Decimal::from(income),
            &config.statutory().paye,
            RoundingPolicy::Round,
        );
        prop_assert!(breakdown.total_tax >= Decimal::ZERO);
        prop_assert!(breakdown.total_tax <= Decimal::from(income));
    }

    #[test]
    fn paye_is_monotonic(a in 0i64..50_000_000, b in 0i64..50_000_000) {
        let config = config();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let tax_lo = calculate_paye(
            Decimal::from(lo),
            &config.statutory().paye,
            RoundingPolicy::Round,
        )
        .total_tax;
        let tax_hi = calculate_paye(
            Decimal::from(hi),
            &config.statutory().paye,
            RoundingPolicy::Round,
        )
        .total_tax;
        // Per-band rounding can wobble by a unit per band.
        let tolerance = Decimal::from(config.statutory().paye.bands.len());
        prop_assert!(tax_hi + tolerance >= tax_lo);
    }

    #[test]
    fn paye_bands_cover_income_exactly(income in 1i64..50_000_000) {
        let config = config();
        let breakdown = calculate_paye(
            Decimal::from(income),
            &config.statutory().paye,
            RoundingPolicy::Round,
        );
        let covered: Decimal = breakdown.bands.iter().map(|b| b.amount_in_band).sum();
        prop_assert_eq!(covered, Decimal::from(income));
    }

    #[test]
    fn net_pay_identity_holds_for_generated_employees(
        basic in 100_000i64..30_000_000,
        housing in 0i64..5_000_000,
        medical in 0i64..2_000_000,
    ) {
        let directory = Arc::new(InMemoryDirectory::new());
        let records = Arc::new(InMemoryRecords::new());
        let store = Arc::new(InMemoryStore::new());
        let engine = payroll_engine::engine::PayrollEngine::new(
            Arc::new(config()),
            directory.clone(),
            records,
            store,
        );

        directory.insert_employee(Employee {
            id: "e1".to_string(),
            employee_number: "E-0001".to_string(),
            name: "Employee".to_string(),
            department: "Ops".to_string(),
            subsidiary: "kampala".to_string(),
            status: EmploymentStatus::Active,
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            exit_date: None,
            date_of_birth: None,
            payment_method: PaymentMethod::Cash,
            nssf_exemption: None,
            nssf_exempt_category: None,
        });
        directory.insert_contract(Contract {
            reference: "CTR-1".to_string(),
            employee_id: "e1".to_string(),
            basic_salary: Decimal::from(basic),
            allowances: vec![
                ContractAllowance {
                    allowance_type: AllowanceType::Housing,
                    amount: Decimal::from(housing),
                },
                ContractAllowance {
                    allowance_type: AllowanceType::Medical,
                    amount: Decimal::from(medical),
                },
            ],
            deductions: vec![],
            active: true,
        });

        let payroll = engine
            .calculate_employee_payroll("e1", 2025, 9, &CalculationOverrides::default(), false)
            .unwrap();

        prop_assert_eq!(
            payroll.totals.net_pay,
            payroll.totals.gross_pay - payroll.totals.total_deductions
        );
        let earnings_sum: Decimal = payroll.earnings.iter().map(|e| e.amount).sum();
        prop_assert_eq!(payroll.totals.gross_pay, earnings_sum);
        let deductions_sum: Decimal = payroll.deductions.iter().map(|d| d.amount).sum();
        prop_assert_eq!(payroll.totals.total_deductions, deductions_sum);
    }

    #[test]
    fn partitioner_preserves_totals(
        nets in prop::collection::vec((1_000i64..10_000_000, 0u8..8, 0u8..6), 0..40)
    ) {
        let records: Vec<EmployeePayroll> = nets
            .iter()
            .enumerate()
            .map(|(i, (net, method, bank))| {
                record_with_net(i, *net, payment_method(*method, *bank))
            })
            .collect();
        let expected: Decimal = records.iter().map(|r| r.totals.net_pay).sum();

        let batches = partition_payments(Uuid::new_v4(), &records, RoundingPolicy::Round);

        let total: Decimal = batches.iter().map(|b| b.total_amount).sum();
        prop_assert_eq!(total, expected);

        let line_count: usize = batches.iter().map(|b| b.lines.len()).sum();
        prop_assert_eq!(line_count, records.len());
    }

    #[test]
    fn lst_selected_band_contains_projection(
        monthly in 0i64..5_000_000,
        ytd in 0i64..40_000_000,
        paid in 0i64..100_000,
        remaining in 1u32..13,
    ) {
        let config = config();
        let breakdown = calculate_lst(
            Decimal::from(monthly),
            Decimal::from(ytd),
            Decimal::from(paid),
            remaining,
            &config.statutory().lst,
            RoundingPolicy::Round,
        );

        prop_assert!(breakdown.projected_annual_income > breakdown.band_lower
            || breakdown.band_lower == Decimal::ZERO);
        if let Some(upper) = breakdown.band_upper {
            prop_assert!(breakdown.projected_annual_income <= upper);
        }

        // Collecting monthly_lst for the remaining months reconciles with
        // the outstanding liability within rounding tolerance.
        let collected = breakdown.monthly_lst * Decimal::from(remaining);
        let diff = (collected - breakdown.remaining_lst).abs();
        prop_assert!(diff <= Decimal::from(remaining));
    }
}
