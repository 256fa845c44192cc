//! Payment partitioning.
//!
//! After approval a batch's payroll records are grouped into payment
//! sub-batches: first by payment method, and bank transfers further by
//! bank name. Each group carries reconciliation totals and the transfer
//! line items consumed by file export. The grouping is deterministic and
//! total-preserving: the sub-batch totals sum to the batch's total net
//! pay (within rounding tolerance).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::RoundingPolicy;
use crate::models::{
    EmployeePayroll, PaymentBatch, PaymentBatchStatus, PaymentMethod, PaymentMethodKind,
    TransferLineItem,
};

fn method_kind(method: &PaymentMethod) -> PaymentMethodKind {
    match method {
        PaymentMethod::BankTransfer { .. } => PaymentMethodKind::BankTransfer,
        PaymentMethod::MobileMoney { .. } => PaymentMethodKind::MobileMoney,
        PaymentMethod::Cash => PaymentMethodKind::Cash,
        PaymentMethod::Cheque => PaymentMethodKind::Cheque,
    }
}

fn bank_name(method: &PaymentMethod) -> Option<String> {
    match method {
        PaymentMethod::BankTransfer { bank_name, .. } => Some(bank_name.clone()),
        _ => None,
    }
}

/// Groups a batch's payroll records into payment sub-batches.
///
/// Ordering is deterministic: method order (bank transfer, mobile money,
/// cash, cheque), then bank name for bank transfers. Payment references
/// are derived from the batch id and employee number.
pub fn partition_payments(
    batch_id: Uuid,
    payrolls: &[EmployeePayroll],
    rounding: RoundingPolicy,
) -> Vec<PaymentBatch> {
    let mut groups: BTreeMap<(PaymentMethodKind, Option<String>), Vec<&EmployeePayroll>> =
        BTreeMap::new();
    for payroll in payrolls {
        let key = (
            method_kind(&payroll.payment_method),
            bank_name(&payroll.payment_method),
        );
        groups.entry(key).or_default().push(payroll);
    }

    groups
        .into_iter()
        .map(|((method, bank), members)| {
            let lines: Vec<TransferLineItem> = members
                .iter()
                .map(|p| TransferLineItem {
                    employee_id: p.employee_id.clone(),
                    employee_name: p.employee_name.clone(),
                    account: p.payment_method.account().map(str::to_string),
                    amount: p.totals.net_pay,
                    reference: format!("PAY-{}-{}", batch_id.simple(), p.employee_number),
                })
                .collect();
            let total: Decimal = lines.iter().map(|l| l.amount).sum();

            PaymentBatch {
                id: Uuid::new_v4(),
                method,
                bank_name: bank,
                payroll_ids: members.iter().map(|p| p.id).collect(),
                employee_count: members.len(),
                total_amount: rounding.apply(total),
                status: PaymentBatchStatus::Pending,
                lines,
                processed_count: 0,
                failed_employee_ids: Vec::new(),
                external_reference: None,
            }
        })
        .collect()
}
