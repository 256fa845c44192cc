//! In-memory document store.
//!
//! Hash-map backed implementation of [`PayrollStore`] used by the bundled
//! API state and as the test fixture. All maps sit behind one `RwLock`
//! per collection; the YTD ledger lock serializes read-modify-write per
//! key.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{BatchStatus, EmployeePayroll, PayrollBatch, PeriodContribution, YtdTotals};

use super::PayrollStore;

/// An in-memory [`PayrollStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    payrolls: RwLock<HashMap<Uuid, EmployeePayroll>>,
    payroll_index: RwLock<HashMap<(String, i32, u32), Uuid>>,
    batches: RwLock<HashMap<Uuid, PayrollBatch>>,
    // (employee, fiscal year) -> (year, month) -> contribution
    ytd: RwLock<HashMap<(String, i32), BTreeMap<(i32, u32), PeriodContribution>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayrollStore for InMemoryStore {
    fn payroll(&self, employee_id: &str, year: i32, month: u32) -> Option<EmployeePayroll> {
        let index = self.payroll_index.read().expect("store lock poisoned");
        let id = index.get(&(employee_id.to_string(), year, month))?;
        self.payrolls
            .read()
            .expect("store lock poisoned")
            .get(id)
            .cloned()
    }

    fn payroll_by_id(&self, id: Uuid) -> Option<EmployeePayroll> {
        self.payrolls
            .read()
            .expect("store lock poisoned")
            .get(&id)
            .cloned()
    }

    fn save_payroll(&self, payroll: EmployeePayroll) {
        let key = (
            payroll.employee_id.clone(),
            payroll.period.year,
            payroll.period.month,
        );
        self.payroll_index
            .write()
            .expect("store lock poisoned")
            .insert(key, payroll.id);
        self.payrolls
            .write()
            .expect("store lock poisoned")
            .insert(payroll.id, payroll);
    }

    fn payrolls_by_batch(&self, batch_id: Uuid) -> Vec<EmployeePayroll> {
        let payrolls = self.payrolls.read().expect("store lock poisoned");
        let mut result: Vec<EmployeePayroll> = payrolls
            .values()
            .filter(|p| p.payroll_period_id == Some(batch_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        result
    }

    fn batch(&self, batch_id: Uuid) -> Option<PayrollBatch> {
        self.batches
            .read()
            .expect("store lock poisoned")
            .get(&batch_id)
            .cloned()
    }

    fn insert_batch(&self, batch: PayrollBatch) {
        self.batches
            .write()
            .expect("store lock poisoned")
            .insert(batch.id, batch);
    }

    fn save_batch(&self, mut batch: PayrollBatch) -> PayrollResult<PayrollBatch> {
        let mut batches = self.batches.write().expect("store lock poisoned");
        let stored = batches
            .get(&batch.id)
            .ok_or_else(|| PayrollError::BatchNotFound {
                batch_id: batch.id.to_string(),
            })?;

        if stored.version != batch.version {
            return Err(PayrollError::ConcurrentModification {
                batch_id: batch.id.to_string(),
                expected: batch.version,
                found: stored.version,
            });
        }

        batch.version += 1;
        batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    fn batches_by_period(&self, subsidiary: &str, year: i32, month: u32) -> Vec<PayrollBatch> {
        let batches = self.batches.read().expect("store lock poisoned");
        let mut result: Vec<PayrollBatch> = batches
            .values()
            .filter(|b| b.scope.subsidiary == subsidiary && b.year == year && b.month == month)
            .cloned()
            .collect();
        result.sort_by_key(|b| b.created_at);
        result
    }

    fn batches_by_status(&self, statuses: &[BatchStatus]) -> Vec<PayrollBatch> {
        let batches = self.batches.read().expect("store lock poisoned");
        let mut result: Vec<PayrollBatch> = batches
            .values()
            .filter(|b| statuses.contains(&b.status))
            .cloned()
            .collect();
        result.sort_by_key(|b| b.created_at);
        result
    }

    fn ytd_before(
        &self,
        employee_id: &str,
        fiscal_year: i32,
        year: i32,
        month: u32,
    ) -> YtdTotals {
        let ledger = self.ytd.read().expect("store lock poisoned");
        let mut totals = YtdTotals::empty(employee_id, fiscal_year);
        if let Some(periods) = ledger.get(&(employee_id.to_string(), fiscal_year)) {
            for (period, contribution) in periods {
                if *period != (year, month) {
                    totals = totals.merged(contribution);
                }
            }
        }
        totals
    }

    fn record_period_contribution(
        &self,
        employee_id: &str,
        fiscal_year: i32,
        year: i32,
        month: u32,
        contribution: PeriodContribution,
    ) {
        self.ytd
            .write()
            .expect("store lock poisoned")
            .entry((employee_id.to_string(), fiscal_year))
            .or_default()
            .insert((year, month), contribution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, BatchScope};
    use rust_decimal::Decimal;

    fn test_batch() -> PayrollBatch {
        PayrollBatch::new(
            BatchScope {
                subsidiary: "kampala".to_string(),
                department: None,
                employee_ids: None,
            },
            2025,
            9,
            Actor {
                id: "usr_1".to_string(),
                name: "Okello Sam".to_string(),
            },
        )
    }

    #[test]
    fn test_save_batch_increments_version() {
        let store = InMemoryStore::new();
        let batch = test_batch();
        store.insert_batch(batch.clone());

        let saved = store.save_batch(batch).unwrap();
        assert_eq!(saved.version, 1);

        let saved = store.save_batch(saved).unwrap();
        assert_eq!(saved.version, 2);
    }

    #[test]
    fn test_stale_save_fails_with_concurrent_modification() {
        let store = InMemoryStore::new();
        let batch = test_batch();
        store.insert_batch(batch.clone());

        // First writer wins.
        let _fresh = store.save_batch(batch.clone()).unwrap();

        // Second writer still holds version 0.
        match store.save_batch(batch) {
            Err(PayrollError::ConcurrentModification {
                expected, found, ..
            }) => {
                assert_eq!(expected, 0);
                assert_eq!(found, 1);
            }
            other => panic!("Expected ConcurrentModification, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_save_unknown_batch_fails() {
        let store = InMemoryStore::new();
        let batch = test_batch();
        assert!(matches!(
            store.save_batch(batch),
            Err(PayrollError::BatchNotFound { .. })
        ));
    }

    #[test]
    fn test_ytd_ledger_excludes_current_period() {
        let store = InMemoryStore::new();
        let contribution = |gross: i64| PeriodContribution {
            gross_earnings: Decimal::from(gross),
            ..Default::default()
        };

        store.record_period_contribution("e1", 2025, 2025, 7, contribution(1_000_000));
        store.record_period_contribution("e1", 2025, 2025, 8, contribution(1_000_000));
        store.record_period_contribution("e1", 2025, 2025, 9, contribution(1_000_000));

        let before_september = store.ytd_before("e1", 2025, 2025, 9);
        assert_eq!(before_september.gross_earnings, Decimal::from(2_000_000));
        assert_eq!(before_september.periods, 2);

        let before_october = store.ytd_before("e1", 2025, 2025, 10);
        assert_eq!(before_october.gross_earnings, Decimal::from(3_000_000));
    }

    #[test]
    fn test_recalculation_replaces_period_contribution() {
        let store = InMemoryStore::new();
        let contribution = |gross: i64| PeriodContribution {
            gross_earnings: Decimal::from(gross),
            ..Default::default()
        };

        store.record_period_contribution("e1", 2025, 2025, 7, contribution(1_000_000));
        store.record_period_contribution("e1", 2025, 2025, 7, contribution(1_200_000));

        let ytd = store.ytd_before("e1", 2025, 2025, 8);
        assert_eq!(ytd.gross_earnings, Decimal::from(1_200_000));
        assert_eq!(ytd.periods, 1);
    }

    #[test]
    fn test_ytd_empty_for_unknown_employee() {
        let store = InMemoryStore::new();
        let ytd = store.ytd_before("ghost", 2025, 2025, 9);
        assert_eq!(ytd.gross_earnings, Decimal::ZERO);
        assert_eq!(ytd.periods, 0);
    }

    #[test]
    fn test_batches_by_period_and_status() {
        let store = InMemoryStore::new();
        let batch = test_batch();
        store.insert_batch(batch.clone());

        assert_eq!(store.batches_by_period("kampala", 2025, 9).len(), 1);
        assert_eq!(store.batches_by_period("gulu", 2025, 9).len(), 0);
        assert_eq!(store.batches_by_status(&[BatchStatus::Draft]).len(), 1);
        assert_eq!(store.batches_by_status(&[BatchStatus::Paid]).len(), 0);
    }
}
