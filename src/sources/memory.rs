//! In-memory data sources.
//!
//! Hash-map backed implementations of the directory and period-records
//! traits. These serve the bundled API state and double as test fixtures.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::calculation::OvertimeEntry;
use crate::models::{Contract, Employee, LoanRecovery};

use super::{EmployeeDirectory, PeriodRecordsSource};

/// An in-memory employee/contract directory.
#[derive(Debug)]
pub struct InMemoryDirectory {
    employees: RwLock<HashMap<String, Employee>>,
    contracts: RwLock<HashMap<String, Contract>>,
    chunk_size: usize,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    /// Creates an empty directory with the default query chunk size.
    pub fn new() -> Self {
        Self {
            employees: RwLock::new(HashMap::new()),
            contracts: RwLock::new(HashMap::new()),
            chunk_size: 100,
        }
    }

    /// Creates an empty directory with a specific query chunk size.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            ..Self::new()
        }
    }

    /// Adds or replaces an employee.
    pub fn insert_employee(&self, employee: Employee) {
        self.employees
            .write()
            .expect("directory lock poisoned")
            .insert(employee.id.clone(), employee);
    }

    /// Adds or replaces an employee's active contract.
    pub fn insert_contract(&self, contract: Contract) {
        self.contracts
            .write()
            .expect("directory lock poisoned")
            .insert(contract.employee_id.clone(), contract);
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn employee(&self, employee_id: &str) -> Option<Employee> {
        self.employees
            .read()
            .expect("directory lock poisoned")
            .get(employee_id)
            .cloned()
    }

    fn employees_by_ids(&self, ids: &[String]) -> Vec<Employee> {
        let employees = self.employees.read().expect("directory lock poisoned");
        ids.iter().filter_map(|id| employees.get(id).cloned()).collect()
    }

    fn active_employees(&self, subsidiary: &str, department: Option<&str>) -> Vec<Employee> {
        let employees = self.employees.read().expect("directory lock poisoned");
        let mut result: Vec<Employee> = employees
            .values()
            .filter(|e| e.subsidiary == subsidiary)
            .filter(|e| e.status.is_payable())
            .filter(|e| department.is_none_or(|d| e.department == d))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    fn active_contract(&self, employee_id: &str) -> Option<Contract> {
        self.contracts
            .read()
            .expect("directory lock poisoned")
            .get(employee_id)
            .filter(|c| c.active)
            .cloned()
    }

    fn query_chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// In-memory overtime, leave and loan records.
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    overtime: RwLock<HashMap<(String, i32, u32), Vec<OvertimeEntry>>>,
    unpaid_leave: RwLock<HashMap<(String, i32, u32), u32>>,
    loans: RwLock<HashMap<String, Vec<LoanRecovery>>>,
}

impl InMemoryRecords {
    /// Creates an empty records source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records approved overtime for an employee in a period.
    pub fn insert_overtime(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        entries: Vec<OvertimeEntry>,
    ) {
        self.overtime
            .write()
            .expect("records lock poisoned")
            .insert((employee_id.to_string(), year, month), entries);
    }

    /// Records unpaid leave days for an employee in a period.
    pub fn insert_unpaid_leave(&self, employee_id: &str, year: i32, month: u32, days: u32) {
        self.unpaid_leave
            .write()
            .expect("records lock poisoned")
            .insert((employee_id.to_string(), year, month), days);
    }

    /// Records an active loan recovery for an employee.
    pub fn insert_loan(&self, employee_id: &str, loan: LoanRecovery) {
        self.loans
            .write()
            .expect("records lock poisoned")
            .entry(employee_id.to_string())
            .or_default()
            .push(loan);
    }
}

impl PeriodRecordsSource for InMemoryRecords {
    fn approved_overtime(&self, employee_id: &str, year: i32, month: u32) -> Vec<OvertimeEntry> {
        self.overtime
            .read()
            .expect("records lock poisoned")
            .get(&(employee_id.to_string(), year, month))
            .cloned()
            .unwrap_or_default()
    }

    fn unpaid_leave_days(&self, employee_id: &str, year: i32, month: u32) -> u32 {
        self.unpaid_leave
            .read()
            .expect("records lock poisoned")
            .get(&(employee_id.to_string(), year, month))
            .copied()
            .unwrap_or(0)
    }

    fn active_loans(&self, employee_id: &str) -> Vec<LoanRecovery> {
        self.loans
            .read()
            .expect("records lock poisoned")
            .get(employee_id)
            .cloned()
            .unwrap_or_default()
    }
}
