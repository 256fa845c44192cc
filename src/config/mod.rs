//! Configuration for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures for
//! statutory tables (PAYE bands, NSSF rates, LST bands) and payroll policy
//! (proration basis, overtime multipliers, approval thresholds), along with
//! the [`ConfigLoader`] for reading them from YAML files.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ApprovalPolicy, LstBand, LstConfig, NssfConfig, OvertimePolicy, PayeBand, PayeConfig,
    PayrollConfig, PolicyConfig, ProrationBasis, ProrationPolicy, StatutoryConfig,
};
