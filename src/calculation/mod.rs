//! Statutory tax and pay calculation for the payroll engine.
//!
//! This module contains the pure calculation functions: progressive PAYE,
//! capped NSSF contributions, projected-annual LST, partial-period
//! proration, overtime pricing, and the shared currency rounding policy.
//! None of these functions perform I/O; configuration is passed in
//! explicitly.

mod lst;
mod nssf;
mod overtime;
mod paye;
mod proration;
mod rounding;

pub use lst::{calculate_lst, LstBreakdown};
pub use nssf::{calculate_nssf, NssfBreakdown, NssfExemption, NssfOptions};
pub use overtime::{
    calculate_overtime, OvertimeEntry, OvertimeKind, OvertimeLine, OvertimeResult,
};
pub use paye::{calculate_paye, PayeBandDetail, PayeBreakdown};
pub use proration::{calculate_proration, ProrationDetail, ProrationReason};
pub use rounding::{clamp_non_negative, RoundingPolicy};
