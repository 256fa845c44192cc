//! Statutory Payroll Calculation & Batch Lifecycle Engine.
//!
//! This crate computes statutory-compliant payroll (PAYE, NSSF and LST) for
//! individual employees and drives a multi-stage approval and payment
//! workflow across a batch of employees for one pay period.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod sources;
pub mod store;
