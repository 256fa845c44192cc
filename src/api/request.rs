//! Request types for the payroll engine API.
//!
//! DTOs deserialized from request bodies, with conversions into the
//! domain types the engine and batch manager consume.

use serde::Deserialize;

use crate::engine::CalculationOverrides;
use crate::models::{
    Actor, ApprovalAction, BatchScope, PaymentBatchStatus, PaymentOutcome,
};

/// The acting user on a lifecycle request.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorRequest {
    /// Opaque actor identifier.
    pub id: String,
    /// Display name for audit trails.
    pub name: String,
}

impl From<ActorRequest> for Actor {
    fn from(request: ActorRequest) -> Self {
        Actor {
            id: request.id,
            name: request.name,
        }
    }
}

/// Request body for POST /payroll/calculate.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateEmployeeRequest {
    /// The employee to calculate.
    pub employee_id: String,
    /// Pay period year.
    pub year: i32,
    /// Pay period month (1-12).
    pub month: u32,
    /// Whether to replace an existing record for the period.
    #[serde(default)]
    pub recalculate: bool,
    /// Manual earnings/deductions overrides.
    #[serde(default)]
    pub overrides: CalculationOverrides,
}

/// Request body for POST /batches.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatchRequest {
    /// The subsidiary being paid.
    pub subsidiary: String,
    /// Optional department filter.
    #[serde(default)]
    pub department: Option<String>,
    /// Explicit employee list; omitted means all active in scope.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
    /// Pay period year.
    pub year: i32,
    /// Pay period month (1-12).
    pub month: u32,
    /// The acting user.
    pub actor: ActorRequest,
}

impl CreateBatchRequest {
    /// Extracts the batch scope from the request.
    pub fn scope(&self) -> BatchScope {
        BatchScope {
            subsidiary: self.subsidiary.clone(),
            department: self.department.clone(),
            employee_ids: self.employee_ids.clone(),
        }
    }
}

/// Request body for batch operations that only need an actor.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchActionRequest {
    /// The acting user.
    pub actor: ActorRequest,
}

/// Request body for POST /batches/{id}/approval.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequest {
    /// The approval action to apply.
    pub action: ApprovalAction,
    /// The acting approver.
    pub actor: ActorRequest,
    /// Free-form notes recorded on the audit trail.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for POST /batches/{id}/cancel.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    /// Why the batch is being cancelled.
    pub reason: String,
    /// The acting user.
    pub actor: ActorRequest,
}

/// Request body for POST /batches/{id}/payments/{payment_id}/complete.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletePaymentRequest {
    /// The sub-batch outcome (completed, failed or partial).
    pub status: PaymentBatchStatus,
    /// How many lines were processed successfully.
    pub processed_count: usize,
    /// Employees whose payment failed.
    #[serde(default)]
    pub failed_employee_ids: Vec<String>,
    /// External (bank/provider) reference.
    #[serde(default)]
    pub external_reference: Option<String>,
    /// The acting user.
    pub actor: ActorRequest,
}

impl CompletePaymentRequest {
    /// Extracts the payment outcome from the request.
    pub fn outcome(&self) -> PaymentOutcome {
        PaymentOutcome {
            status: self.status,
            processed_count: self.processed_count,
            failed_employee_ids: self.failed_employee_ids.clone(),
            external_reference: self.external_reference.clone(),
        }
    }
}
