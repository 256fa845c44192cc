//! Response types for the payroll engine API.
//!
//! This module defines the error response structures and the mapping
//! from engine errors to HTTP status codes and stable error codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        let (status, code) = match &error {
            PayrollError::ConfigNotFound { .. } | PayrollError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            PayrollError::EmployeeNotFound { .. } => (StatusCode::NOT_FOUND, "EMPLOYEE_NOT_FOUND"),
            PayrollError::BatchNotFound { .. } => (StatusCode::NOT_FOUND, "BATCH_NOT_FOUND"),
            PayrollError::PaymentBatchNotFound { .. } => {
                (StatusCode::NOT_FOUND, "PAYMENT_BATCH_NOT_FOUND")
            }
            PayrollError::InvalidEmploymentStatus { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_EMPLOYMENT_STATUS")
            }
            PayrollError::NoActiveContract { .. } => {
                (StatusCode::BAD_REQUEST, "NO_ACTIVE_CONTRACT")
            }
            PayrollError::AlreadyCalculated { .. } => (StatusCode::CONFLICT, "ALREADY_CALCULATED"),
            PayrollError::ImmutablePayroll { .. } => (StatusCode::CONFLICT, "IMMUTABLE_PAYROLL"),
            PayrollError::InvalidStatusTransition { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATUS_TRANSITION")
            }
            PayrollError::HasCalculationErrors { .. } => {
                (StatusCode::CONFLICT, "HAS_CALCULATION_ERRORS")
            }
            PayrollError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
            PayrollError::ConcurrentModification { .. } => {
                (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION")
            }
            PayrollError::CalculationError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CALCULATION_ERROR")
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError::new(code, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Skipped when None.
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error = PayrollError::EmployeeNotFound {
            employee_id: "missing".to_string(),
        };
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "EMPLOYEE_NOT_FOUND");
    }

    #[test]
    fn test_workflow_errors_map_to_409() {
        let error = PayrollError::InvalidStatusTransition {
            from: "draft".to_string(),
            to: "approved".to_string(),
        };
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "INVALID_STATUS_TRANSITION");

        let error = PayrollError::ConcurrentModification {
            batch_id: "b".to_string(),
            expected: 1,
            found: 2,
        };
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_precondition_errors_map_to_400() {
        let error = PayrollError::NoActiveContract {
            employee_id: "e1".to_string(),
        };
        let response: ApiErrorResponse = error.into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
