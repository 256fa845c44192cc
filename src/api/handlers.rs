//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints and
//! the router wiring them together.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PayrollResult;

use super::request::{
    ApprovalRequest, BatchActionRequest, CalculateEmployeeRequest, CancelRequest,
    CompletePaymentRequest, CreateBatchRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/calculate", post(calculate_employee_handler))
        .route("/batches", post(create_batch_handler))
        .route("/batches/:id", get(get_batch_handler))
        .route("/batches/:id/calculate", post(calculate_batch_handler))
        .route("/batches/:id/submit", post(submit_batch_handler))
        .route("/batches/:id/approval", post(approval_handler))
        .route("/batches/:id/payments", post(process_payments_handler))
        .route(
            "/batches/:id/payments/:payment_id/complete",
            post(complete_payment_handler),
        )
        .route("/batches/:id/cancel", post(cancel_batch_handler))
        .route("/batches/:id/reverse", post(reverse_batch_handler))
        .route("/batches/:id/restart", post(restart_batch_handler))
        .route("/batches/:id/payslips", get(payslips_handler))
        .with_state(state)
}

/// Maps a JSON extraction rejection to an API error body.
fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            "MISSING_CONTENT_TYPE",
            "Content-Type must be application/json",
        ),
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Unwraps a JSON payload or renders the rejection as a 400 response.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err((
            StatusCode::BAD_REQUEST,
            Json(rejection_error(rejection, correlation_id)),
        )
            .into_response()),
    }
}

/// Renders an engine result as a JSON response or a mapped error.
fn render<T: Serialize>(result: PayrollResult<T>, correlation_id: Uuid) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(error) => {
            warn!(correlation_id = %correlation_id, error = %error, "Request failed");
            ApiErrorResponse::from(error).into_response()
        }
    }
}

/// Handler for POST /payroll/calculate.
///
/// Calculates a single employee's payroll for a period.
async fn calculate_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculateEmployeeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        year = request.year,
        month = request.month,
        "Processing employee calculation request"
    );

    let result = state.manager().engine().calculate_employee_payroll(
        &request.employee_id,
        request.year,
        request.month,
        &request.overrides,
        request.recalculate,
    );
    render(result, correlation_id)
}

/// Handler for POST /batches.
async fn create_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        correlation_id = %correlation_id,
        subsidiary = %request.subsidiary,
        year = request.year,
        month = request.month,
        "Creating payroll batch"
    );

    let scope = request.scope();
    let result =
        state
            .manager()
            .create_batch(scope, request.year, request.month, request.actor.into());
    render(result, correlation_id)
}

/// Handler for GET /batches/{id}.
async fn get_batch_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();
    render(state.manager().batch(id), correlation_id)
}

/// Handler for POST /batches/{id}/calculate.
async fn calculate_batch_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BatchActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(correlation_id = %correlation_id, batch_id = %id, "Running batch calculation");
    render(
        state.manager().calculate(id, request.actor.into()),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/submit.
async fn submit_batch_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BatchActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    render(
        state.manager().submit_for_review(id, request.actor.into()),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/approval.
async fn approval_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ApprovalRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        correlation_id = %correlation_id,
        batch_id = %id,
        action = ?request.action,
        "Processing approval action"
    );
    render(
        state.manager().approval_action(
            id,
            request.action,
            request.actor.into(),
            request.notes,
        ),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/payments.
async fn process_payments_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BatchActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    render(
        state.manager().process_payments(id, request.actor.into()),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/payments/{payment_id}/complete.
async fn complete_payment_handler(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<CompletePaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        correlation_id = %correlation_id,
        batch_id = %id,
        payment_batch_id = %payment_id,
        status = ?request.status,
        "Recording payment sub-batch outcome"
    );
    render(
        state.manager().complete_payment_batch(
            id,
            payment_id,
            request.outcome(),
            request.actor.into(),
        ),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/cancel.
async fn cancel_batch_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    render(
        state
            .manager()
            .cancel(id, request.reason, request.actor.into()),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/reverse.
async fn reverse_batch_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(correlation_id = %correlation_id, batch_id = %id, "Reversing paid batch");
    render(
        state
            .manager()
            .reverse(id, request.reason, request.actor.into()),
        correlation_id,
    )
}

/// Handler for POST /batches/{id}/restart.
async fn restart_batch_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BatchActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    render(
        state.manager().restart(id, request.actor.into()),
        correlation_id,
    )
}

/// Handler for GET /batches/{id}/payslips.
async fn payslips_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let correlation_id = Uuid::new_v4();
    render(state.manager().payslips(id), correlation_id)
}
