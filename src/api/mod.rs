//! HTTP API for the payroll engine.
//!
//! This module provides the axum router, request/response types and
//! shared application state for serving the engine over HTTP.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
