//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::batch::BatchManager;

/// Shared application state.
///
/// Wraps the batch manager (and through it the calculation engine and
/// store) for use by all request handlers.
#[derive(Clone)]
pub struct AppState {
    manager: Arc<BatchManager>,
}

impl AppState {
    /// Creates a new application state around a batch manager.
    pub fn new(manager: BatchManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    /// Returns the batch manager.
    pub fn manager(&self) -> &BatchManager {
        &self.manager
    }
}
