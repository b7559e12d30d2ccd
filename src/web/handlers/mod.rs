//! API handlers for the Web API.

pub mod file;
pub mod health;

pub use file::*;
pub use health::*;

use std::sync::Arc;

use crate::file::FileStore;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The file store every endpoint works against.
    pub store: Arc<FileStore>,
    /// Service name reported by the health endpoint.
    pub service_name: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: FileStore, service_name: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            service_name: service_name.into(),
        }
    }
}
