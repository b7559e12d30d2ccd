//! Web API module for NexoDrive.
//!
//! Serves the upload, listing and download endpoints over HTTP, plus an
//! optional static browser UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
