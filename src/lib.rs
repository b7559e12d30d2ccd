//! NexoDrive - a small self-hosted file drive.
//!
//! Files live in a flat namespace under `/u/`. A JSON ledger next to them
//! records who uploaded each file and when, and an HTTP dispatcher exposes
//! upload, listing and download.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{DriveError, Result};
pub use file::{
    basename, normalize, CanonicalPath, Download, FileEntry, FileStore, Ledger, LedgerEntry,
    MetadataLedger, UploadMeta, UploadReceipt, UploadSession,
};
pub use web::WebServer;
