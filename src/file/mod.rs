//! File management module for NexoDrive.
//!
//! This module provides the shared drop folder:
//! - Canonical naming of uploads into one flat namespace
//! - Blob storage with streamed writes and reads
//! - A JSON ledger of upload provenance (timestamp, uploader)
//! - The file store tying them together

mod ledger;
mod name;
mod service;
mod storage;

pub use ledger::{Ledger, LedgerEntry, MetadataLedger};
pub use name::{basename, normalize, CanonicalPath};
pub use service::{Download, FileEntry, FileStore, UploadMeta, UploadReceipt, UploadSession};
pub use storage::{BlobInfo, BlobReader, BlobWriter, FileStorage};

/// Namespace root of every canonical path.
pub const NAMESPACE_ROOT: &str = "/u";

/// Directory under the storage root that holds the blobs.
pub const NAMESPACE_DIR: &str = "u";

/// Ledger document name under the storage root.
pub const LEDGER_DOCUMENT: &str = "meta.json";

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum size of one text field (`name`, `uploader`, `ts`) in an upload form.
pub const MAX_METADATA_FIELD_SIZE: u64 = 1024;
