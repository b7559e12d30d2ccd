//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::FileEntry;

/// Plain success acknowledgement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

impl OkResponse {
    /// Create a success acknowledgement.
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `true`.
    pub ok: bool,
    /// Service name.
    #[schema(example = "NexoDrive")]
    pub role: String,
}

/// One file in a listing.
///
/// Files without recorded provenance report `ts = 0` and `uploader = ""`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileEntryResponse {
    /// Canonical path.
    #[schema(example = "/u/report.pdf")]
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload timestamp as sent by the uploader.
    pub ts: u64,
    /// Uploader label.
    pub uploader: String,
}

impl From<&FileEntry> for FileEntryResponse {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.path.to_string(),
            size: entry.size,
            ts: entry.ts(),
            uploader: entry.uploader().to_string(),
        }
    }
}

/// Directory listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse {
    /// Files, in storage enumeration order.
    pub files: Vec<FileEntryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{normalize, LedgerEntry};

    #[test]
    fn test_entry_with_provenance() {
        let entry = FileEntry {
            path: normalize("report.pdf").unwrap(),
            size: 12,
            provenance: Some(LedgerEntry::new(1_700_000_000, "alice")),
        };

        let json = serde_json::to_value(FileEntryResponse::from(&entry)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "/u/report.pdf",
                "size": 12,
                "ts": 1_700_000_000u64,
                "uploader": "alice"
            })
        );
    }

    #[test]
    fn test_entry_without_provenance() {
        let entry = FileEntry {
            path: normalize("x.bin").unwrap(),
            size: 0,
            provenance: None,
        };

        let response = FileEntryResponse::from(&entry);
        assert_eq!(response.ts, 0);
        assert_eq!(response.uploader, "");
    }

    #[test]
    fn test_ok_response_serialize() {
        let json = serde_json::to_string(&OkResponse::new()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);
    }
}
