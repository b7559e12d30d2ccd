//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Query string of `GET /api/download`.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    /// Requested file, with or without the `/u/` prefix.
    #[serde(default)]
    pub path: Option<String>,
}

/// Multipart form accepted by `POST /api/upload`.
///
/// Only used to document the endpoint; the handler reads the parts as they
/// stream in.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File content. The part's file name picks the stored name.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Logical file name the provenance is recorded under.
    pub name: Option<String>,
    /// Uploader label.
    pub uploader: Option<String>,
    /// Upload timestamp as a decimal integer.
    #[schema(example = "1700000000000")]
    pub ts: Option<String>,
}
