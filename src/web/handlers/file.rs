//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{UploadMeta, MAX_METADATA_FIELD_SIZE};
use crate::web::dto::{DownloadQuery, FileEntryResponse, ListResponse, OkResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::DriveError;

/// Build the Content-Disposition value offering `filename` as an attachment.
///
/// The quoted `filename` parameter is an ASCII fallback: control characters
/// are dropped and quotes, backslashes and non-ASCII characters become `_`.
/// Names that needed any of that also get an RFC 5987 `filename*`.
fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if fallback == filename {
        return format!("attachment; filename=\"{fallback}\"");
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Failed to read multipart body: {}", e);
    ApiError::bad_multipart(e.to_string())
}

/// Read a text field, failing once it grows past `limit` bytes.
async fn read_text_field(field: &mut Field<'_>, limit: u64) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (buf.len() + chunk.len()) as u64 > limit {
            tracing::warn!(
                field = field.name().unwrap_or(""),
                limit,
                "rejecting oversized form field"
            );
            return Err(DriveError::SizeLimitExceeded { limit }.into());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// GET /api/list - List stored files.
#[utoipa::path(
    get,
    path = "/api/list",
    tag = "files",
    responses(
        (status = 200, description = "Every stored file", body = ListResponse),
        (status = 500, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, ApiError> {
    let entries = state.store.list().await?;

    let files = entries.iter().map(FileEntryResponse::from).collect();

    Ok(Json(ListResponse { files }))
}

/// GET /api/download?path=<name> - Download a file.
#[utoipa::path(
    get,
    path = "/api/download",
    tag = "files",
    params(
        ("path" = String, Query, description = "File name, with or without the /u/ prefix")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Missing path parameter", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response<Body>, ApiError> {
    let raw_path = query
        .path
        .ok_or_else(|| ApiError::bad_path("Missing path parameter"))?;

    let download = match state.store.open_download(&raw_path).await {
        Ok(download) => download,
        Err(DriveError::Validation(msg)) => return Err(ApiError::bad_path(msg)),
        Err(e) => return Err(e.into()),
    };

    let disposition = attachment_disposition(download.file_name());
    let length = download.reader.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(download.reader.into_stream()))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/upload - Upload a file.
///
/// Request body: multipart/form-data. Parts carrying a file name are
/// streamed to storage under that name; the `name`, `uploader` and `ts`
/// fields are recorded as provenance once the whole body has been read.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = OkResponse),
        (status = 400, description = "Malformed body or unusable name", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<OkResponse>, ApiError> {
    let declared_len = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    state.store.check_declared_size(declared_len)?;

    // Form fields share the upload bound, each capped on its own as well
    let mut field_budget = state.store.max_upload_size();
    let mut meta = UploadMeta::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // Browsers send an empty file part when nothing was picked
            if file_name.is_empty() {
                tracing::debug!(field = %field_name, "skipping file part without a name");
                continue;
            }

            let mut session = state.store.begin_upload(&file_name, declared_len).await?;
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                session.write_chunk(&chunk).await?;
            }
            session.finish().await?;
            continue;
        }

        let value =
            read_text_field(&mut field, field_budget.min(MAX_METADATA_FIELD_SIZE)).await?;
        field_budget = field_budget.saturating_sub(value.len() as u64);
        match field_name.as_str() {
            "name" => meta.name = Some(value),
            "uploader" => meta.uploader = value,
            "ts" => meta.ts = UploadMeta::parse_ts(&value),
            other => tracing::debug!(field = %other, "ignoring unknown upload field"),
        }
    }

    let receipt = state.store.complete_upload(&meta).await?;
    if let Some(path) = &receipt.path {
        tracing::info!(
            path = %path,
            uploader = %meta.uploader,
            ts = meta.ts,
            metadata_recorded = receipt.metadata_recorded,
            "upload completed"
        );
    }

    Ok(Json(OkResponse::new()))
}
