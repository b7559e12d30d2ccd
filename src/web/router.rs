//! Router configuration for the NexoDrive dispatcher.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::dto::{FileEntryResponse, HealthResponse, ListResponse, OkResponse, UploadForm};
use super::error::ErrorBody;
use super::handlers::{self, download_file, health_check, list_files, upload_file, AppState};
use super::middleware::create_cors_layer;
use crate::config::WebConfig;

/// OpenAPI document for the dispatcher.
#[derive(OpenApi)]
#[openapi(
    info(title = "NexoDrive API", description = "Embedded file drive"),
    paths(
        handlers::health::health_check,
        handlers::file::list_files,
        handlers::file::download_file,
        handlers::file::upload_file
    ),
    components(schemas(
        OkResponse,
        HealthResponse,
        FileEntryResponse,
        ListResponse,
        UploadForm,
        ErrorBody
    )),
    tags(
        (name = "service", description = "Liveness"),
        (name = "files", description = "Upload, list and download")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    // The upload handler enforces its own bound while streaming
    let api_routes = Router::new()
        .route("/list", get(list_files))
        .route("/download", get(download_file))
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins)),
        )
        .with_state(app_state)
}

/// Create the router serving the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

/// Create a router serving the browser UI from `static_path`.
///
/// Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let path = Path::new(static_path);
    if !path.is_dir() {
        tracing::warn!(
            "Static directory not found: {}. Static file serving disabled.",
            static_path
        );
        return None;
    }

    tracing::info!("Serving static files from: {}", static_path);
    let service = ServeDir::new(path).append_index_html_on_directories(true);

    Some(Router::new().fallback_service(service))
}
