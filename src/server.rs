//! HTTP shell: multipart upload transport in front of the pipeline and
//! the remote inspection client.
//!
//! Transport failures (missing file part, malformed multipart stream)
//! surface to the caller as JSON errors and never reach the pipeline.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::inspect::InspectClient;
use crate::pipeline::Pipeline;

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Install the global tracing subscriber. Exactly one global logger
/// may exist per process: the subscriber's `tracing-log` bridge also
/// claims the `log` side, forwarding the tree-rewrite code's `log`
/// records, so nothing else may call a `log` initializer.
pub fn init_logging() {
    tracing_subscriber::fmt::init();
}

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub inspect: Arc<InspectClient>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/convert", post(convert))
        .route("/api/normalize", post(normalize))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serve until the listener fails.
#[instrument(skip(state))]
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);
    info!("docpress HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// One uploaded file: bytes plus the client-supplied or generated name.
struct Upload {
    bytes: Vec<u8>,
    filename: String,
}

/// Pull the first file field out of a multipart stream. A part without
/// a filename gets a generated one, as the original transport did.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("malformed multipart stream: {err}"))?
    {
        let is_file = field.file_name().is_some() || field.name() == Some("file");
        if !is_file {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}.docx", Uuid::new_v4()));
        let bytes = field
            .bytes()
            .await
            .map_err(|err| format!("failed to read upload: {err}"))?
            .to_vec();
        return Ok(Upload { bytes, filename });
    }
    Err("no file found in upload".to_string())
}

fn error_response(message: String) -> Response {
    warn!("request failed: {message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// `POST /api/convert` — upload a binary document, return the texts of
/// every superscript-flagged run the remote service reports.
#[instrument(skip_all)]
async fn convert(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => return error_response(message),
    };

    match state
        .inspect
        .extract_superscripts(&upload.filename, upload.bytes)
        .await
    {
        Ok(report) if report.is_empty() => {
            Json(json!({ "message": "No superscripts found." })).into_response()
        }
        Ok(report) => Json(json!({ "superscripts": report.superscripts })).into_response(),
        Err(err) => error_response(err.to_string()),
    }
}

/// `POST /api/normalize` — upload an already-converted HTML document,
/// return the canonical publication HTML.
#[instrument(skip_all)]
async fn normalize(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => return error_response(message),
    };

    let html = match String::from_utf8(upload.bytes) {
        Ok(html) => html,
        Err(_) => return error_response("uploaded document is not UTF-8 HTML".to_string()),
    };

    match state.pipeline.run(&html) {
        Ok(normalized) => Json(json!({ "html": normalized })).into_response(),
        Err(err) => error_response(err.to_string()),
    }
}
