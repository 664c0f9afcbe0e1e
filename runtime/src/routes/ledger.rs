use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
};
use tokio::fs;
use tracing::info;

use super::types::{IngestResponse, StatusResponse};
use crate::{AppState, pipeline::IngestError};

pub fn ledger_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ledger/upload", post(upload_ledger))
        .route("/ledger/status", get(session_status))
}

/// The three-state ingestion result presentation polls while an upload is in
/// flight.
async fn session_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.pipeline.session().snapshot();
    Json(StatusResponse {
        phase: snapshot.phase,
        loading: snapshot.loading,
        error: snapshot.error,
        ledger_id: snapshot.ledger_id,
        summary: snapshot.summary,
    })
}

async fn upload_ledger(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, (StatusCode, String)> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut original_filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid multipart payload: {err}"),
        )
    })? {
        if field.name() == Some("file") {
            original_filename = field.file_name().map(|name| name.to_string());
            let data = field.bytes().await.map_err(|err| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("failed to read upload field: {err}"),
                )
            })?;
            file_bytes = Some(data.to_vec());
            break;
        }
    }

    let file_bytes = file_bytes.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "missing file field in multipart payload".to_string(),
        )
    })?;

    let original_filename = original_filename.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "uploaded file missing filename".to_string(),
        )
    })?;

    let manager = state.pipeline.ledger_manager();

    let safe_filename = manager
        .sanitize_filename(&original_filename)
        .map_err(|err| {
            (
                StatusCode::BAD_REQUEST,
                format!("invalid filename '{}': {err}", original_filename),
            )
        })?;

    if !manager.is_supported_file(&safe_filename) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "unsupported file type. supported types: {:?}",
                crate::SUPPORTED_EXTENSIONS
            ),
        ));
    }

    let file_path = manager.destination_for(&safe_filename);
    fs::write(&file_path, &file_bytes).await.map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to persist uploaded file: {err}"),
        )
    })?;

    let report = state
        .pipeline
        .ingest_file(&file_path, None)
        .await
        .map_err(|err| (error_status(&err), err.to_string()))?;

    info!(filename = %safe_filename, track_id = %report.track_id, "ledger uploaded and ingested");

    Ok(Json(IngestResponse {
        status: "success".to_string(),
        message: format!(
            "Ledger '{}' processed: {} transactions analyzed.",
            safe_filename, report.transactions
        ),
        track_id: report.track_id,
        ledger_id: report.ledger_id,
        transactions: report.transactions,
        summary: report.summary,
    }))
}

fn error_status(err: &IngestError) -> StatusCode {
    match err {
        IngestError::InvalidFileType(_) | IngestError::Ledger(_) => StatusCode::BAD_REQUEST,
        IngestError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        IngestError::Upload(_) => StatusCode::BAD_GATEWAY,
    }
}
