use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Response, StatusCode},
    routing::get,
};
use chrono::Utc;

use crate::AppState;

pub fn download_routes() -> Router<Arc<AppState>> {
    Router::new().route("/results/download", get(download_handler))
}

/// Pass-through export of the stored detection result: pretty-printed JSON,
/// filename stamped with the current date.
async fn download_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, (StatusCode, String)> {
    let result = state.pipeline.session().result().ok_or((
        StatusCode::NOT_FOUND,
        "no detection result available".to_string(),
    ))?;

    let body = serde_json::to_string_pretty(&result).map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to serialize detection result: {err}"),
        )
    })?;

    let filename = format!("detection_results_{}.json", Utc::now().format("%Y-%m-%d"));
    Response::builder()
        .header(
            "Content-Disposition",
            format!("attachment;filename={filename}"),
        )
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|err| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error in sending response {err}"),
            )
        })
}
