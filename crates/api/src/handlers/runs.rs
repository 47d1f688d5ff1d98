//! Handlers for the demo task endpoint: trigger + realtime stream.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use runbeam_core::JobHandle;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body of a successful trigger call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub task_id: String,
    pub message: String,
    pub status: &'static str,
}

/// Request body for opening a status stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    #[serde(default)]
    pub task_id: Option<String>,
}

/// GET /api/v1/hello-world
///
/// Triggers a new run of the configured task with the configured payload
/// and returns the handle to stream its status.
pub async fn trigger_run(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let payload = serde_json::Value::String(state.config.trigger_payload.clone());
    let handle = state.backend.trigger(&state.config.task_name, payload).await?;

    tracing::info!(
        task = %state.config.task_name,
        run_id = %handle,
        "Run triggered",
    );

    Ok(Json(TriggerResponse {
        task_id: handle.to_string(),
        message: "Task triggered successfully. Stream the run status for updates.".to_string(),
        status: "triggered",
    }))
}

/// POST /api/v1/hello-world
///
/// Opens the realtime status stream for a previously triggered run.
/// The response is a `text/event-stream` body that ends right after the
/// terminal status frame. Returns 400 if the task id is missing or
/// malformed, or if no subscription can be opened for it.
pub async fn stream_run(
    State(state): State<AppState>,
    Json(input): Json<StreamRequest>,
) -> AppResult<Response> {
    let raw = input
        .task_id
        .ok_or_else(|| AppError::BadRequest("Task ID required".into()))?;
    let handle = JobHandle::parse(raw)?;

    let stream = state.publisher.open(&handle).await?;
    tracing::info!(run_id = %handle, "Relay stream opened");

    let body = Body::from_stream(stream.map(Ok::<_, Infallible>));
    Response::builder()
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
