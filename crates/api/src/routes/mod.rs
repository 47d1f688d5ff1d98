pub mod health;
pub mod runs;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /hello-world      GET  trigger a demo run
///                   POST stream run status (SSE)
/// /webhook          POST trigger a run from an external payload
///                   GET  usage documentation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(runs::router()).merge(webhook::router())
}
