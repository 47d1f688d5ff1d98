//! Route definitions for the webhook entry point.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at `/webhook`.
///
/// ```text
/// POST   /webhook    -> receive_webhook
/// GET    /webhook    -> webhook_info
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/webhook",
        post(webhook::receive_webhook).get(webhook::webhook_info),
    )
}
