//! Route definitions for the demo task endpoint.
//!
//! GET triggers a new run; POST on the same path opens the realtime
//! status stream for a previously triggered run.

use axum::routing::get;
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/hello-world`.
///
/// ```text
/// GET    /hello-world    -> trigger_run
/// POST   /hello-world    -> stream_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/hello-world", get(runs::trigger_run).post(runs::stream_run))
}
