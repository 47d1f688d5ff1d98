use std::sync::Arc;

use runbeam_relay::StatusPublisher;
use runbeam_upstream::JobBackend;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upstream job system used for triggering runs.
    pub backend: Arc<dyn JobBackend>,
    /// Relay publisher used for streaming run status to clients.
    pub publisher: StatusPublisher,
}
