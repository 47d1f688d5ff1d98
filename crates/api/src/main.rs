use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use runbeam_relay::StatusPublisher;
use runbeam_upstream::{HttpBackend, JobBackend, LocalBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runbeam_api::config::{ServerConfig, UpstreamConfig};
use runbeam_api::router::build_app_router;
use runbeam_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runbeam_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Upstream backend ---
    let backend = build_backend(&config);

    // --- Relay publisher ---
    let mut publisher = StatusPublisher::new(Arc::clone(&backend));
    if let Some(secs) = config.stream_idle_timeout_secs {
        tracing::info!(idle_secs = secs, "Relay streams bounded by idle timeout");
        publisher = publisher.with_idle_timeout(Duration::from_secs(secs));
    }

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        backend,
        publisher,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Select the upstream job system from configuration.
///
/// With `UPSTREAM_API_URL`/`UPSTREAM_API_KEY` set, runs execute on the
/// remote job service; otherwise the in-process backend plays the
/// hello-world task locally so the server is usable out of the box.
fn build_backend(config: &ServerConfig) -> Arc<dyn JobBackend> {
    match &config.upstream {
        UpstreamConfig::Http { api_url, api_key } => {
            tracing::info!(api_url = %api_url, "Using remote job service");
            Arc::new(HttpBackend::new(api_url.clone(), api_key.clone()))
        }
        UpstreamConfig::Local { run_delay_secs } => {
            tracing::info!(
                run_delay_secs,
                "No upstream credentials configured, using local backend",
            );
            Arc::new(LocalBackend::with_delay(Duration::from_secs(
                *run_delay_secs,
            )))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
