/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Applies to handler
    /// response time, not to the lifetime of an open relay stream.
    pub request_timeout_secs: u64,
    /// Task triggered by the demo and webhook endpoints.
    pub task_name: String,
    /// Payload sent by the demo trigger endpoint.
    pub trigger_payload: String,
    /// Optional bound on the wait for the next upstream record. Unset
    /// means a stalled upstream keeps the stream open indefinitely.
    pub stream_idle_timeout_secs: Option<u64>,
    /// Which upstream job system to use.
    pub upstream: UpstreamConfig,
}

/// Upstream selection.
///
/// When both `UPSTREAM_API_URL` and `UPSTREAM_API_KEY` are set, runs are
/// triggered on the remote job service; otherwise an in-process backend
/// executes the hello-world task locally.
#[derive(Debug, Clone)]
pub enum UpstreamConfig {
    Http { api_url: String, api_key: String },
    Local { run_delay_secs: u64 },
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `TASK_NAME`                | `hello-world`           |
    /// | `TRIGGER_PAYLOAD`          | `James`                 |
    /// | `STREAM_IDLE_TIMEOUT_SECS` | unset (unbounded)       |
    /// | `UPSTREAM_API_URL`         | unset                   |
    /// | `UPSTREAM_API_KEY`         | unset                   |
    /// | `LOCAL_RUN_DELAY_SECS`     | `5`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let task_name = std::env::var("TASK_NAME").unwrap_or_else(|_| "hello-world".into());

        let trigger_payload = std::env::var("TRIGGER_PAYLOAD").unwrap_or_else(|_| "James".into());

        let stream_idle_timeout_secs = std::env::var("STREAM_IDLE_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("STREAM_IDLE_TIMEOUT_SECS must be a valid u64"));

        let upstream = match (
            std::env::var("UPSTREAM_API_URL"),
            std::env::var("UPSTREAM_API_KEY"),
        ) {
            (Ok(api_url), Ok(api_key)) => UpstreamConfig::Http { api_url, api_key },
            _ => UpstreamConfig::Local {
                run_delay_secs: std::env::var("LOCAL_RUN_DELAY_SECS")
                    .unwrap_or_else(|_| "5".into())
                    .parse()
                    .expect("LOCAL_RUN_DELAY_SECS must be a valid u64"),
            },
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            task_name,
            trigger_payload,
            stream_idle_timeout_secs,
            upstream,
        }
    }
}
