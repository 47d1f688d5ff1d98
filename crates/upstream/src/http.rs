//! HTTP implementation of the upstream port.
//!
//! Talks to a remote job service: triggers runs via its JSON API and
//! subscribes to run status via its SSE realtime feed, reusing the core
//! [`FrameDecoder`] for incremental frame reassembly.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use runbeam_core::wire::FrameDecoder;
use runbeam_core::JobHandle;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::backend::{JobBackend, UpdateStream, UpstreamError};
use crate::record::RunUpdate;

/// Buffer between the SSE reader task and the subscriber. Kept small so a
/// slow subscriber exerts backpressure instead of accumulating updates.
const SUBSCRIPTION_BUFFER: usize = 16;

/// Remote job service client.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    /// Create a client for the job service at `base_url`, authenticating
    /// every request with `api_key` as a bearer token.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Body of a successful trigger call.
#[derive(Debug, Deserialize)]
struct TriggerResponse {
    id: String,
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn trigger(
        &self,
        task: &str,
        payload: serde_json::Value,
    ) -> Result<JobHandle, UpstreamError> {
        let url = format!("{}/api/v1/tasks/{task}/trigger", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "payload": payload }))
            .send()
            .await
            .map_err(|e| UpstreamError::Connection(format!("trigger request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Trigger(format!(
                "job service returned {status}: {body}"
            )));
        }

        let body: TriggerResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Protocol(format!("invalid trigger response: {e}")))?;

        tracing::info!(task, run_id = %body.id, "Run triggered on job service");

        JobHandle::parse(body.id).map_err(|e| UpstreamError::Protocol(e.to_string()))
    }

    async fn subscribe(&self, handle: &JobHandle) -> Result<UpdateStream, UpstreamError> {
        let url = format!("{}/realtime/v1/runs/{handle}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| UpstreamError::Connection(format!("subscribe request failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(UpstreamError::Subscription(format!(
                    "unknown run id: {handle}"
                )));
            }
            status if !status.is_success() => {
                return Err(UpstreamError::Connection(format!(
                    "job service returned {status} for subscription"
                )));
            }
            _ => {}
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        tokio::spawn(read_updates(response, tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Reader task for one subscription.
///
/// Decodes the SSE body incrementally and forwards each parsed update.
/// Ends at end-of-body, on a transport error (forwarded as one final item),
/// or when the subscriber drops its receiver.
async fn read_updates(
    response: reqwest::Response,
    tx: mpsc::Sender<Result<RunUpdate, UpstreamError>>,
) {
    let body = response.bytes_stream();
    futures::pin_mut!(body);
    let mut decoder = FrameDecoder::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = tx
                    .send(Err(UpstreamError::Connection(format!(
                        "realtime feed dropped: {e}"
                    ))))
                    .await;
                return;
            }
        };

        for payload in decoder.feed(&chunk) {
            let item = serde_json::from_str::<RunUpdate>(&payload)
                .map_err(|e| UpstreamError::Protocol(format!("malformed run update: {e}")));

            if tx.send(item).await.is_err() {
                // Subscriber went away; dropping the response aborts the read.
                tracing::debug!("Subscription receiver dropped, stopping realtime reader");
                return;
            }
        }
    }
}
