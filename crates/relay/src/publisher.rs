//! Server-side half of the relay.
//!
//! [`StatusPublisher`] owns one upstream subscription per client request.
//! Each upstream record becomes one wire frame, written and flushed
//! immediately; the stream closes right after the first terminal frame.
//! Upstream failures are folded into a single synthetic `ERROR` frame so
//! the consumer always sees a definitive close instead of a silent
//! disconnect.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use runbeam_core::{wire, CoreError, JobHandle, RunStatus, StatusEvent};
use runbeam_upstream::{JobBackend, RunUpdate, UpdateStream, UpstreamError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Framed wire bytes for one client connection, ready to be used as an
/// HTTP response body. The stream ends when the relay task closes its
/// sender.
pub type RelayStream = ReceiverStream<Bytes>;

/// Outbound frame buffer. Small so the send-await acts as the per-frame
/// flush point rather than accumulating frames.
const FRAME_BUFFER: usize = 8;

/// Publishes one run's status feed to one client.
#[derive(Clone)]
pub struct StatusPublisher {
    backend: Arc<dyn JobBackend>,
    idle_timeout: Option<Duration>,
}

impl StatusPublisher {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self {
            backend,
            idle_timeout: None,
        }
    }

    /// Bound the wait for the next upstream record. When the bound elapses
    /// the stream is closed with a synthetic `ERROR` frame. Unbounded by
    /// default.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    /// Open the relay stream for a triggered run.
    ///
    /// Opens exactly one upstream subscription and spawns the relay task
    /// for this connection. An unknown handle surfaces as
    /// [`CoreError::InvalidHandle`]; failures reaching the upstream as
    /// [`CoreError::UpstreamSubscription`].
    pub async fn open(&self, handle: &JobHandle) -> Result<RelayStream, CoreError> {
        let updates = self.backend.subscribe(handle).await.map_err(|e| match e {
            UpstreamError::Subscription(msg) => CoreError::InvalidHandle(msg),
            other => CoreError::UpstreamSubscription(other.to_string()),
        })?;

        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        tokio::spawn(relay_updates(
            updates,
            tx,
            self.idle_timeout,
            handle.clone(),
        ));

        Ok(ReceiverStream::new(rx))
    }
}

/// Relay task for one connection.
///
/// Exits — dropping the subscription and closing the outbound channel on
/// every path — when a terminal frame was written, the upstream failed,
/// the idle bound elapsed, or the client went away.
async fn relay_updates(
    mut updates: UpdateStream,
    tx: mpsc::Sender<Bytes>,
    idle_timeout: Option<Duration>,
    handle: JobHandle,
) {
    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, updates.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(
                        handle = %handle,
                        idle_secs = limit.as_secs(),
                        "No upstream record within idle bound, closing stream",
                    );
                    let event = StatusEvent::synthetic_error(format!(
                        "no status update from upstream within {}s",
                        limit.as_secs()
                    ));
                    send_event(&tx, &event, &handle).await;
                    return;
                }
            },
            None => updates.next().await,
        };

        let Some(item) = next else {
            // Upstream closed its feed without a terminal record. Nothing
            // to synthesize from here; the consumer reports the stream as
            // incomplete.
            tracing::warn!(handle = %handle, "Upstream feed ended without a terminal status");
            return;
        };

        match item {
            Ok(update) => {
                let event = event_for_update(&update);
                let terminal = event.is_terminal();

                if !send_event(&tx, &event, &handle).await {
                    return;
                }
                if terminal {
                    tracing::debug!(
                        handle = %handle,
                        status = %event.status,
                        "Terminal status relayed, closing stream",
                    );
                    return;
                }
            }
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "Upstream subscription failed");
                send_event(&tx, &StatusEvent::synthetic_error(e.to_string()), &handle).await;
                return;
            }
        }
    }
}

/// Encode and write one frame. Returns false when the client is gone or
/// the event cannot be encoded; either way the relay must stop.
async fn send_event(tx: &mpsc::Sender<Bytes>, event: &StatusEvent, handle: &JobHandle) -> bool {
    let frame = match wire::encode_frame(event) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(handle = %handle, error = %e, "Failed to encode status event");
            return false;
        }
    };

    if tx.send(Bytes::from(frame)).await.is_err() {
        tracing::debug!(handle = %handle, "Client disconnected, abandoning relay");
        return false;
    }
    true
}

/// Build the relayed event for one upstream record.
///
/// The completion message is forwarded only on `COMPLETED`, the error
/// detail only on `FAILED`; the timestamp is the forwarding time.
fn event_for_update(update: &RunUpdate) -> StatusEvent {
    let mut event = StatusEvent::new(update.status.clone());

    if update.status == RunStatus::Completed {
        if let Some(message) = update.output_message() {
            event = event.with_message(message);
        }
    }
    if update.status == RunStatus::Failed {
        if let Some(error) = &update.error {
            event = event.with_error(error.message.clone());
        }
    }

    event
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use runbeam_core::wire::{decode_event, FrameDecoder};
    use runbeam_upstream::testing::{ScriptedBackend, SCRIPTED_RUN_ID};

    use super::*;

    fn scripted_publisher() -> (StatusPublisher, runbeam_upstream::testing::ScriptSender, JobHandle)
    {
        let (backend, script) = ScriptedBackend::new();
        let publisher = StatusPublisher::new(Arc::new(backend));
        let handle = JobHandle::parse(SCRIPTED_RUN_ID).unwrap();
        (publisher, script, handle)
    }

    async fn next_event(stream: &mut RelayStream, decoder: &mut FrameDecoder) -> StatusEvent {
        let chunk = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream closed unexpectedly");
        let payloads = decoder.feed(&chunk);
        assert_eq!(payloads.len(), 1, "expected exactly one frame per chunk");
        decode_event(&payloads[0]).unwrap()
    }

    #[tokio::test]
    async fn relays_updates_in_order_and_closes_after_terminal() {
        let (publisher, script, handle) = scripted_publisher();

        for status in [
            RunStatus::Triggered,
            RunStatus::Executing,
            RunStatus::Executing,
        ] {
            script.send(Ok(RunUpdate::new(status))).unwrap();
        }
        script
            .send(Ok(RunUpdate::new(RunStatus::Completed)
                .with_output(serde_json::json!({"message": "Hello, James!"}))))
            .unwrap();
        // Anything scripted after the terminal record must never be relayed.
        script.send(Ok(RunUpdate::new(RunStatus::Executing))).unwrap();

        let mut stream = publisher.open(&handle).await.unwrap();
        let mut decoder = FrameDecoder::new();

        let expected = [
            RunStatus::Triggered,
            RunStatus::Executing,
            RunStatus::Executing,
        ];
        for status in expected {
            assert_eq!(next_event(&mut stream, &mut decoder).await.status, status);
        }

        let last = next_event(&mut stream, &mut decoder).await;
        assert_eq!(last.status, RunStatus::Completed);
        assert_eq!(last.message.as_deref(), Some("Hello, James!"));

        // Stream closed right after the terminal frame.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn upstream_error_becomes_one_terminal_error_frame() {
        let (publisher, script, handle) = scripted_publisher();
        script
            .send(Err(UpstreamError::Connection("feed dropped".into())))
            .unwrap();

        let mut stream = publisher.open(&handle).await.unwrap();
        let mut decoder = FrameDecoder::new();

        let event = next_event(&mut stream, &mut decoder).await;
        assert_eq!(event.status, RunStatus::Error);
        assert!(!event.error.as_deref().unwrap().is_empty());

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn malformed_upstream_record_closes_with_error_frame() {
        let (publisher, script, handle) = scripted_publisher();
        script.send(Ok(RunUpdate::new(RunStatus::Triggered))).unwrap();
        script
            .send(Err(UpstreamError::Protocol("malformed run update".into())))
            .unwrap();

        let mut stream = publisher.open(&handle).await.unwrap();
        let mut decoder = FrameDecoder::new();

        assert_eq!(
            next_event(&mut stream, &mut decoder).await.status,
            RunStatus::Triggered
        );
        let event = next_event(&mut stream, &mut decoder).await;
        assert_eq!(event.status, RunStatus::Error);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn quiet_upstream_keeps_the_stream_open() {
        let (publisher, script, handle) = scripted_publisher();
        script.send(Ok(RunUpdate::new(RunStatus::Triggered))).unwrap();

        let mut stream = publisher.open(&handle).await.unwrap();
        let mut decoder = FrameDecoder::new();

        assert_eq!(
            next_event(&mut stream, &mut decoder).await.status,
            RunStatus::Triggered
        );

        // No further records scripted, sender still alive: the stream must
        // stay open with no terminal frame.
        let waited = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(waited.is_err(), "stream must not yield or close while idle");
    }

    #[tokio::test]
    async fn idle_timeout_synthesizes_error_frame() {
        let (backend, script) = ScriptedBackend::new();
        let publisher = StatusPublisher::new(Arc::new(backend))
            .with_idle_timeout(Duration::from_millis(20));
        let handle = JobHandle::parse(SCRIPTED_RUN_ID).unwrap();

        let mut stream = publisher.open(&handle).await.unwrap();
        let mut decoder = FrameDecoder::new();

        let event = next_event(&mut stream, &mut decoder).await;
        assert_eq!(event.status, RunStatus::Error);
        assert!(event.error.as_deref().unwrap().contains("within"));
        assert!(stream.next().await.is_none());

        drop(script);
    }

    #[tokio::test]
    async fn open_with_unknown_handle_is_invalid() {
        let (publisher, _script, _handle) = scripted_publisher();
        let unknown = JobHandle::parse("run_other").unwrap();

        let result = publisher.open(&unknown).await;
        assert_matches!(result, Err(CoreError::InvalidHandle(_)));
    }

    #[tokio::test]
    async fn client_disconnect_releases_the_subscription() {
        let (publisher, script, handle) = scripted_publisher();
        let stream = publisher.open(&handle).await.unwrap();
        drop(stream);

        script.send(Ok(RunUpdate::new(RunStatus::Triggered))).unwrap();

        // The relay task notices the dropped client on its next send and
        // drops the subscription, closing the script channel.
        for _ in 0..50 {
            if script.is_closed() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("relay task did not release the upstream subscription");
    }

    #[test]
    fn completion_message_is_forwarded_only_on_completed() {
        let executing = RunUpdate::new(RunStatus::Executing)
            .with_output(serde_json::json!({"message": "early"}));
        assert!(event_for_update(&executing).message.is_none());

        let completed = RunUpdate::new(RunStatus::Completed)
            .with_output(serde_json::json!({"message": "done"}));
        assert_eq!(
            event_for_update(&completed).message.as_deref(),
            Some("done")
        );
    }

    #[test]
    fn error_detail_is_forwarded_only_on_failed() {
        let executing = RunUpdate::new(RunStatus::Executing).with_error("noise");
        assert!(event_for_update(&executing).error.is_none());

        let failed = RunUpdate::new(RunStatus::Failed).with_error("task panicked");
        assert_eq!(
            event_for_update(&failed).error.as_deref(),
            Some("task panicked")
        );
    }
}
