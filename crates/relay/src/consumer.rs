//! Client-side half of the relay.
//!
//! [`StatusConsumer`] reads raw chunks from an already-opened connection
//! (chunk boundaries carry no meaning), decodes frames incrementally, and
//! applies each event to its [`RunState`]. Reading stops the moment a
//! terminal event is applied — the stream is dropped immediately rather
//! than waiting for the producer to close the transport.

use std::fmt;

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use runbeam_core::wire::{decode_event, FrameDecoder};
use runbeam_core::CoreError;

use crate::state::RunState;

/// Drives a [`RunState`] from a relay byte stream.
#[derive(Debug, Default)]
pub struct StatusConsumer {
    decoder: FrameDecoder,
    state: RunState,
}

impl StatusConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    /// Record that the trigger call succeeded before the stream opened.
    pub fn mark_triggered(&mut self) {
        self.state.mark_triggered();
    }

    /// Consume the stream until a terminal event is applied.
    ///
    /// A payload that fails to parse is logged and skipped — one malformed
    /// event never aborts the relay. End-of-stream before a terminal event
    /// is an [`CoreError::IncompleteStream`]; a chunk-level error is a
    /// [`CoreError::Transport`]. Both move the state to `Errored`, which is
    /// never conflated with a `FAILED` job outcome.
    pub async fn drive<S, E>(&mut self, stream: S) -> Result<(), CoreError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        pin_mut!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let message = e.to_string();
                    tracing::error!(error = %message, "Transport error while reading relay stream");
                    self.state.fail(message.clone());
                    return Err(CoreError::Transport(message));
                }
            };

            for payload in self.decoder.feed(&chunk) {
                match decode_event(&payload) {
                    Ok(event) => {
                        self.state.apply(&event);
                        if self.state.is_terminal() {
                            // Dropping the stream here releases the
                            // connection without reading to transport close.
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            payload = %payload,
                            "Skipping malformed status event",
                        );
                    }
                }
            }
        }

        tracing::warn!("Relay stream ended before a terminal status");
        self.state.fail("stream ended before a terminal status");
        Err(CoreError::IncompleteStream)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use runbeam_core::{wire, RunStatus, StatusEvent};
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    use crate::state::RunPhase;

    use super::*;

    fn frame(event: &StatusEvent) -> Bytes {
        Bytes::from(wire::encode_frame(event).unwrap())
    }

    fn ok_chunks(chunks: Vec<Bytes>) -> impl Stream<Item = Result<Bytes, Infallible>> {
        futures::stream::iter(chunks.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn applies_events_and_finishes_on_terminal() {
        let chunks = vec![
            frame(&StatusEvent::new(RunStatus::Triggered)),
            frame(&StatusEvent::new(RunStatus::Executing)),
            frame(&StatusEvent::new(RunStatus::Completed).with_message("Hello, James!")),
        ];

        let mut consumer = StatusConsumer::new();
        consumer.mark_triggered();
        consumer.drive(ok_chunks(chunks)).await.unwrap();

        let state = consumer.state();
        assert_eq!(state.phase, RunPhase::Completed);
        assert_eq!(state.status, Some(RunStatus::Completed));
        assert_eq!(state.message.as_deref(), Some("Hello, James!"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn chunk_boundaries_may_split_frames() {
        let whole = frame(&StatusEvent::new(RunStatus::Completed).with_message("done"));
        let mid = whole.len() / 2;
        let chunks = vec![whole.slice(..mid), whole.slice(mid..)];

        let mut consumer = StatusConsumer::new();
        consumer.drive(ok_chunks(chunks)).await.unwrap();

        assert_eq!(consumer.state().phase, RunPhase::Completed);
        assert_eq!(consumer.state().message.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped_not_fatal() {
        let chunks = vec![
            frame(&StatusEvent::new(RunStatus::Triggered)),
            Bytes::from_static(b"data: {not json at all\n\n"),
            frame(&StatusEvent::new(RunStatus::Completed).with_message("survived")),
        ];

        let mut consumer = StatusConsumer::new();
        consumer.drive(ok_chunks(chunks)).await.unwrap();

        assert_eq!(consumer.state().phase, RunPhase::Completed);
        assert_eq!(consumer.state().message.as_deref(), Some("survived"));
    }

    #[tokio::test]
    async fn stops_reading_immediately_after_terminal() {
        // Channel-backed stream that stays open after the terminal frame;
        // drive must return without waiting for transport close.
        let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(4);
        tx.send(Ok(frame(&StatusEvent::new(RunStatus::Completed))))
            .await
            .unwrap();

        let mut consumer = StatusConsumer::new();
        let driven = tokio::time::timeout(
            Duration::from_secs(1),
            consumer.drive(ReceiverStream::new(rx)),
        )
        .await
        .expect("consumer must stop at the terminal event");

        driven.unwrap();
        assert_eq!(consumer.state().phase, RunPhase::Completed);

        // The consumer dropped its receiver when it returned.
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn eof_without_terminal_is_incomplete() {
        let chunks = vec![
            frame(&StatusEvent::new(RunStatus::Triggered)),
            frame(&StatusEvent::new(RunStatus::Executing)),
        ];

        let mut consumer = StatusConsumer::new();
        let result = consumer.drive(ok_chunks(chunks)).await;

        assert_matches!(result, Err(CoreError::IncompleteStream));
        assert_eq!(consumer.state().phase, RunPhase::Errored);
        assert!(consumer.state().error.is_some());
    }

    #[tokio::test]
    async fn transport_error_is_distinct_from_failed() {
        struct ChunkError;
        impl fmt::Display for ChunkError {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("connection reset by peer")
            }
        }

        let chunks: Vec<Result<Bytes, ChunkError>> = vec![
            Ok(frame(&StatusEvent::new(RunStatus::Executing))),
            Err(ChunkError),
        ];

        let mut consumer = StatusConsumer::new();
        let result = consumer.drive(futures::stream::iter(chunks)).await;

        assert_matches!(result, Err(CoreError::Transport(_)));
        assert_eq!(consumer.state().phase, RunPhase::Errored);
        assert_ne!(consumer.state().phase, RunPhase::Failed);
        assert_eq!(
            consumer.state().error.as_deref(),
            Some("connection reset by peer")
        );
    }

    #[tokio::test]
    async fn synthetic_error_frame_finishes_in_errored() {
        let chunks = vec![frame(&StatusEvent::synthetic_error("upstream gone"))];

        let mut consumer = StatusConsumer::new();
        consumer.drive(ok_chunks(chunks)).await.unwrap();

        assert_eq!(consumer.state().phase, RunPhase::Errored);
        assert_eq!(consumer.state().error.as_deref(), Some("upstream gone"));
    }
}
