/// Error taxonomy shared across the relay workspace.
///
/// Variants map one-to-one onto the failure modes of the relay:
/// client-visible handle problems, upstream trigger/subscription failures,
/// and consumer-side decode/transport conditions. HTTP status mapping lives
/// in the api crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No or malformed run identifier; no subscription can be opened.
    #[error("Invalid run handle: {0}")]
    InvalidHandle(String),

    /// The upstream job system rejected the trigger call.
    #[error("Trigger failed: {0}")]
    TriggerFailed(String),

    /// Failure while consuming an already-opened upstream subscription.
    #[error("Upstream subscription error: {0}")]
    UpstreamSubscription(String),

    /// One event payload failed to parse. Non-fatal to the stream.
    #[error("Malformed event payload: {0}")]
    MalformedEvent(String),

    /// The transport closed before any terminal status was observed.
    #[error("Stream ended before a terminal status was observed")]
    IncompleteStream,

    /// Connection-level failure while reading the stream. Distinct from a
    /// `FAILED` job outcome.
    #[error("Transport error: {0}")]
    Transport(String),
}
