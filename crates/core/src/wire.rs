//! SSE wire codec for [`StatusEvent`] frames.
//!
//! One frame is a single `data: ` line carrying the JSON-encoded event,
//! terminated by an empty line:
//!
//! ```text
//! data: {"status":"EXECUTING","message":null,"error":null,"timestamp":"..."}
//!
//! ```
//!
//! [`encode_frame`] produces frames on the publisher side; [`FrameDecoder`]
//! reassembles payloads on the consumer side from raw chunks whose
//! boundaries need not align with line or frame boundaries.

use crate::error::CoreError;
use crate::event::StatusEvent;

/// Literal prefix of a data line.
pub const DATA_PREFIX: &str = "data: ";

/// Encode one event as a complete wire frame (data line + terminator).
pub fn encode_frame(event: &StatusEvent) -> Result<String, serde_json::Error> {
    Ok(format!("{DATA_PREFIX}{}\n\n", serde_json::to_string(event)?))
}

/// Parse one extracted data payload back into an event.
pub fn decode_event(payload: &str) -> Result<StatusEvent, CoreError> {
    serde_json::from_str(payload).map_err(|e| CoreError::MalformedEvent(e.to_string()))
}

/// Incremental frame decoder.
///
/// Buffers raw bytes and yields the payload of every complete `data: ` line.
/// All other lines — blank frame terminators, `:` comments, unrecognised
/// field prefixes — are skipped without error. Partial lines (including a
/// UTF-8 sequence split across chunks) stay buffered until the terminating
/// newline arrives.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes; returns the payloads of all data lines
    /// completed by this chunk, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
                payloads.push(payload.to_string());
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use crate::status::RunStatus;

    use super::*;

    fn round_trip(event: StatusEvent) {
        let frame = encode_frame(&event).unwrap();
        assert!(frame.starts_with(DATA_PREFIX));
        assert!(frame.ends_with("\n\n"));

        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(frame.as_bytes());
        assert_eq!(payloads.len(), 1);

        let decoded = decode_event(&payloads[0]).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn round_trip_all_field_combinations() {
        round_trip(StatusEvent::new(RunStatus::Triggered));
        round_trip(StatusEvent::new(RunStatus::Completed).with_message("Hello, James!"));
        round_trip(StatusEvent::new(RunStatus::Failed).with_error("task panicked"));
        round_trip(
            StatusEvent::new(RunStatus::Failed)
                .with_message("partial output")
                .with_error("task panicked"),
        );
    }

    #[test]
    fn chunk_boundaries_need_not_align_with_frames() {
        let event = StatusEvent::new(RunStatus::Completed).with_message("done");
        let frame = encode_frame(&event).unwrap();
        let bytes = frame.as_bytes();

        let mut decoder = FrameDecoder::new();
        let mut payloads = Vec::new();
        // Feed one byte at a time — worst case chunking.
        for byte in bytes {
            payloads.extend(decoder.feed(&[*byte]));
        }

        assert_eq!(payloads.len(), 1);
        assert_eq!(decode_event(&payloads[0]).unwrap(), event);
    }

    #[test]
    fn multibyte_utf8_split_across_chunks_survives() {
        let event = StatusEvent::new(RunStatus::Completed).with_message("héllo ✓");
        let frame = encode_frame(&event).unwrap();
        let bytes = frame.as_bytes();
        let mid = bytes.len() / 2;

        let mut decoder = FrameDecoder::new();
        let mut payloads = decoder.feed(&bytes[..mid]);
        payloads.extend(decoder.feed(&bytes[mid..]));

        assert_eq!(payloads.len(), 1);
        assert_eq!(decode_event(&payloads[0]).unwrap(), event);
    }

    #[test]
    fn non_data_lines_are_skipped() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(
            b": keep-alive comment\nevent: status\nid: 7\n\ndata: {\"a\":1}\n\n",
        );
        assert_eq!(payloads, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(b"data: {\"a\":1}\r\n\r\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string()]);
    }
}
