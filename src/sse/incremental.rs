//! Incremental SSE parser.
//!
//! Reassembles frames that arrive split across arbitrary chunk boundaries,
//! including in the middle of a line or a field name. Feeding a text in any
//! number of pieces produces the same events, in the same order, as feeding
//! it in one piece.

use crate::error::SseError;
use crate::sse::events::SseEvent;

/// Frame separator: one blank line.
const FRAME_SEPARATOR: &str = "\n\n";

/// Stateful SSE parser.
///
/// The buffer only ever holds the unterminated trailing fragment between
/// calls. That fragment is never emitted; it may still be awaiting data.
/// A parser is bound to one stream: construct a new one to start over.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    max_buffer: Option<usize>,
}

impl SseParser {
    /// Create a parser with an unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser whose trailing fragment may not exceed `limit` bytes.
    pub fn with_max_buffer(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            max_buffer: Some(limit),
        }
    }

    /// Feed a chunk, invoking `on_event` once per completed frame.
    ///
    /// Fails only when a buffer cap is configured and the trailing fragment
    /// outgrows it; the fragment is discarded in that case.
    pub fn feed<F>(&mut self, chunk: &str, mut on_event: F) -> Result<(), SseError>
    where
        F: FnMut(SseEvent),
    {
        self.append(chunk);

        let mut consumed = 0;
        while let Some(pos) = self.buffer[consumed..].find(FRAME_SEPARATOR) {
            let frame = &self.buffer[consumed..consumed + pos];
            if let Some(event) = parse_frame(frame) {
                on_event(event);
            }
            consumed += pos + FRAME_SEPARATOR.len();
        }
        if consumed > 0 {
            self.buffer.drain(..consumed);
        }

        if let Some(limit) = self.max_buffer {
            if self.buffer.len() > limit {
                let buffered = self.buffer.len();
                self.buffer.clear();
                tracing::warn!(limit, buffered, "Discarding oversized SSE fragment");
                return Err(SseError::BufferOverflow { limit, buffered });
            }
        }

        Ok(())
    }

    /// Feed a chunk and collect the completed events.
    pub fn feed_collect(&mut self, chunk: &str) -> Result<Vec<SseEvent>, SseError> {
        let mut events = Vec::new();
        self.feed(chunk, |event| events.push(event))?;
        Ok(events)
    }

    /// The unterminated trailing fragment currently held.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Drop the unterminated fragment, keeping the buffer cap. Returns the
    /// number of bytes dropped.
    pub fn discard_buffered(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }

    /// Append a chunk with `\r\n` normalised to `\n`.
    ///
    /// A `\r` that ends the buffer pairs with a `\n` starting the chunk.
    fn append(&mut self, chunk: &str) {
        if self.buffer.ends_with('\r') && chunk.starts_with('\n') {
            self.buffer.pop();
        }

        if chunk.contains("\r\n") {
            self.buffer.push_str(&chunk.replace("\r\n", "\n"));
        } else {
            self.buffer.push_str(chunk);
        }
    }
}

/// Parse one complete frame. Returns `None` when no field was recognised.
pub(crate) fn parse_frame(frame: &str) -> Option<SseEvent> {
    let mut event = SseEvent::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.split('\n') {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("id:") {
            event.id = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("retry:") {
            if let Ok(ms) = value.trim().parse::<u64>() {
                event.retry = Some(ms);
            }
        }
        // `:` comments and unknown fields fall through
    }

    if !data_lines.is_empty() {
        event.data = Some(data_lines.join("\n"));
    }

    (!event.is_empty()).then_some(event)
}
