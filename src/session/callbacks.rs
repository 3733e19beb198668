//! Callback surface of a stream session.
//!
//! All callbacks are optional; a missing one silently drops that
//! notification. `on_complete` and `on_error` are `FnOnce` and are taken on
//! use, so neither can fire twice.

use std::fmt;

use crate::error::{SseError, StreamError};
use crate::sse::{SseEvent, SseParser};

type ChunkFn = Box<dyn FnMut(String) + Send>;
type EventFn = Box<dyn FnMut(SseEvent) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;
type ErrorFn = Box<dyn FnOnce(StreamError) + Send>;

/// Where decoded text goes.
#[derive(Default)]
enum ChunkSink {
    #[default]
    Discard,
    Text(ChunkFn),
    Events { parser: SseParser, on_event: EventFn },
}

/// Callbacks for one logical stream.
///
/// # Example
///
/// ```ignore
/// let callbacks = StreamCallbacks::new()
///     .on_chunk(|text| print!("{}", text))
///     .on_complete(|| println!("done"))
///     .on_error(|err| eprintln!("failed: {}", err));
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    sink: ChunkSink,
    on_complete: Option<CompleteFn>,
    on_error: Option<ErrorFn>,
}

impl StreamCallbacks {
    /// Create an empty callback set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive each non-empty decoded chunk, in arrival order.
    ///
    /// Replaces a previously registered `on_event`.
    pub fn on_chunk<F>(mut self, f: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        self.sink = ChunkSink::Text(Box::new(f));
        self
    }

    /// Route chunks through `parser` and receive reassembled events.
    ///
    /// A parser failure ends the stream with [`StreamError::Sse`].
    /// Replaces a previously registered `on_chunk`.
    pub fn on_event<F>(mut self, parser: SseParser, f: F) -> Self
    where
        F: FnMut(SseEvent) + Send + 'static,
    {
        self.sink = ChunkSink::Events {
            parser,
            on_event: Box::new(f),
        };
        self
    }

    /// Called once when the body ends normally.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called once on final failure or cancellation.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(StreamError) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn chunk(&mut self, text: String) -> Result<(), SseError> {
        match &mut self.sink {
            ChunkSink::Discard => Ok(()),
            ChunkSink::Text(on_chunk) => {
                on_chunk(text);
                Ok(())
            }
            ChunkSink::Events { parser, on_event } => parser.feed(&text, on_event),
        }
    }

    /// Bytes held by the SSE parser that never formed a frame.
    pub(crate) fn unterminated(&self) -> usize {
        match &self.sink {
            ChunkSink::Events { parser, .. } => parser.buffered().len(),
            _ => 0,
        }
    }

    /// Drop the unterminated SSE fragment of a failed attempt before the
    /// next one starts.
    pub(crate) fn reset_attempt(&mut self) {
        if let ChunkSink::Events { parser, .. } = &mut self.sink {
            let dropped = parser.discard_buffered();
            if dropped > 0 {
                tracing::debug!(dropped, "Discarded unterminated SSE fragment before retry");
            }
        }
    }

    pub(crate) fn complete(&mut self) {
        self.on_error = None;
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    pub(crate) fn error(&mut self, err: StreamError) {
        self.on_complete = None;
        if let Some(on_error) = self.on_error.take() {
            on_error(err);
        }
    }
}

impl fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            ChunkSink::Discard => "discard",
            ChunkSink::Text(_) => "text",
            ChunkSink::Events { .. } => "events",
        };
        f.debug_struct("StreamCallbacks")
            .field("sink", &sink)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
