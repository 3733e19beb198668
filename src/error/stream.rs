//! Streaming-related error types.
//!
//! This module defines the terminal errors a stream session reports through
//! its `on_error` callback, plus the SSE framing error.

use thiserror::Error;

use super::ErrorCategory;
use crate::cancel::CancelSource;
use crate::traits::TransportError;

/// SSE framing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseError {
    /// The unterminated trailing fragment grew beyond the configured cap.
    #[error("SSE buffer exceeded {limit} bytes ({buffered} buffered) without a frame separator")]
    BufferOverflow { limit: usize, buffered: usize },
}

/// Terminal stream errors.
///
/// Exactly one of these (or a completion) is reported per logical stream,
/// retries included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The request could not be issued; `attempts` counts every try.
    #[error("Stream request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The body failed while it was being read.
    #[error("Stream read failed on attempt {attempts}: {source}")]
    Read {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The response could not be consumed incrementally.
    #[error("Response body is not streamable: {reason}")]
    UnsupportedStream { reason: String },

    /// The SSE layer rejected the stream.
    #[error("SSE error: {0}")]
    Sse(#[from] SseError),

    /// The stream was cancelled.
    #[error("Stream cancelled ({0})")]
    Cancelled(CancelSource),
}

impl StreamError {
    /// High-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Transport { source, .. } | StreamError::Read { source, .. } => {
                source.category()
            }
            StreamError::UnsupportedStream { .. } | StreamError::Sse(_) => ErrorCategory::Protocol,
            StreamError::Cancelled(_) => ErrorCategory::Cancelled,
        }
    }

    /// Whether this error reports a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled(_))
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_ISSUE",
            StreamError::Read { .. } => "E_STREAM_READ",
            StreamError::UnsupportedStream { .. } => "E_STREAM_UNSUPPORTED",
            StreamError::Sse(_) => "E_STREAM_SSE",
            StreamError::Cancelled(_) => "E_STREAM_CANCEL",
        }
    }
}
