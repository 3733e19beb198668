//! Streamfeed - cancellable, retrying HTTP response streaming with
//! incremental Server-Sent Events parsing.
//!
//! This library exposes modules for use in integration tests and by the
//! `streamfeed` binary.

pub mod adapters;
pub mod cancel;
pub mod cli;
pub mod decoder;
pub mod error;
pub mod session;
pub mod sse;
pub mod traits;

pub use cancel::{CancelHandle, CancelSource, CancelToken, SignalBridge};
pub use error::{ErrorCategory, SseError, StreamError};
pub use session::{SessionOutcome, SessionState, StreamCallbacks, StreamConfig, StreamController};
pub use sse::{extract_data, parse_complete, SseEvent, SseParser};
pub use traits::{StreamRequest, StreamTransport, TransportError};
