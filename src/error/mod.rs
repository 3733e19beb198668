//! Error types for streamfeed.
//!
//! - [`ErrorCategory`]: coarse classification, advisory for callers
//! - [`StreamError`]: terminal error reported by a stream session
//! - [`SseError`]: SSE framing failure
//!
//! Transport-level failures live next to the transport trait as
//! [`TransportError`](crate::traits::TransportError).

mod category;
mod stream;

pub use category::ErrorCategory;
pub use stream::{SseError, StreamError};
