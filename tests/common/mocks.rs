//! Mock transport fixtures.
//!
//! Re-exports the mock transport from `streamfeed::adapters::mock` and adds
//! shorthand constructors for scripted streams.

pub use streamfeed::adapters::mock::{MockStream, MockTransport};

use bytes::Bytes;
use std::time::Duration;

use streamfeed::traits::{StreamRequest, TransportError};
use streamfeed::{StreamConfig, StreamController};

/// URL used for all mock requests.
pub const MOCK_URL: &str = "http://mock.test/stream";

/// A stream that yields `parts` and ends.
pub fn chunks(parts: &[&str]) -> MockStream {
    MockStream::Chunks(to_bytes(parts))
}

/// A stream that yields `parts` and then stays open.
pub fn open_chunks(parts: &[&str]) -> MockStream {
    MockStream::Pending(to_bytes(parts))
}

/// An issue-time connection failure.
pub fn connection_failed() -> MockStream {
    MockStream::Error(TransportError::ConnectionFailed("refused".to_string()))
}

fn to_bytes(parts: &[&str]) -> Vec<Bytes> {
    parts.iter().map(|p| Bytes::from(p.to_string())).collect()
}

/// Config for [`MOCK_URL`] with a short retry delay.
pub fn mock_config() -> StreamConfig {
    StreamConfig::new(StreamRequest::get(MOCK_URL)).with_retry_delay(Duration::from_millis(10))
}

/// Controller over a clone of `transport`.
pub fn controller(transport: &MockTransport) -> StreamController {
    StreamController::with_transport(transport.clone())
}
