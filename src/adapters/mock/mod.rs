//! Mock implementations for testing.
//!
//! Lets session behaviour be exercised without network access.
//!
//! # Available Mocks
//!
//! - [`MockTransport`] - scripted per-attempt byte streams

pub mod transport;

pub use transport::{MockStream, MockTransport, RecordedRequest};
