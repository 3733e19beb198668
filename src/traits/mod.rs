//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`StreamTransport`] - issue a request and obtain an incremental body

pub mod transport;

pub use transport::{ByteStream, Headers, StreamRequest, StreamTransport, TransportError};
