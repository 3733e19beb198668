//! Streaming transport trait abstraction.
//!
//! The session controller only ever needs one capability from an HTTP
//! client: issue a request and hand back an incrementally readable body, or
//! fail with a named error. This module defines that capability together
//! with the base request configuration it consumes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use http::Method;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

use crate::error::ErrorCategory;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incrementally readable response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Base request configuration for a streaming request.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body, sent as-is
    pub body: Option<String>,
    /// Content type the body must carry to be treated as a stream.
    ///
    /// When set, a response with a different `Content-Type` is rejected as
    /// [`TransportError::UnsupportedStream`].
    pub expected_content_type: Option<String>,
}

impl StreamRequest {
    /// Create a request with an explicit method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            expected_content_type: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request with a body.
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Require the response to carry the given content type.
    pub fn with_expected_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.expected_content_type = Some(content_type.into());
        self
    }

    /// Shorthand for an SSE request: `Accept: text/event-stream` and the
    /// matching expected content type.
    pub fn event_stream(self) -> Self {
        self.with_header("Accept", "text/event-stream")
            .with_expected_content_type("text/event-stream")
    }
}

/// Transport errors, raised either when issuing the request or while
/// reading the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// The response body cannot be read incrementally
    #[error("Unsupported stream: {0}")]
    UnsupportedStream(String),
    /// IO error while reading the body
    #[error("IO error: {0}")]
    Io(String),
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Other error
    #[error("HTTP error: {0}")]
    Other(String),
}

impl TransportError {
    /// High-level category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransportError::ConnectionFailed(_)
            | TransportError::Timeout(_)
            | TransportError::Io(_) => ErrorCategory::Network,
            TransportError::ServerError { status, .. } if *status >= 500 => ErrorCategory::Server,
            TransportError::ServerError { .. } => ErrorCategory::Client,
            TransportError::UnsupportedStream(_) => ErrorCategory::Protocol,
            TransportError::InvalidUrl(_) => ErrorCategory::Configuration,
            TransportError::Other(_) => ErrorCategory::Network,
        }
    }

    /// Whether this error can never be recovered by re-issuing the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::UnsupportedStream(_))
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectionFailed(_) => "E_NET_CONN",
            TransportError::Timeout(_) => "E_NET_TIMEOUT",
            TransportError::ServerError { .. } => "E_NET_HTTP",
            TransportError::UnsupportedStream(_) => "E_NET_UNSUPPORTED",
            TransportError::Io(_) => "E_NET_IO",
            TransportError::InvalidUrl(_) => "E_NET_URL",
            TransportError::Other(_) => "E_NET_OTHER",
        }
    }
}

/// Trait for transports that can deliver a response body incrementally.
///
/// Implementations must not buffer the body and must not apply an implicit
/// overall timeout: a stream may legitimately stay open indefinitely.
///
/// # Example
///
/// ```ignore
/// use streamfeed::traits::{StreamRequest, StreamTransport};
/// use futures::StreamExt;
///
/// async fn first_chunk<T: StreamTransport>(transport: &T) -> Option<bytes::Bytes> {
///     let mut body = transport.open_stream(&StreamRequest::get("https://example.com/feed")).await.ok()?;
///     body.next().await?.ok()
/// }
/// ```
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Issue the request and return its body as a byte stream.
    ///
    /// Fails with [`TransportError::UnsupportedStream`] when the response
    /// exists but cannot be consumed incrementally.
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, TransportError>;
}
