//! Reqwest-based streaming transport.
//!
//! Implements [`StreamTransport`] over `reqwest::Response::bytes_stream`, so
//! chunks reach the session as soon as they arrive on the wire.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::traits::{ByteStream, Headers, StreamRequest, StreamTransport, TransportError};

/// Streaming transport backed by a `reqwest::Client`.
///
/// No overall request timeout is applied; a custom client passed to
/// [`ReqwestTransport::with_client`] should not set one either, or long-lived
/// streams get cut off mid-body.
///
/// # Example
///
/// ```ignore
/// use streamfeed::adapters::ReqwestTransport;
/// use streamfeed::traits::{StreamRequest, StreamTransport};
///
/// let transport = ReqwestTransport::new();
/// let body = transport
///     .open_stream(&StreamRequest::get("https://example.com/events").event_stream())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport over a custom client (proxies, TLS settings,
    /// connect timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert a reqwest error raised while issuing the request.
    fn convert_error(err: reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::InvalidUrl(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::ConnectionFailed(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }

    /// Convert a reqwest error raised while reading the body.
    fn convert_read_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Io(err.to_string())
        }
    }

    /// Apply headers to a request builder.
    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        let mut builder = builder;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }

    /// Reject responses that carry no incrementally readable body.
    fn check_streamable(
        response: &reqwest::Response,
        expected_content_type: Option<&str>,
    ) -> Result<(), TransportError> {
        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Err(TransportError::UnsupportedStream(format!(
                "response {} has no body",
                status.as_u16()
            )));
        }

        if let Some(expected) = expected_content_type {
            let actual = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("");
            if !content_type_matches(actual, expected) {
                return Err(TransportError::UnsupportedStream(format!(
                    "expected content type {}, got {:?}",
                    expected, actual
                )));
            }
        }

        Ok(())
    }
}

/// Compare media types, ignoring parameters and case.
fn content_type_matches(actual: &str, expected: &str) -> bool {
    let media_type = actual.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case(expected.trim())
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamTransport for ReqwestTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, TransportError> {
        let builder = self.client.request(request.method.clone(), &request.url);
        let builder = Self::apply_headers(builder, &request.headers);
        let builder = match &request.body {
            Some(body) => builder.body(body.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(Self::convert_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::ServerError { status, message });
        }

        Self::check_streamable(&response, request.expected_content_type.as_deref())?;

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(Self::convert_read_error));

        Ok(Box::pin(stream))
    }
}
