//! Mock streaming transport for testing.
//!
//! Each call to `open_stream` consumes the next scripted [`MockStream`],
//! falling back to a default once the script runs out. Requests are recorded
//! and every body handed out is tracked until it is dropped.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use http::Method;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use crate::traits::{ByteStream, Headers, StreamRequest, StreamTransport, TransportError};

/// A recorded request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: Method,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: Option<String>,
}

/// Scripted outcome of one `open_stream` call.
#[derive(Debug, Clone)]
pub enum MockStream {
    /// Yield the chunks, then end normally
    Chunks(Vec<Bytes>),
    /// Yield the chunks, then fail mid-read
    ChunksThenError(Vec<Bytes>, TransportError),
    /// Yield the chunks, then stay open forever
    Pending(Vec<Bytes>),
    /// Fail to issue the request
    Error(TransportError),
    /// Never answer the request
    Hang,
}

/// Mock streaming transport.
///
/// Clones share their script, recorded requests and counters.
///
/// # Example
///
/// ```ignore
/// use streamfeed::adapters::mock::{MockStream, MockTransport};
/// use streamfeed::traits::TransportError;
///
/// let transport = MockTransport::new();
/// transport.push(MockStream::Error(TransportError::Timeout("slow".into())));
/// transport.push(MockStream::Chunks(vec!["data: hi\n\n".into()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Outcomes consumed in order, one per attempt
    script: Arc<Mutex<VecDeque<MockStream>>>,
    /// Outcome once the script is exhausted
    default_stream: Arc<Mutex<Option<MockStream>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Bodies handed out
    opened: Arc<AtomicUsize>,
    /// Bodies dropped
    released: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Create a mock transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the script.
    pub fn push(&self, stream: MockStream) {
        self.script.lock().unwrap().push_back(stream);
    }

    /// Set the outcome used once the script is exhausted.
    pub fn set_default(&self, stream: MockStream) {
        *self.default_stream.lock().unwrap() = Some(stream);
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of bodies handed out.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of bodies dropped by their reader.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn record_request(&self, request: &StreamRequest) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });
    }

    fn next_stream(&self) -> Option<MockStream> {
        if let Some(stream) = self.script.lock().unwrap().pop_front() {
            return Some(stream);
        }
        self.default_stream.lock().unwrap().clone()
    }

    fn track(&self, inner: ByteStream) -> ByteStream {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::pin(TrackedStream {
            inner,
            released: self.released.clone(),
        })
    }
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, TransportError> {
        self.record_request(request);

        let body: ByteStream = match self.next_stream() {
            Some(MockStream::Chunks(chunks)) => Box::pin(stream::iter(chunks.into_iter().map(Ok))),
            Some(MockStream::ChunksThenError(chunks, err)) => Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::once(async move { Err(err) })),
            ),
            Some(MockStream::Pending(chunks)) => {
                Box::pin(stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()))
            }
            Some(MockStream::Error(err)) => return Err(err),
            Some(MockStream::Hang) => std::future::pending().await,
            None => {
                return Err(TransportError::Other(format!(
                    "No mock stream for URL: {}",
                    request.url
                )))
            }
        };

        Ok(self.track(body))
    }
}

/// Body wrapper that counts its own drop.
struct TrackedStream {
    inner: ByteStream,
    released: Arc<AtomicUsize>,
}

impl Stream for TrackedStream {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
