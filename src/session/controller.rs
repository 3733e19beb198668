//! Stream session lifecycle.
//!
//! [`StreamController`] owns one logical stream: it issues the request,
//! drives the read loop, retries failed attempts, and reports exactly one
//! terminal callback. Every attempt is a fresh `StreamSession`; nothing
//! is resumed and chunks already delivered are never replayed.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use tokio_util::sync::CancellationToken;

use super::callbacks::StreamCallbacks;
use super::config::StreamConfig;
use crate::adapters::ReqwestTransport;
use crate::cancel::{CancelHandle, CancelSource, CancelToken, SignalBridge};
use crate::decoder::Utf8Decoder;
use crate::error::{SseError, StreamError};
use crate::traits::{ByteStream, StreamTransport, TransportError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, request not yet answered
    Pending,
    /// Body obtained, read loop running
    Reading,
    /// Body ended normally
    Completed,
    /// Cancellation took effect
    Cancelled,
    /// Attempt failed
    Errored,
}

impl SessionState {
    /// Whether no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Errored
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Pending => "pending",
            SessionState::Reading => "reading",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
            SessionState::Errored => "errored",
        };
        write!(f, "{}", s)
    }
}

/// Final result of a logical stream, retries included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Terminal state of the last attempt
    pub state: SessionState,
    /// Number of attempts made (first try included)
    pub attempts: u32,
}

/// Why an attempt did not complete.
#[derive(Debug)]
enum Failure {
    /// The request could not be issued
    Issue(TransportError),
    /// The body failed while being read
    Read(TransportError),
    /// The SSE layer rejected the text
    Sse(SseError),
}

impl Failure {
    fn is_retryable(&self, config: &StreamConfig) -> bool {
        match self {
            Failure::Issue(err) => !err.is_fatal(),
            Failure::Read(_) => config.retry_read_errors,
            Failure::Sse(_) => false,
        }
    }

    fn into_stream_error(self, attempts: u32) -> StreamError {
        match self {
            Failure::Issue(TransportError::UnsupportedStream(reason)) => {
                StreamError::UnsupportedStream { reason }
            }
            Failure::Issue(source) => StreamError::Transport { attempts, source },
            Failure::Read(source) => StreamError::Read { attempts, source },
            Failure::Sse(err) => StreamError::Sse(err),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Issue(err) => write!(f, "issue failed: {}", err),
            Failure::Read(err) => write!(f, "read failed: {}", err),
            Failure::Sse(err) => write!(f, "{}", err),
        }
    }
}

/// How one attempt ended.
#[derive(Debug)]
enum AttemptEnd {
    Completed,
    Cancelled(CancelSource),
    Failed(Failure),
}

/// One attempt of a logical stream.
///
/// Holds the body reader exclusively; it is released exactly once when the
/// session reaches a terminal state, whichever path gets there.
pub(crate) struct StreamSession {
    id: Uuid,
    attempt: u32,
    state: SessionState,
    reader: Option<ByteStream>,
    decoder: Utf8Decoder,
    bridge: Option<SignalBridge>,
}

impl StreamSession {
    fn new(attempt: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt,
            state: SessionState::Pending,
            reader: None,
            decoder: Utf8Decoder::new(),
            bridge: None,
        }
    }

    /// Session id used in log spans.
    fn id(&self) -> Uuid {
        self.id
    }

    /// Run the attempt to a terminal state.
    async fn drive(
        &mut self,
        transport: &dyn StreamTransport,
        config: &StreamConfig,
        callbacks: &mut StreamCallbacks,
        token: &CancelToken,
    ) -> AttemptEnd {
        self.bridge = Some(SignalBridge::wire(config.signal.as_ref(), token));

        let end = self.read_to_end(transport, config, callbacks, token).await;

        self.state = match &end {
            AttemptEnd::Completed => SessionState::Completed,
            AttemptEnd::Cancelled(_) => SessionState::Cancelled,
            AttemptEnd::Failed(_) => SessionState::Errored,
        };
        self.release();
        end
    }

    async fn read_to_end(
        &mut self,
        transport: &dyn StreamTransport,
        config: &StreamConfig,
        callbacks: &mut StreamCallbacks,
        token: &CancelToken,
    ) -> AttemptEnd {
        if let Some(source) = token.source() {
            return AttemptEnd::Cancelled(source);
        }

        debug!("Issuing {} {}", config.request.method, config.request.url);
        let opened = tokio::select! {
            biased;
            _ = token.fired() => return AttemptEnd::Cancelled(fired_source(token)),
            opened = transport.open_stream(&config.request) => opened,
        };
        match opened {
            Ok(body) => self.reader = Some(body),
            Err(err) => return AttemptEnd::Failed(Failure::Issue(err)),
        }
        self.state = SessionState::Reading;

        let mut chunks = 0usize;
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return AttemptEnd::Cancelled(fired_source(token));
            };

            let next = tokio::select! {
                biased;
                _ = token.fired() => return AttemptEnd::Cancelled(fired_source(token)),
                next = reader.next() => next,
            };

            // A cancel that lands while the read resolves still wins.
            if let Some(source) = token.source() {
                return AttemptEnd::Cancelled(source);
            }

            match next {
                Some(Ok(bytes)) => {
                    let text = self.decoder.decode(&bytes);
                    if text.is_empty() {
                        continue;
                    }
                    chunks += 1;
                    if let Err(err) = callbacks.chunk(text) {
                        return AttemptEnd::Failed(Failure::Sse(err));
                    }
                }
                Some(Err(err)) => return AttemptEnd::Failed(Failure::Read(err)),
                None => {
                    let tail = self.decoder.finish();
                    if !tail.is_empty() {
                        if let Err(err) = callbacks.chunk(tail) {
                            return AttemptEnd::Failed(Failure::Sse(err));
                        }
                    }
                    debug!(chunks, "Body ended");
                    return AttemptEnd::Completed;
                }
            }
        }
    }

    /// Drop the reader and detach from the external signal. Idempotent.
    fn release(&mut self) {
        if self.reader.take().is_some() {
            debug!("Released body reader");
        }
        if let Some(mut bridge) = self.bridge.take() {
            bridge.release();
        }
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("attempt", &self.attempt)
            .field("state", &self.state)
            .field("reader", &self.reader.is_some())
            .finish()
    }
}

fn fired_source(token: &CancelToken) -> CancelSource {
    token.source().unwrap_or(CancelSource::Manual)
}

async fn signal_fired(signal: Option<&CancellationToken>) {
    match signal {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Drives streaming requests over a [`StreamTransport`].
///
/// # Example
///
/// ```ignore
/// use streamfeed::session::{StreamCallbacks, StreamConfig, StreamController};
/// use streamfeed::traits::StreamRequest;
///
/// let controller = StreamController::default();
/// let cancel = controller.start(
///     StreamConfig::new(StreamRequest::get("https://example.com/feed")).with_retry(2),
///     StreamCallbacks::new().on_chunk(|text| print!("{}", text)),
/// );
/// // later
/// cancel.cancel();
/// ```
#[derive(Clone)]
pub struct StreamController {
    transport: Arc<dyn StreamTransport>,
}

impl StreamController {
    /// Create a controller over a shared transport.
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self { transport }
    }

    /// Create a controller that owns its transport.
    pub fn with_transport<T>(transport: T) -> Self
    where
        T: StreamTransport + 'static,
    {
        Self::new(Arc::new(transport))
    }

    /// Start a stream in the background and return its cancel handle.
    ///
    /// The handle is usable immediately, before the request is even issued.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, config: StreamConfig, callbacks: StreamCallbacks) -> CancelHandle {
        let token = CancelToken::new();
        let handle = CancelHandle::new(token.clone());
        let controller = self.clone();

        tokio::spawn(async move {
            controller.run(config, callbacks, token).await;
        });

        handle
    }

    /// Run a stream to its end on the current task.
    ///
    /// Exactly one of `on_complete` / `on_error` fires, unless the stream
    /// ends with neither callback registered.
    pub async fn run(
        &self,
        config: StreamConfig,
        mut callbacks: StreamCallbacks,
        token: CancelToken,
    ) -> SessionOutcome {
        let span = info_span!("stream", url = %config.request.url);
        self.run_attempts(&config, &mut callbacks, &token)
            .instrument(span)
            .await
    }

    async fn run_attempts(
        &self,
        config: &StreamConfig,
        callbacks: &mut StreamCallbacks,
        token: &CancelToken,
    ) -> SessionOutcome {
        let mut attempt = 0u32;

        loop {
            let mut session = StreamSession::new(attempt);
            let span = info_span!("stream_session", session_id = %session.id(), attempt);
            let end = session
                .drive(self.transport.as_ref(), config, callbacks, token)
                .instrument(span)
                .await;
            let attempts = attempt + 1;

            match end {
                AttemptEnd::Completed => {
                    let unterminated = callbacks.unterminated();
                    if unterminated > 0 {
                        debug!(unterminated, "Dropping unterminated SSE frame at end of stream");
                    }
                    info!(attempts, "Stream completed");
                    callbacks.complete();
                    return SessionOutcome {
                        state: SessionState::Completed,
                        attempts,
                    };
                }
                AttemptEnd::Cancelled(source) => {
                    info!(attempts, "Stream cancelled ({})", source);
                    callbacks.error(StreamError::Cancelled(source));
                    return SessionOutcome {
                        state: SessionState::Cancelled,
                        attempts,
                    };
                }
                AttemptEnd::Failed(failure) => {
                    if failure.is_retryable(config) && attempt < config.retry {
                        warn!(
                            "Attempt {} of {} failed: {}, retrying in {:?}",
                            attempts,
                            config.retry + 1,
                            failure,
                            config.retry_delay
                        );
                        if let Some(source) = self.wait_retry_delay(config, token).await {
                            info!(attempts, "Stream cancelled during retry delay ({})", source);
                            callbacks.error(StreamError::Cancelled(source));
                            return SessionOutcome {
                                state: SessionState::Cancelled,
                                attempts,
                            };
                        }
                        callbacks.reset_attempt();
                        attempt += 1;
                        continue;
                    }

                    let err = failure.into_stream_error(attempts);
                    error!(
                        code = err.error_code(),
                        category = %err.category(),
                        "Stream failed: {}",
                        err
                    );
                    callbacks.error(err);
                    return SessionOutcome {
                        state: SessionState::Errored,
                        attempts,
                    };
                }
            }
        }
    }

    /// Sleep for the retry delay. Returns the cancel source if the wait was
    /// interrupted.
    async fn wait_retry_delay(
        &self,
        config: &StreamConfig,
        token: &CancelToken,
    ) -> Option<CancelSource> {
        tokio::select! {
            biased;
            _ = token.fired() => Some(fired_source(token)),
            _ = signal_fired(config.signal.as_ref()) => {
                token.fire(CancelSource::Signal);
                Some(fired_source(token))
            }
            _ = tokio::time::sleep(config.retry_delay) => None,
        }
    }
}

impl Default for StreamController {
    fn default() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl fmt::Debug for StreamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamController").finish_non_exhaustive()
    }
}
