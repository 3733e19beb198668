//! Cancellation primitives for stream sessions.
//!
//! A [`CancelToken`] is the single source of truth for "this stream must
//! stop". It can be fired from two places: the [`CancelHandle`] returned to
//! the caller, or an external [`CancellationToken`] the caller passed in via
//! the stream configuration. The [`SignalBridge`] wires the latter to the
//! former.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where a cancellation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelSource {
    /// The caller invoked the returned [`CancelHandle`].
    Manual,
    /// The external signal in the stream configuration fired.
    Signal,
}

impl fmt::Display for CancelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelSource::Manual => write!(f, "manual"),
            CancelSource::Signal => write!(f, "signal"),
        }
    }
}

/// Two-state flag (armed, fired) shared by a session and its handle.
///
/// Firing is idempotent: only the first call records a source and wakes
/// waiters, later calls return `false` and change nothing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
    source: Arc<OnceLock<CancelSource>>,
}

impl CancelToken {
    /// Create an armed token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. Returns `true` only for the call that fired it.
    pub fn fire(&self, source: CancelSource) -> bool {
        if self.source.set(source).is_err() {
            return false;
        }
        self.inner.cancel();
        true
    }

    /// Whether the token has fired.
    pub fn is_fired(&self) -> bool {
        self.source.get().is_some()
    }

    /// The source that fired the token, if any.
    pub fn source(&self) -> Option<CancelSource> {
        self.source.get().copied()
    }

    /// Wait until the token fires.
    pub async fn fired(&self) {
        self.inner.cancelled().await
    }
}

/// Zero-argument cancellation operation handed back by
/// [`StreamController::start`](crate::session::StreamController::start).
///
/// Safe to call any number of times and at any point in the lifecycle.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
}

impl CancelHandle {
    pub(crate) fn new(token: CancelToken) -> Self {
        Self { token }
    }

    /// Cancel the stream. Calls after the first are no-ops.
    pub fn cancel(&self) {
        if self.token.fire(CancelSource::Manual) {
            tracing::debug!("Stream cancel requested");
        }
    }

    /// Whether the stream has been cancelled, from either source.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_fired()
    }
}

/// Connects an optional external signal to a session's [`CancelToken`].
///
/// Wiring happens once per attempt. The observer task is torn down by
/// [`SignalBridge::release`] (or on drop), so observers never accumulate on
/// a long-lived signal across retries or repeated sessions.
#[derive(Debug)]
pub struct SignalBridge {
    observer: Option<JoinHandle<()>>,
}

impl SignalBridge {
    /// Wire `signal` to `token`.
    ///
    /// A signal that has already fired fires the token immediately, before
    /// anything is issued. Must be called from within a tokio runtime.
    pub fn wire(signal: Option<&CancellationToken>, token: &CancelToken) -> Self {
        let Some(signal) = signal else {
            return Self { observer: None };
        };

        if signal.is_cancelled() {
            token.fire(CancelSource::Signal);
            return Self { observer: None };
        }

        let signal = signal.clone();
        let token = token.clone();
        let observer = tokio::spawn(async move {
            tokio::select! {
                _ = signal.cancelled() => {
                    if token.fire(CancelSource::Signal) {
                        tracing::debug!("External signal cancelled the stream");
                    }
                }
                // Token fired from the handle; nothing left to observe.
                _ = token.fired() => {}
            }
        });

        Self {
            observer: Some(observer),
        }
    }

    /// Whether an observer is currently registered on the signal.
    pub fn is_wired(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|observer| !observer.is_finished())
    }

    /// Deregister the observer. Idempotent.
    pub fn release(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.abort();
        }
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        self.release();
    }
}
