//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! mod common;
//! use common::{Call, Recorder};
//!
//! let recorder = Recorder::new();
//! let handle = controller.start(config, recorder.callbacks());
//! recorder.wait_terminal().await;
//! assert_eq!(recorder.calls(), vec![Call::Complete]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use streamfeed::{SseEvent, SseParser, StreamCallbacks, StreamError};

/// How long a test waits for a terminal callback before failing.
pub const TERMINAL_TIMEOUT: Duration = Duration::from_secs(5);

/// One observed callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Chunk(String),
    Event(SseEvent),
    Complete,
    Error(StreamError),
}

/// Records callback invocations in order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    terminal: Arc<Notify>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks that record raw chunks.
    pub fn callbacks(&self) -> StreamCallbacks {
        let chunks = self.calls.clone();
        self.terminal_callbacks(
            StreamCallbacks::new().on_chunk(move |text| chunks.lock().unwrap().push(Call::Chunk(text))),
        )
    }

    /// Callbacks that record parsed events.
    pub fn event_callbacks(&self, parser: SseParser) -> StreamCallbacks {
        let events = self.calls.clone();
        self.terminal_callbacks(StreamCallbacks::new().on_event(parser, move |event| {
            events.lock().unwrap().push(Call::Event(event))
        }))
    }

    fn terminal_callbacks(&self, callbacks: StreamCallbacks) -> StreamCallbacks {
        let (complete, complete_notify) = (self.calls.clone(), self.terminal.clone());
        let (error, error_notify) = (self.calls.clone(), self.terminal.clone());
        callbacks
            .on_complete(move || {
                complete.lock().unwrap().push(Call::Complete);
                complete_notify.notify_one();
            })
            .on_error(move |err| {
                error.lock().unwrap().push(Call::Error(err));
                error_notify.notify_one();
            })
    }

    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait for `on_complete` or `on_error`.
    pub async fn wait_terminal(&self) {
        tokio::time::timeout(TERMINAL_TIMEOUT, self.terminal.notified())
            .await
            .expect("no terminal callback before timeout");
    }

    /// Wait until at least `count` calls were recorded.
    pub async fn wait_calls(&self, count: usize) {
        tokio::time::timeout(TERMINAL_TIMEOUT, async {
            while self.calls.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("callbacks not observed before timeout");
    }
}
