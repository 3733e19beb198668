//! Streaming session controller.
//!
//! # Module structure
//! - `config` - [`StreamConfig`] and its environment overrides
//! - `callbacks` - [`StreamCallbacks`] delivered to the caller
//! - `controller` - [`StreamController`] and its per-attempt sessions

mod callbacks;
mod config;
mod controller;

pub use callbacks::StreamCallbacks;
pub use config::{StreamConfig, DEFAULT_RETRY_DELAY, RETRY_DELAY_ENV, RETRY_ENV};
pub use controller::{SessionOutcome, SessionState, StreamController};
