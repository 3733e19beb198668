//! Concrete implementations of [`StreamTransport`](crate::traits::StreamTransport).
//!
//! # Adapters
//!
//! - [`ReqwestTransport`] - HTTP streaming over reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides [`mock::MockTransport`], a scripted
//! transport for tests.

pub mod mock;
pub mod reqwest_transport;

pub use mock::{MockStream, MockTransport};
pub use reqwest_transport::ReqwestTransport;
