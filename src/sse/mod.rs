//! Server-Sent Events framing.
//!
//! SSE format consists of:
//! - `data: <payload>` - data line(s), joined with `\n`
//! - `event: <type>` - event type line
//! - `id: <id>` - event id line
//! - `retry: <ms>` - reconnection time line
//! - Lines starting with `:` - comments (ignored)
//! - Empty line - signals end of event
//!
//! # Module structure
//! - `events` - the [`SseEvent`] type
//! - `incremental` - stateful [`SseParser`] for chunked input
//! - `extract` - stateless helpers for complete text

mod events;
mod extract;
mod incremental;

pub use events::SseEvent;
pub use extract::{extract_data, parse_complete};
pub use incremental::SseParser;
