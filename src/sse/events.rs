//! SSE event type.

use serde::{Deserialize, Serialize};

/// One reassembled Server-Sent Event.
///
/// Every field is optional; an event is only ever produced when at least one
/// of them was present in its frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SseEvent {
    /// Event type (`event:` line, trimmed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Payload (`data:` lines joined with `\n`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Event id (`id:` line, trimmed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reconnection time in milliseconds (`retry:` line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Event carrying only a data payload.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_none() && self.id.is_none() && self.retry.is_none()
    }

    /// Parse the data payload as JSON.
    ///
    /// An event without data is treated as an empty payload.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.data.as_deref().unwrap_or_default())
    }
}
