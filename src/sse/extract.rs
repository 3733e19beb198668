//! Stateless SSE extraction over already-complete text.
//!
//! For blocks known to contain whole frames only. Nothing is carried between
//! calls, so text split mid-frame must go through
//! [`SseParser`](crate::sse::SseParser) instead.

use crate::sse::events::SseEvent;
use crate::sse::incremental::SseParser;

/// Invoke `on_data` with the data payload of every frame in `text`.
///
/// Multiple `data:` lines in a frame are joined with `\n`, as the
/// incremental parser does. Frames without data, or with empty data, are
/// skipped; all other fields are ignored.
pub fn extract_data<F>(text: &str, mut on_data: F)
where
    F: FnMut(String),
{
    let text = text.replace("\r\n", "\n");

    for frame in text.split("\n\n") {
        let data = frame
            .split('\n')
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|value| value.strip_prefix(' ').unwrap_or(value))
            .collect::<Vec<_>>()
            .join("\n");

        if !data.is_empty() {
            on_data(data);
        }
    }
}

/// Parse complete text in a single pass.
///
/// Equivalent to feeding `text` to a fresh [`SseParser`] in one call: a
/// trailing frame without a terminating blank line is not emitted.
pub fn parse_complete(text: &str) -> Vec<SseEvent> {
    let mut events = Vec::new();
    // An unbounded parser never fails.
    let _ = SseParser::new().feed(text, |event| events.push(event));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        extract_data(text, |data| out.push(data));
        out
    }

    #[test]
    fn test_extract_two_frames() {
        assert_eq!(
            collect("data: hello\n\ndata: world\n\n"),
            vec!["hello".to_string(), "world".to_string()]
        );
    }

    #[test]
    fn test_extract_multiline_join() {
        assert_eq!(collect("data: a\ndata: b\n\n"), vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_extract_ignores_other_fields() {
        assert_eq!(
            collect("event: ping\nid: 1\n\n: note\ndata: x\n\n"),
            vec!["x".to_string()]
        );
    }

    #[test]
    fn test_extract_skips_empty_data() {
        assert!(collect("data:\n\ndata: \n\n").is_empty());
    }

    #[test]
    fn test_extract_last_frame_without_separator() {
        assert_eq!(collect("data: tail"), vec!["tail".to_string()]);
    }

    #[test]
    fn test_parse_complete() {
        let events = parse_complete("event: a\ndata: 1\n\n: c\n\ndata: 2\n\ndata: partial");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event.as_deref(), Some("a"));
        assert_eq!(events[1], SseEvent::data("2"));
    }
}
