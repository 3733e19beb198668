//! Chunk-split equivalence for the incremental SSE parser and the
//! stateless extractor's documented behaviour.

use streamfeed::{extract_data, parse_complete, SseEvent, SseParser};

const STREAM: &str = "event: start\nid: 1\ndata: {\"step\":1}\n\n\
: keepalive\n\n\
data: line one\ndata: line two\n\n\
retry: 2500\nevent: tick\n\n\
data: caf\u{e9} \u{1f600}\r\n\r\n\
data:\n\n\
event: end\ndata: bye\n\n\
data: trailing";

/// Feed `text` split at every boundary in `cuts` (byte offsets).
fn feed_split(text: &str, cuts: &[usize]) -> Vec<SseEvent> {
    let mut parser = SseParser::new();
    let mut events = Vec::new();
    let mut start = 0;
    let end = text.len();
    for &cut in cuts.iter().chain(std::iter::once(&end)) {
        parser
            .feed(&text[start..cut], |event| events.push(event))
            .unwrap();
        start = cut;
    }
    events
}

fn char_boundaries(text: &str) -> Vec<usize> {
    (1..text.len()).filter(|&i| text.is_char_boundary(i)).collect()
}

/// Deterministic xorshift so failures are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

#[test]
fn test_reference_parse() {
    let events = parse_complete(STREAM);
    assert_eq!(events.len(), 6);
    assert_eq!(events[0].event.as_deref(), Some("start"));
    assert_eq!(events[0].id.as_deref(), Some("1"));
    assert_eq!(events[1], SseEvent::data("line one\nline two"));
    assert_eq!(events[2].retry, Some(2500));
    assert_eq!(events[2].data, None);
    assert_eq!(events[3], SseEvent::data("caf\u{e9} \u{1f600}"));
    assert_eq!(events[4], SseEvent::data(""));
    assert_eq!(events[5].data.as_deref(), Some("bye"));
}

#[test]
fn test_every_single_split_matches_reference() {
    let expected = parse_complete(STREAM);
    for cut in char_boundaries(STREAM) {
        assert_eq!(feed_split(STREAM, &[cut]), expected, "split at byte {}", cut);
    }
}

#[test]
fn test_one_char_chunks_match_reference() {
    let expected = parse_complete(STREAM);
    assert_eq!(feed_split(STREAM, &char_boundaries(STREAM)), expected);
}

#[test]
fn test_random_splits_match_reference() {
    let expected = parse_complete(STREAM);
    let boundaries = char_boundaries(STREAM);
    let mut rng = XorShift(0x5eed_cafe_f00d_d00d);

    for round in 0..200 {
        let count = (rng.next() % 12) as usize;
        let mut cuts: Vec<usize> = (0..count)
            .map(|_| boundaries[(rng.next() as usize) % boundaries.len()])
            .collect();
        cuts.sort_unstable();
        cuts.dedup();
        assert_eq!(
            feed_split(STREAM, &cuts),
            expected,
            "round {} cuts {:?}",
            round,
            cuts
        );
    }
}

#[test]
fn test_trailing_fragment_stays_buffered() {
    let mut parser = SseParser::new();
    parser.feed(STREAM, |_| {}).unwrap();
    assert_eq!(parser.buffered(), "data: trailing");
}

#[test]
fn test_extract_data_examples() {
    let mut out = Vec::new();
    extract_data("data: hello\n\ndata: world\n\n", |data| out.push(data));
    assert_eq!(out, vec!["hello", "world"]);

    let mut out = Vec::new();
    extract_data("data: a\ndata: b\n\n", |data| out.push(data));
    assert_eq!(out, vec!["a\nb"]);

    let mut out = Vec::new();
    extract_data("event: ping\n\n: comment\n\n", |data| out.push(data));
    assert!(out.is_empty());
}

#[test]
fn test_extract_agrees_with_parser_on_whole_frames() {
    let text = "data: x\n\nevent: e\ndata: y\ndata: z\n\n";
    let mut extracted = Vec::new();
    extract_data(text, |data| extracted.push(data));

    let parsed: Vec<String> = parse_complete(text)
        .into_iter()
        .filter_map(|event| event.data)
        .collect();
    assert_eq!(extracted, parsed);
}
