//! Progress parser (PP).
//!
//! Consumes the encoder tool's line-oriented `key=value` stream and emits
//! structured snapshots, flushing whenever the sentinel key `progress` is
//! observed. The flushed snapshot is the full accumulated map since the
//! last flush, not a delta of what changed — keys reported once earlier in
//! the same snapshot window stay present even if the encoder didn't repeat
//! them on every line.

use std::collections::BTreeMap;

/// Accumulates `key=value` pairs between flushes.
#[derive(Default)]
pub struct ProgressParser {
    current: BTreeMap<String, String>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line of the encoder's stdout. Lines without `=` are
    /// ignored. Returns `Some(snapshot)` when `key == "progress"`, at which
    /// point the internal accumulator is cleared for the next snapshot.
    pub fn feed_line(&mut self, line: &str) -> Option<BTreeMap<String, String>> {
        let (key, value) = line.split_once('=')?;
        self.current.insert(key.to_string(), value.to_string());
        if key == "progress" {
            Some(std::mem::take(&mut self.current))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_until_progress_key_then_flushes() {
        let mut pp = ProgressParser::new();
        assert!(pp.feed_line("frame=1").is_none());
        let snapshot = pp.feed_line("progress=continue").expect("should flush");
        assert_eq!(snapshot.get("frame").map(String::as_str), Some("1"));
        assert_eq!(snapshot.get("progress").map(String::as_str), Some("continue"));
    }

    #[test]
    fn second_snapshot_starts_empty() {
        let mut pp = ProgressParser::new();
        pp.feed_line("frame=1");
        pp.feed_line("progress=continue");
        assert!(pp.feed_line("frame=2").is_none());
        let snapshot = pp.feed_line("progress=end").expect("should flush");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("frame").map(String::as_str), Some("2"));
    }

    #[test]
    fn lines_without_equals_are_ignored() {
        let mut pp = ProgressParser::new();
        assert!(pp.feed_line("not a kv line").is_none());
        let snapshot = pp.feed_line("progress=end").expect("should flush");
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn eof_flushes_nothing() {
        let mut pp = ProgressParser::new();
        pp.feed_line("frame=1");
        // No explicit "EOF" API: the caller simply stops feeding lines, and
        // whatever wasn't flushed by a `progress=` line is discarded.
        assert_eq!(pp.current.len(), 1);
    }
}
