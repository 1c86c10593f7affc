//! Bounded in-memory log buffer for job output
//!
//! One buffer belongs to the active (or most recent) job. The HTTP layer
//! snapshots it on every poll, so appends and reads must not race: all access
//! goes through an internal lock held only for the duration of a single
//! append or copy, never across a line boundary.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

/// Default number of retained log lines.
pub const DEFAULT_LOG_CAPACITY: usize = 2000;

/// Append-only, bounded FIFO of text lines.
///
/// At capacity the oldest line is evicted on append. Snapshots are
/// non-destructive and may run concurrently with appends.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    lines: RwLock<VecDeque<String>>,
}

impl LogBuffer {
    /// Create a buffer retaining at most `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            lines: RwLock::new(VecDeque::new()),
        }
    }

    /// Append one line, evicting the oldest line if at capacity.
    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self
            .lines
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Copy the retained lines in append order.
    pub fn snapshot(&self) -> Vec<String> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        lines.iter().cloned().collect()
    }

    /// The retained lines joined with newlines.
    pub fn to_text(&self) -> String {
        self.snapshot().join("\n")
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the buffer holds no lines.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_push_and_snapshot_preserve_order() {
        let buffer = LogBuffer::new(10);
        buffer.push("first");
        buffer.push("second");
        buffer.push("third");

        assert_eq!(buffer.snapshot(), vec!["first", "second", "third"]);
        assert_eq!(buffer.to_text(), "first\nsecond\nthird");
    }

    #[test]
    fn test_snapshot_is_not_destructive() {
        let buffer = LogBuffer::new(10);
        buffer.push("line");

        assert_eq!(buffer.snapshot(), buffer.snapshot());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_eviction_keeps_newest_lines() {
        let buffer = LogBuffer::new(3);
        for i in 0..7 {
            buffer.push(format!("line {i}"));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec!["line 4", "line 5", "line 6"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let buffer = LogBuffer::new(0);
        buffer.push("only");

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec!["only"]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = LogBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.to_text(), "");
        assert_eq!(buffer.capacity(), DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn test_concurrent_appends_and_snapshots() {
        let buffer = Arc::new(LogBuffer::new(10_000));
        let mut writers = Vec::new();

        for t in 0..4 {
            let buffer = Arc::clone(&buffer);
            writers.push(std::thread::spawn(move || {
                for i in 0..500 {
                    buffer.push(format!("writer {t} line {i}"));
                }
            }));
        }

        // Readers run concurrently with the writers; every observed snapshot
        // must contain whole lines only.
        for _ in 0..50 {
            for line in buffer.snapshot() {
                assert!(line.starts_with("writer "));
            }
        }

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(buffer.len(), 2000);

        // Per-writer order survives interleaving.
        let snapshot = buffer.snapshot();
        let writer0: Vec<_> = snapshot
            .iter()
            .filter(|l| l.starts_with("writer 0 "))
            .collect();
        for (i, line) in writer0.iter().enumerate() {
            assert_eq!(**line, format!("writer 0 line {i}"));
        }
    }
}
