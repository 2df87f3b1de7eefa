pub mod store;
pub mod text;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Which pipe of a supervised command an entry was captured from. `System`
/// entries are produced by the supervisor itself (start echoes, exit
/// notifications, spawn failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
    System,
}

/// One captured line (or wrapped fragment of a line) of process output.
///
/// `index` is the sole ordering key across all processes: entries are stored
/// and rendered sorted by it, and it equals emission order. Timestamps may
/// collide across processes; indices never do.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub command_id: usize,
    pub text: String,
    pub timestamp: SystemTime,
    pub stream: StreamKind,
    pub index: u64,
    /// True when this entry is the wrapped remainder of a line longer than
    /// the column budget. Rendering hint only, not a semantic break.
    pub continuation: bool,
}

/// Process-wide monotonic index source. One instance is created at startup
/// and shared (via `Arc`) with every drain and watcher thread; it is never
/// reset, not even across process restarts.
#[derive(Debug, Default)]
pub struct LogSequencer {
    next_index: AtomicU64,
}

impl LogSequencer {
    pub fn new() -> Self {
        Self {
            next_index: AtomicU64::new(0),
        }
    }

    /// Returns the next global index. Incremented exactly once per call;
    /// indices are never reused.
    pub fn next(&self) -> u64 {
        self.next_index.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::LogSequencer;

    #[test]
    fn sequencer_starts_at_zero_and_increments_once_per_call() {
        let sequencer = LogSequencer::new();
        assert_eq!(sequencer.next(), 0);
        assert_eq!(sequencer.next(), 1);
        assert_eq!(sequencer.next(), 2);
    }

    #[test]
    fn sequencer_indices_are_unique_across_threads() {
        let sequencer = Arc::new(LogSequencer::new());
        let mut workers = Vec::new();
        for _ in 0..4 {
            let sequencer = sequencer.clone();
            workers.push(std::thread::spawn(move || {
                (0..250).map(|_| sequencer.next()).collect::<Vec<u64>>()
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for worker in workers {
            for index in worker.join().expect("worker") {
                assert!(seen.insert(index), "index {index} handed out twice");
            }
        }
        assert_eq!(seen.len(), 1000);
        assert_eq!(sequencer.next(), 1000);
    }
}
