// src/counting/ledger.rs

use std::collections::HashSet;

/// The unit of de-duplication: one track meeting one line.
///
/// Permanent once inserted. If the external tracker recycles a numeric id
/// within a run, the recycled track inherits this key's history and a
/// second crossing on the same line is suppressed; that is the tracker's
/// identity contract, not something the ledger can repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrossingKey {
    pub track_id: i64,
    pub line_index: usize,
}

/// De-duplicating record of every crossing already counted.
///
/// Grows monotonically; `len()` equals the total number of events ever
/// recorded in this run.
#[derive(Debug, Default)]
pub struct CrossingLedger {
    keys: HashSet<CrossingKey>,
}

impl CrossingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `(track_id, line_index)` if absent.
    ///
    /// Returns true exactly once per key; every later call for the same
    /// pair returns false without mutating anything. This is the sole gate
    /// preventing a crossing that stays in the band for several consecutive
    /// frames from being counted more than once.
    pub fn try_record(&mut self, track_id: i64, line_index: usize) -> bool {
        self.keys.insert(CrossingKey {
            track_id,
            line_index,
        })
    }

    pub fn contains(&self, track_id: i64, line_index: usize) -> bool {
        self.keys.contains(&CrossingKey {
            track_id,
            line_index,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Per-line monotonic counters, indexed by 0-based line index.
#[derive(Debug)]
pub struct LineCounters {
    counts: Vec<u64>,
}

impl LineCounters {
    pub fn new(num_lines: usize) -> Self {
        Self {
            counts: vec![0; num_lines],
        }
    }

    /// Increment the count for `line_index` by exactly one. Only ever called
    /// immediately after a successful `CrossingLedger::try_record`.
    pub fn increment(&mut self, line_index: usize) {
        self.counts[line_index] += 1;
    }

    pub fn get(&self, line_index: usize) -> u64 {
        self.counts[line_index]
    }

    /// Snapshot of all counts, ordered by line index.
    pub fn all(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
