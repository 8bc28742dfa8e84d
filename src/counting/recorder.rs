// src/counting/recorder.rs

use serde::Serialize;

/// One confirmed crossing, as it appears in the exported ledger.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CrossingRecord {
    pub track_id: i64,
    /// 1-based for reporting; the core works with 0-based line indices.
    pub line_number: usize,
    pub timestamp_secs: f64,
}

impl CrossingRecord {
    /// Export formatting: seconds with two decimals, e.g. "12.34s".
    pub fn timestamp_label(&self) -> String {
        format!("{:.2}s", self.timestamp_secs)
    }
}

/// Append-only, timestamp-ordered log of confirmed crossings.
///
/// Timestamps come from the frame processor's playback position; since
/// frames are consumed sequentially the log is non-decreasing by
/// construction. Records are never mutated or removed.
#[derive(Debug, Default)]
pub struct EventRecorder {
    records: Vec<CrossingRecord>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. Returns a copy of what was appended so the caller
    /// can log or surface it without re-reading the log.
    pub fn record(&mut self, track_id: i64, line_index: usize, timestamp_secs: f64) -> CrossingRecord {
        let record = CrossingRecord {
            track_id,
            line_number: line_index + 1,
            timestamp_secs,
        };
        self.records.push(record);
        record
    }

    /// Ordered view for the export collaborator.
    pub fn records(&self) -> &[CrossingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_appended_in_order() {
        let mut recorder = EventRecorder::new();
        recorder.record(7, 0, 2.0);
        recorder.record(3, 1, 2.04);
        recorder.record(9, 0, 2.04);

        let records = recorder.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].track_id, 7);
        assert_eq!(records[1].track_id, 3);
        assert_eq!(records[2].track_id, 9);

        // Non-decreasing timestamps, equal allowed within one frame.
        for pair in records.windows(2) {
            assert!(pair[0].timestamp_secs <= pair[1].timestamp_secs);
        }
    }

    #[test]
    fn line_number_is_one_based() {
        let mut recorder = EventRecorder::new();
        let record = recorder.record(5, 0, 1.0);
        assert_eq!(record.line_number, 1);
        let record = recorder.record(5, 3, 1.5);
        assert_eq!(record.line_number, 4);
    }

    #[test]
    fn timestamp_label_has_two_decimals_and_suffix() {
        let record = CrossingRecord {
            track_id: 12,
            line_number: 1,
            timestamp_secs: 12.345,
        };
        assert_eq!(record.timestamp_label(), "12.35s");

        let record = CrossingRecord {
            track_id: 12,
            line_number: 1,
            timestamp_secs: 2.0,
        };
        assert_eq!(record.timestamp_label(), "2.00s");
    }
}
