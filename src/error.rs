// src/error.rs

use thiserror::Error;

/// Failure taxonomy for the crossing counter and its collaborators.
///
/// End-of-stream is intentionally absent: the frame source models it as
/// `read_frame() -> Ok(None)`, which is normal termination, not a fault.
#[derive(Debug, Error)]
pub enum CounterError {
    /// A counting line is neither horizontal nor vertical. Raised at setup,
    /// before any frame is processed.
    #[error("invalid counting line {index}: {reason}")]
    Configuration { index: usize, reason: String },

    /// The frame source could not be opened. Fatal; no frames are processed
    /// and all outputs stay empty.
    #[error("could not open video source '{spec}': {reason}")]
    Source { spec: String, reason: String },

    /// The tracker returned parallel arrays of mismatched lengths for a
    /// frame. The frame's detections are dropped; processing continues.
    #[error("mismatched tracker output: {ids} ids, {classes} classes, {boxes} boxes")]
    TrackerOutput {
        ids: usize,
        classes: usize,
        boxes: usize,
    },

    /// The final event ledger could not be persisted. Reported after the
    /// run; in-memory counts and records are unaffected.
    #[error("export failed: {0}")]
    Export(String),
}
