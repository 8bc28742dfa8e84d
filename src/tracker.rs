// src/tracker.rs
//
// Seam for the external detector/tracker. The counter consumes per-frame
// tracked objects and nothing else; any tracking stack that can produce
// (track id, class id, box) triples per frame plugs in here.

use crate::error::CounterError;
use crate::types::{BBox, Frame, TrackedObject};
use anyhow::Result;
use tracing::info;

/// Common interface for object trackers.
///
/// Implementations own whatever model/tracker state they need and must
/// return persistent track ids across frames. An empty result is a valid
/// frame with nothing in it, not an error.
pub trait ObjectTracker {
    fn track(&mut self, frame: &Frame) -> Result<Vec<TrackedObject>>;

    /// Tracker name for logging.
    fn name(&self) -> &str;
}

/// Assemble tracked objects from the parallel arrays most tracking stacks
/// emit (ids, classes, boxes in lockstep).
///
/// Length mismatch between the slices means the tracker produced
/// inconsistent output for this frame; the caller drops the frame's
/// detections and keeps running.
pub fn from_raw_parts(
    ids: &[i64],
    classes: &[i64],
    boxes: &[BBox],
) -> Result<Vec<TrackedObject>, CounterError> {
    if ids.len() != classes.len() || ids.len() != boxes.len() {
        return Err(CounterError::TrackerOutput {
            ids: ids.len(),
            classes: classes.len(),
            boxes: boxes.len(),
        });
    }

    Ok(ids
        .iter()
        .zip(classes.iter())
        .zip(boxes.iter())
        .map(|((&track_id, &class_id), &bbox)| TrackedObject {
            track_id,
            class_id,
            bbox,
        })
        .collect())
}

/// Stub tracker that never detects anything.
///
/// Keeps the pipeline runnable without a model wired in; integrators
/// replace it with their own `ObjectTracker` implementation.
pub struct NullTracker;

impl NullTracker {
    pub fn new() -> Self {
        info!("⚪ No tracker wired — frames will carry zero detections");
        Self
    }
}

impl Default for NullTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTracker for NullTracker {
    fn track(&mut self, _frame: &Frame) -> Result<Vec<TrackedObject>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}
