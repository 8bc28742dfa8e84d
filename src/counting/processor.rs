// src/counting/processor.rs

use super::ledger::{CrossingLedger, LineCounters};
use super::line::CountingLine;
use super::recorder::{CrossingRecord, EventRecorder};
use crate::types::{BBox, TrackedObject};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Half-width of the crossing band around each line, in pixels.
    /// Default: 5.0 (a 10 px band).
    pub tolerance_px: f32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self { tolerance_px: 5.0 }
    }
}

/// Lifecycle of one counting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Source exhausted; normal termination.
    Ended,
    /// Externally interrupted (user quit). State is finalized as-is.
    Cancelled,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Ended => "ENDED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }
}

/// Read-only per-frame snapshot for the rendering and export collaborators.
#[derive(Debug, Clone)]
pub struct FrameSummary {
    /// (track id, box) per object in this frame, for the overlay.
    pub objects: Vec<(i64, BBox)>,
    /// Crossings confirmed on this frame, in detection order.
    pub new_crossings: Vec<CrossingRecord>,
    /// Current per-line counts, ordered by line index.
    pub counts: Vec<u64>,
}

/// Drives the counter for one run: evaluates every tracked object against
/// every configured line and applies the ledger → counter → recorder
/// sequence for each newly confirmed crossing.
///
/// All counting state is owned here, constructed empty per run. Frames are
/// applied one at a time on a single sequential path; a frame's effects are
/// fully applied before the next frame is seen.
pub struct FrameProcessor {
    lines: Vec<CountingLine>,
    config: ProcessorConfig,
    ledger: CrossingLedger,
    counters: LineCounters,
    recorder: EventRecorder,
    state: RunState,
}

impl FrameProcessor {
    /// `lines` carry their own validity by construction: only axis-aligned
    /// lines can exist, so there is nothing left to reject here.
    pub fn new(lines: Vec<CountingLine>, config: ProcessorConfig) -> Self {
        let num_lines = lines.len();
        Self {
            lines,
            config,
            ledger: CrossingLedger::new(),
            counters: LineCounters::new(num_lines),
            recorder: EventRecorder::new(),
            state: RunState::Idle,
        }
    }

    /// Enter `Running`. Called once a valid frame source exists.
    pub fn start(&mut self) {
        if self.state == RunState::Idle {
            self.state = RunState::Running;
        }
    }

    /// Apply one frame's detections at the given playback position.
    ///
    /// An empty `objects` slice is a normal no-op frame. Returns the
    /// annotation snapshot for this frame; the snapshot is a copy, never a
    /// view into internal state.
    pub fn process_frame(
        &mut self,
        objects: &[TrackedObject],
        timestamp_secs: f64,
    ) -> FrameSummary {
        if self.state.is_terminal() {
            warn!(
                "process_frame called in {} state; frame ignored",
                self.state.as_str()
            );
            return self.snapshot(Vec::new(), Vec::new());
        }
        if self.state == RunState::Idle {
            self.state = RunState::Running;
        }

        let mut new_crossings = Vec::new();

        for object in objects {
            let center = object.bbox.center();

            for line in &self.lines {
                if !line.is_crossing(center, self.config.tolerance_px) {
                    continue;
                }
                if !self.ledger.try_record(object.track_id, line.index()) {
                    continue;
                }

                self.counters.increment(line.index());
                let record = self
                    .recorder
                    .record(object.track_id, line.index(), timestamp_secs);

                info!(
                    "🚗 Vehicle {} crossed line {} → Count: {}",
                    record.track_id,
                    record.line_number,
                    self.counters.get(line.index())
                );
                new_crossings.push(record);
            }
        }

        let objects = objects.iter().map(|o| (o.track_id, o.bbox)).collect();
        self.snapshot(objects, new_crossings)
    }

    /// Source exhausted: Running → Ended. No further frames are processed;
    /// ledger, counters and records are finalized as-is.
    pub fn finish(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Ended;
        }
    }

    /// External stop signal: Running → Cancelled. No rollback.
    pub fn cancel(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Cancelled;
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn lines(&self) -> &[CountingLine] {
        &self.lines
    }

    pub fn counts(&self) -> &[u64] {
        self.counters.all()
    }

    pub fn total_count(&self) -> u64 {
        self.counters.total()
    }

    pub fn records(&self) -> &[CrossingRecord] {
        self.recorder.records()
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    fn snapshot(
        &self,
        objects: Vec<(i64, BBox)>,
        new_crossings: Vec<CrossingRecord>,
    ) -> FrameSummary {
        FrameSummary {
            objects,
            new_crossings,
            counts: self.counters.all().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_at(index: usize, y: f32) -> CountingLine {
        CountingLine::new(index, (100.0, y), (900.0, y)).unwrap()
    }

    fn vertical_at(index: usize, x: f32) -> CountingLine {
        CountingLine::new(index, (x, 0.0), (x, 720.0)).unwrap()
    }

    fn object(track_id: i64, cx: f32, cy: f32) -> TrackedObject {
        // A 40x40 box centered at (cx, cy).
        TrackedObject {
            track_id,
            class_id: 2,
            bbox: BBox::new(cx - 20.0, cy - 20.0, cx + 20.0, cy + 20.0),
        }
    }

    fn processor(lines: Vec<CountingLine>) -> FrameProcessor {
        FrameProcessor::new(lines, ProcessorConfig::default())
    }

    #[test]
    fn track_in_band_for_several_frames_counts_once() {
        // Line at y=500, tolerance ±5. Track 7 sits at y=503, then 498
        // (still in band), then 520 (out). Exactly one record at 2.00s.
        let mut p = processor(vec![horizontal_at(0, 500.0)]);

        let s1 = p.process_frame(&[object(7, 400.0, 503.0)], 2.00);
        assert_eq!(s1.new_crossings.len(), 1);
        let s2 = p.process_frame(&[object(7, 400.0, 498.0)], 2.04);
        assert!(s2.new_crossings.is_empty());
        let s3 = p.process_frame(&[object(7, 400.0, 520.0)], 2.08);
        assert!(s3.new_crossings.is_empty());

        assert_eq!(p.counts(), &[1]);
        assert_eq!(p.records().len(), 1);
        let record = p.records()[0];
        assert_eq!(record.track_id, 7);
        assert_eq!(record.line_number, 1);
        assert_eq!(record.timestamp_label(), "2.00s");
    }

    #[test]
    fn lines_count_independently() {
        // Track 3 crosses line 0 at 1.00s and line 1 at 3.00s.
        let mut p = processor(vec![horizontal_at(0, 500.0), vertical_at(1, 200.0)]);

        p.process_frame(&[object(3, 400.0, 500.0)], 1.00);
        p.process_frame(&[object(3, 300.0, 300.0)], 2.00);
        p.process_frame(&[object(3, 200.0, 300.0)], 3.00);

        assert_eq!(p.counts(), &[1, 1]);
        assert_eq!(p.records().len(), 2);
        assert_eq!(p.records()[0].line_number, 1);
        assert_eq!(p.records()[1].line_number, 2);
        assert_eq!(p.records()[1].timestamp_label(), "3.00s");
        assert_eq!(p.ledger_len(), 2);
    }

    #[test]
    fn empty_frames_are_a_no_op() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        for i in 0..10 {
            let summary = p.process_frame(&[], i as f64 * 0.04);
            assert!(summary.objects.is_empty());
            assert!(summary.new_crossings.is_empty());
            assert_eq!(summary.counts, vec![0]);
        }
        assert_eq!(p.total_count(), 0);
        assert!(p.records().is_empty());
        assert_eq!(p.state(), RunState::Running);
    }

    #[test]
    fn recrossing_same_line_is_idempotent() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);

        p.process_frame(&[object(7, 400.0, 500.0)], 1.0);
        // Leaves the band, then comes back later.
        p.process_frame(&[object(7, 400.0, 600.0)], 2.0);
        let summary = p.process_frame(&[object(7, 400.0, 501.0)], 3.0);

        assert!(summary.new_crossings.is_empty());
        assert_eq!(p.counts(), &[1]);
        assert_eq!(p.records().len(), 1);
    }

    #[test]
    fn distinct_tracks_count_separately_on_one_line() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);

        let summary = p.process_frame(
            &[object(1, 300.0, 500.0), object(2, 600.0, 502.0)],
            1.0,
        );
        assert_eq!(summary.new_crossings.len(), 2);
        assert_eq!(p.counts(), &[2]);
    }

    #[test]
    fn one_object_can_cross_two_overlapping_lines_in_one_frame() {
        // A horizontal and a vertical line meeting near (200, 500).
        let mut p = processor(vec![horizontal_at(0, 500.0), vertical_at(1, 200.0)]);

        let summary = p.process_frame(&[object(9, 201.0, 499.0)], 4.0);
        assert_eq!(summary.new_crossings.len(), 2);
        assert_eq!(p.counts(), &[1, 1]);
    }

    #[test]
    fn counts_are_monotonic_over_the_run() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        let mut last_total = 0;
        let mut last_ledger = 0;

        for i in 0..20 {
            let y = if i % 4 == 0 { 500.0 } else { 600.0 };
            p.process_frame(&[object(i, 400.0, y)], i as f64 * 0.04);
            assert!(p.total_count() >= last_total);
            assert!(p.ledger_len() >= last_ledger);
            last_total = p.total_count();
            last_ledger = p.ledger_len();
        }
    }

    #[test]
    fn ledger_size_matches_total_events() {
        let mut p = processor(vec![horizontal_at(0, 500.0), vertical_at(1, 200.0)]);
        p.process_frame(&[object(1, 200.0, 500.0)], 1.0);
        p.process_frame(&[object(2, 400.0, 500.0)], 2.0);
        p.process_frame(&[object(2, 400.0, 500.0)], 3.0);

        assert_eq!(p.ledger_len(), p.records().len());
        assert_eq!(p.ledger_len() as u64, p.total_count());
    }

    #[test]
    fn record_timestamps_follow_frame_order() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        for (i, t) in [1.0, 1.5, 2.0, 2.5].iter().enumerate() {
            p.process_frame(&[object(i as i64, 400.0, 500.0)], *t);
        }
        let records = p.records();
        for pair in records.windows(2) {
            assert!(pair[0].timestamp_secs <= pair[1].timestamp_secs);
        }
    }

    #[test]
    fn run_state_transitions() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        assert_eq!(p.state(), RunState::Idle);

        p.start();
        assert_eq!(p.state(), RunState::Running);

        p.process_frame(&[object(1, 400.0, 500.0)], 1.0);
        p.finish();
        assert_eq!(p.state(), RunState::Ended);

        // Terminal state sticks.
        p.cancel();
        assert_eq!(p.state(), RunState::Ended);
    }

    #[test]
    fn cancellation_finalizes_state_as_is() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        p.start();
        p.process_frame(&[object(1, 400.0, 500.0)], 1.0);
        p.cancel();

        assert_eq!(p.state(), RunState::Cancelled);
        assert_eq!(p.counts(), &[1]);
        assert_eq!(p.records().len(), 1);

        // Frames after cancellation are ignored, state unchanged.
        let summary = p.process_frame(&[object(2, 400.0, 500.0)], 2.0);
        assert!(summary.new_crossings.is_empty());
        assert_eq!(p.counts(), &[1]);
    }

    #[test]
    fn snapshot_reflects_objects_and_counts() {
        let mut p = processor(vec![horizontal_at(0, 500.0)]);
        let summary = p.process_frame(&[object(5, 400.0, 300.0)], 1.0);

        assert_eq!(summary.objects.len(), 1);
        assert_eq!(summary.objects[0].0, 5);
        assert_eq!(summary.counts, vec![0]);
    }
}
