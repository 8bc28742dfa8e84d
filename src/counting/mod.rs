// src/counting/mod.rs
//
// The crossing-event counter. Everything stateful about counting lives
// here, owned by the FrameProcessor and constructed fresh per run.

mod ledger;
mod line;
mod processor;
mod recorder;

pub use ledger::{CrossingKey, CrossingLedger, LineCounters};
pub use line::{CountingLine, LineOrientation};
pub use processor::{FrameProcessor, FrameSummary, ProcessorConfig, RunState};
pub use recorder::{CrossingRecord, EventRecorder};
