// src/main.rs

mod config;
mod counting;
mod error;
mod export;
mod overlay;
mod tracker;
mod types;
mod video;

use anyhow::Result;
use counting::{FrameProcessor, ProcessorConfig, RunState};
use opencv::{highgui, prelude::*};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};
use tracker::{NullTracker, ObjectTracker};
use types::Config;
use video::VideoSource;

const PREVIEW_WINDOW: &str = "Traffic Counter";

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("traffic_counter={}", config.logging.level))
        .init();

    info!("🚦 Traffic Counter Starting");
    info!("✓ Configuration loaded from {}", config_path);

    let stats = run(&config)?;

    info!("\n📊 Final Report:");
    info!("  Total frames: {}", stats.total_frames);
    for (index, count) in stats.counts.iter().enumerate() {
        info!("  Lane {} count: {}", index + 1, count);
    }
    info!("  🚗 Total crossings: {}", stats.total_crossings);
    info!("  Records exported: {}", stats.records);
    if stats.malformed_frames > 0 {
        warn!(
            "  ⚠️  Frames with malformed tracker output: {}",
            stats.malformed_frames
        );
    }
    if stats.export_failures > 0 {
        warn!("  ⚠️  Export failures: {}", stats.export_failures);
    }
    info!("  Run finished as: {}", stats.final_state.as_str());
    info!("  Processing Speed: {:.1} FPS", stats.avg_fps);
    info!("✅ Project execution complete.");

    Ok(())
}

struct ProcessingStats {
    total_frames: u64,
    counts: Vec<u64>,
    total_crossings: u64,
    records: usize,
    malformed_frames: u64,
    export_failures: usize,
    final_state: RunState,
    duration_secs: f64,
    avg_fps: f64,
}

fn run(config: &Config) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    // Fail fast: bad line geometry aborts before any frame is read.
    let lines = config.counting_lines()?;
    info!("✓ {} counting line(s) configured", lines.len());

    let mut source = VideoSource::open(&config.video.source)?;
    let mut writer = video::create_writer(&config.video, &source)?;

    let mut tracker = NullTracker::new();
    info!("✓ Tracker ready: {}", tracker.name());

    let mut processor = FrameProcessor::new(
        lines,
        ProcessorConfig {
            tolerance_px: config.counting.tolerance_px,
        },
    );
    processor.start();

    let mut display_enabled = config.video.preview;
    if display_enabled {
        if let Err(err) = highgui::named_window(PREVIEW_WINDOW, highgui::WINDOW_AUTOSIZE) {
            warn!("Failed to open preview window: {}. Running headless.", err);
            display_enabled = false;
        } else {
            info!("✅ Starting detection... Press 'q' to quit.");
        }
    }

    let mut total_frames: u64 = 0;
    let mut malformed_frames: u64 = 0;

    while let Some(mut frame) = source.read_frame()? {
        total_frames += 1;

        // A tracker fault degrades to an empty frame; the run stays alive.
        let objects = match tracker.track(&frame) {
            Ok(objects) => objects,
            Err(e) => {
                warn!(
                    "Tracker failed on frame {}: {} — skipping detections",
                    frame.index, e
                );
                malformed_frames += 1;
                Vec::new()
            }
        };

        let summary = processor.process_frame(&objects, frame.timestamp_secs);

        if writer.is_some() || display_enabled {
            overlay::draw_annotations(&mut frame.mat, &summary, processor.lines())?;
        }

        if let Some(ref mut w) = writer {
            w.write(&frame.mat)?;
        }

        if display_enabled {
            highgui::imshow(PREVIEW_WINDOW, &frame.mat)?;
            let key = highgui::wait_key(1)?;
            if key == 113 || key == 27 {
                info!("Stop requested by user");
                processor.cancel();
                break;
            }
        }

        if total_frames % 50 == 0 && !source.is_live() {
            info!(
                "Progress: {:.1}% | counts: {:?}",
                source.progress(),
                processor.counts()
            );
        }
    }

    if processor.state() == RunState::Running {
        info!("✔️ End of video stream.");
        processor.finish();
    }

    // Export whatever was counted, even on cancellation. A failed export is
    // reported but never invalidates the in-memory results.
    let mut export_failures = 0;
    if let Err(e) = export::write_csv(Path::new(&config.export.csv_path), processor.records()) {
        error!("❌ Error saving CSV file: {}", e);
        export_failures += 1;
    }
    if let Err(e) = export::write_jsonl(Path::new(&config.export.jsonl_path), processor.records())
    {
        error!("❌ Error saving event stream: {}", e);
        export_failures += 1;
    }

    let duration_secs = start_time.elapsed().as_secs_f64();
    let avg_fps = if duration_secs > 0.0 {
        total_frames as f64 / duration_secs
    } else {
        0.0
    };

    Ok(ProcessingStats {
        total_frames,
        counts: processor.counts().to_vec(),
        total_crossings: processor.total_count(),
        records: processor.records().len(),
        malformed_frames,
        export_failures,
        final_state: processor.state(),
        duration_secs,
        avg_fps,
    })
}
