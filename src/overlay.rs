// src/overlay.rs
//
// Per-frame annotation for the preview window and the saved output video.
// Draws from the processor's read-only snapshot, never from its state.

use crate::counting::{CountingLine, FrameSummary};
use anyhow::Result;
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    imgproc,
};

const BOX_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0); // green, BGR
const LINE_COLOR: (f64, f64, f64) = (255.0, 0.0, 0.0); // blue, BGR
const COUNT_COLOR: (f64, f64, f64) = (0.0, 0.0, 255.0); // red, BGR

fn scalar(bgr: (f64, f64, f64)) -> Scalar {
    Scalar::new(bgr.0, bgr.1, bgr.2, 0.0)
}

/// Draw detection boxes, track ids, counting lines and per-line counts.
pub fn draw_annotations(
    frame: &mut Mat,
    summary: &FrameSummary,
    lines: &[CountingLine],
) -> Result<()> {
    for (track_id, bbox) in &summary.objects {
        let rect = Rect::new(
            bbox.x_min as i32,
            bbox.y_min as i32,
            (bbox.x_max - bbox.x_min) as i32,
            (bbox.y_max - bbox.y_min) as i32,
        );
        imgproc::rectangle(frame, rect, scalar(BOX_COLOR), 2, imgproc::LINE_8, 0)?;
        imgproc::put_text(
            frame,
            &format!("ID: {}", track_id),
            Point::new(bbox.x_min as i32, bbox.y_min as i32 - 10),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            scalar(BOX_COLOR),
            2,
            imgproc::LINE_8,
            false,
        )?;
    }

    for line in lines {
        let (a, b) = line.endpoints();
        imgproc::line(
            frame,
            Point::new(a.0 as i32, a.1 as i32),
            Point::new(b.0 as i32, b.1 as i32),
            scalar(LINE_COLOR),
            2,
            imgproc::LINE_8,
            0,
        )?;

        let count = summary.counts.get(line.index()).copied().unwrap_or(0);
        imgproc::put_text(
            frame,
            &format!("Lane {} Count: {}", line.line_number(), count),
            Point::new(a.0 as i32 + 20, a.1 as i32 - 20),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.8,
            scalar(COUNT_COLOR),
            2,
            imgproc::LINE_8,
            false,
        )?;
    }

    Ok(())
}
