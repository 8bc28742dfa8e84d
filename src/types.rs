use opencv::core::Mat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub counting: CountingConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Video file path, or a webcam index given as a bare integer ("0").
    pub source: String,
    pub output_dir: String,
    pub save_annotated: bool,
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingConfig {
    /// Half-width of the crossing band around each line, in pixels.
    pub tolerance_px: f32,
    pub lines: Vec<LineSpec>,
}

/// Raw line endpoints as configured. Validated into `CountingLine` before
/// any frame is processed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineSpec {
    pub a: (f32, f32),
    pub b: (f32, f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub csv_path: String,
    pub jsonl_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One decoded frame plus its playback position.
pub struct Frame {
    pub mat: Mat,
    pub width: i32,
    pub height: i32,
    pub index: u64,
    /// Playback position in seconds, non-decreasing across the run.
    pub timestamp_secs: f64,
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Geometric center, used as the object's position proxy.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// One tracked object for one frame, as supplied by the external tracker.
/// Read-only for the counter; produced fresh every frame.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackedObject {
    pub track_id: i64,
    pub class_id: i64,
    pub bbox: BBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_center_is_midpoint() {
        let bbox = BBox::new(100.0, 200.0, 300.0, 400.0);
        assert_eq!(bbox.center(), (200.0, 300.0));
    }

    #[test]
    fn bbox_center_of_degenerate_box() {
        let bbox = BBox::new(50.0, 60.0, 50.0, 60.0);
        assert_eq!(bbox.center(), (50.0, 60.0));
    }
}
