// src/video.rs

use crate::error::CounterError;
use crate::types::{Frame, VideoConfig};
use anyhow::Result;
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where frames come from: a video file or a live camera.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    File(PathBuf),
    Camera(i32),
}

impl SourceSpec {
    /// Parse the configured source string: a bare integer selects a webcam,
    /// anything else is a file path. A missing file falls back to webcam 0,
    /// matching the historical behavior of this tool.
    pub fn parse(source: &str) -> Self {
        if let Ok(index) = source.parse::<i32>() {
            return Self::Camera(index);
        }
        let path = PathBuf::from(source);
        if path.exists() {
            Self::File(path)
        } else {
            warn!(
                "⚠️ Video file '{}' not found. Switching to webcam...",
                source
            );
            Self::Camera(0)
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Camera(_))
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Camera(index) => write!(f, "camera:{}", index),
        }
    }
}

pub struct VideoSource {
    cap: VideoCapture,
    spec: SourceSpec,
    pub fps: f64,
    pub total_frames: i32,
    pub width: i32,
    pub height: i32,
    current_frame: u64,
    last_timestamp_secs: f64,
}

impl VideoSource {
    pub fn open(source: &str) -> Result<Self, CounterError> {
        let spec = SourceSpec::parse(source);
        info!("Opening video source: {}", spec);

        let cap = match &spec {
            SourceSpec::File(path) => {
                VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            }
            SourceSpec::Camera(index) => VideoCapture::new(*index, videoio::CAP_ANY),
        }
        .map_err(|e| CounterError::Source {
            spec: spec.to_string(),
            reason: e.to_string(),
        })?;

        let opened = cap.is_opened().map_err(|e| CounterError::Source {
            spec: spec.to_string(),
            reason: e.to_string(),
        })?;
        if !opened {
            return Err(CounterError::Source {
                spec: spec.to_string(),
                reason: "capture did not open".to_string(),
            });
        }

        let prop = |id: i32| cap.get(id).unwrap_or(0.0);
        let mut fps = prop(videoio::CAP_PROP_FPS);
        if fps <= 0.0 {
            fps = 30.0;
        }
        let total_frames = prop(videoio::CAP_PROP_FRAME_COUNT) as i32;
        let mut width = prop(videoio::CAP_PROP_FRAME_WIDTH) as i32;
        let mut height = prop(videoio::CAP_PROP_FRAME_HEIGHT) as i32;
        if width <= 0 {
            width = 640;
        }
        if height <= 0 {
            height = 480;
        }

        info!(
            "Video properties: {}x{} @ {:.1} FPS, {} frames",
            width, height, fps, total_frames
        );

        Ok(Self {
            cap,
            spec,
            fps,
            total_frames,
            width,
            height,
            current_frame: 0,
            last_timestamp_secs: 0.0,
        })
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    pub fn is_live(&self) -> bool {
        self.spec.is_live()
    }

    /// Read the next frame. `Ok(None)` means the stream ended — normal
    /// termination, not a fault.
    ///
    /// The playback timestamp comes from the capture's position clock; when
    /// a backend reports no position (some webcams), frame index over fps
    /// stands in. Either way the timestamps handed out are non-decreasing.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut mat = Mat::default();
        if !self.cap.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }

        let position_msec = self.cap.get(videoio::CAP_PROP_POS_MSEC)?;
        self.current_frame += 1;

        let timestamp_secs = if position_msec > 0.0 {
            position_msec / 1000.0
        } else {
            self.current_frame as f64 / self.fps
        };
        let timestamp_secs = timestamp_secs.max(self.last_timestamp_secs);
        self.last_timestamp_secs = timestamp_secs;

        Ok(Some(Frame {
            mat,
            width: self.width,
            height: self.height,
            index: self.current_frame,
            timestamp_secs,
        }))
    }

    pub fn progress(&self) -> f32 {
        if self.total_frames <= 0 {
            return 0.0;
        }
        (self.current_frame as f32 / self.total_frames as f32) * 100.0
    }
}

/// Create the annotated-output writer, if configured and the source is a
/// file. Live sources are never recorded.
pub fn create_writer(
    config: &VideoConfig,
    source: &VideoSource,
) -> Result<Option<VideoWriter>> {
    if !config.save_annotated || source.is_live() {
        return Ok(None);
    }

    std::fs::create_dir_all(&config.output_dir)?;

    let stem = match source.spec() {
        SourceSpec::File(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string()),
        SourceSpec::Camera(_) => return Ok(None),
    };
    let output_path = Path::new(&config.output_dir).join(format!("{}_counted.mp4", stem));

    info!("Output video: {}", output_path.display());

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let writer = VideoWriter::new(
        &output_path.to_string_lossy(),
        fourcc,
        source.fps,
        Size::new(source.width, source.height),
        true,
    )?;

    Ok(Some(writer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_integer_selects_camera() {
        assert!(matches!(SourceSpec::parse("0"), SourceSpec::Camera(0)));
        assert!(matches!(SourceSpec::parse("2"), SourceSpec::Camera(2)));
    }

    #[test]
    fn missing_file_falls_back_to_webcam() {
        let spec = SourceSpec::parse("definitely_not_here.mp4");
        assert!(matches!(spec, SourceSpec::Camera(0)));
        assert!(spec.is_live());
    }

    #[test]
    fn unopenable_source_is_a_source_error() {
        // No backend has a camera at index 999.
        let err = VideoSource::open("999").unwrap_err();
        assert!(matches!(err, CounterError::Source { .. }));
    }
}
