//! Video file input

use super::VideoError;
use crate::traits::FrameSource;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads BGR frames from a video file until the stream ends
pub struct VideoFileSource {
    path: PathBuf,
    capture: VideoCapture,
    fps: f64,
    frames_read: u64,
}

impl VideoFileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let path_str = path.to_string_lossy();

        let capture = VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video: {}", path_str))?;
        if !capture.is_opened()? {
            return Err(VideoError::OpenFailed { path }.into());
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        info!(path = %path_str, width, height, fps, "video opened");

        Ok(Self {
            path,
            capture,
            fps,
            frames_read: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frame rate reported by the container, 0 when unknown
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .with_context(|| format!("Failed to read frame {} of {:?}", self.frames_read, self.path))?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        self.frames_read += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_fatal() {
        let path = std::env::temp_dir().join("cuevision-no-such-video.avi");
        assert!(VideoFileSource::open(&path).is_err());
    }
}
