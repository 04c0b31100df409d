//! Video file and image sequence output

use super::VideoError;
use crate::traits::FrameSink;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoWriter},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Frame rate of the annotated video when the input does not report one
pub const DEFAULT_OUTPUT_FPS: f64 = 10.0;

/// MJPG video writer opened on the first frame so it takes that frame's size
pub struct VideoFileSink {
    path: PathBuf,
    fps: f64,
    writer: Option<VideoWriter>,
    frame_size: Option<Size>,
    frames_written: u64,
}

impl VideoFileSink {
    pub fn new<P: AsRef<Path>>(path: P, fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_OUTPUT_FPS
        };
        Self {
            path: path.as_ref().to_path_buf(),
            fps,
            writer: None,
            frame_size: None,
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn open(&mut self, size: Size) -> Result<&mut VideoWriter> {
        let path_str = self.path.to_string_lossy().into_owned();
        let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G')?;
        let writer = VideoWriter::new(&path_str, fourcc, self.fps, size, true)
            .with_context(|| format!("Failed to create video writer: {}", path_str))?;
        if !writer.is_opened()? {
            return Err(VideoError::WriterFailed {
                path: self.path.clone(),
            }
            .into());
        }

        info!(path = %path_str, width = size.width, height = size.height, fps = self.fps, "video writer opened");
        self.frame_size = Some(size);
        Ok(self.writer.insert(writer))
    }
}

impl FrameSink for VideoFileSink {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        let size = frame.size()?;
        if let Some(expected) = self.frame_size {
            if expected != size {
                anyhow::bail!(
                    "Frame size {}x{} does not match video size {}x{}",
                    size.width,
                    size.height,
                    expected.width,
                    expected.height
                );
            }
        }

        let writer = match self.writer {
            Some(ref mut writer) => writer,
            None => self.open(size)?,
        };
        writer.write(frame).context("Failed to write video frame")?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.release().context("Failed to finalize video")?;
            info!(path = ?self.path, frames = self.frames_written, "video written");
        }
        Ok(())
    }
}

/// Writes frames as `prefix_000123.png` files, keeping every `stride`-th frame
pub struct ImageSequenceSink {
    dir: PathBuf,
    prefix: String,
    stride: u64,
    received: u64,
    written: u64,
}

impl ImageSequenceSink {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str, stride: u64) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            stride: stride.max(1),
            received: 0,
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the image for the `index`-th received frame
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}_{:06}.png", self.prefix, index))
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        let index = self.received;
        self.received += 1;
        if index % self.stride != 0 {
            return Ok(());
        }

        let path = self.frame_path(index);
        ImageUtils::write_png(frame, &path)?;
        debug!(path = ?path, "image written");
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cuevision-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_image_sequence_names_and_stride() -> Result<()> {
        let dir = scratch_dir("sequence");
        let mut sink = ImageSequenceSink::new(&dir, "overhead", 2)?;
        let frame = ImageUtils::filled(16, 32, CV_8UC3, Scalar::new(0.0, 255.0, 0.0, 0.0))?;

        for _ in 0..5 {
            sink.write_frame(&frame)?;
        }

        assert_eq!(sink.written(), 3);
        assert!(dir.join("overhead_000000.png").exists());
        assert!(!dir.join("overhead_000001.png").exists());
        assert!(dir.join("overhead_000004.png").exists());

        let loaded = opencv::imgcodecs::imread(
            &dir.join("overhead_000002.png").to_string_lossy(),
            opencv::imgcodecs::IMREAD_COLOR,
        )?;
        assert_eq!(loaded.size()?, Size::new(16, 32));

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        assert_eq!(VideoFileSink::new("out.avi", 0.0).fps(), DEFAULT_OUTPUT_FPS);
        assert_eq!(VideoFileSink::new("out.avi", f64::NAN).fps(), DEFAULT_OUTPUT_FPS);
        assert_eq!(VideoFileSink::new("out.avi", 30.0).fps(), 30.0);
    }

    #[test]
    fn test_finish_without_frames_is_noop() -> Result<()> {
        let mut sink = VideoFileSink::new(scratch_dir("unused").join("out.avi"), 25.0);
        sink.finish()?;
        assert_eq!(sink.frames_written(), 0);
        Ok(())
    }
}
