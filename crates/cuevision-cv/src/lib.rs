//! Cuevision Computer Vision Library
//!
//! Table rectification and ball tracking over OpenCV frames, built on the
//! image-library-free types of `cuevision-core`.

pub mod calibration;
pub mod overlay;
pub mod pipeline;
pub mod profile;
pub mod segment;
pub mod tracking;
pub mod utils;
pub mod video;

// Re-export commonly used types
pub use calibration::{TableCalibration, TableCalibrator};
pub use pipeline::{FrameOutput, FramePipeline, PipelineConfig, RunSummary};
pub use profile::ColorProfiler;
pub use segment::{RegionMode, RegionSegmenter};
pub use tracking::{BallConfig, BallTracker};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Seams between the pipeline and the outside world
pub mod traits {
    use super::*;
    use opencv::core::Mat;

    /// Commands delivered at frame boundaries
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Command {
        Quit,
        /// Clear trajectories and collision markers; calibration is kept
        ResetTracks,
    }

    /// Sequential supplier of BGR frames
    pub trait FrameSource {
        /// Next frame, or `None` once the stream is exhausted
        fn next_frame(&mut self) -> Result<Option<Mat>>;
    }

    /// Sequential, order-preserving consumer of frames
    pub trait FrameSink {
        fn write_frame(&mut self, frame: &Mat) -> Result<()>;

        fn finish(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Source of user commands, polled once per frame
    pub trait CommandSource {
        fn poll(&mut self, frame_index: u64) -> Option<Command>;
    }
}
