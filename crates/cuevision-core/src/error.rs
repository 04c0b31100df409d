//! Recoverable per-frame conditions

use thiserror::Error;

use crate::color::Channel;

/// Conditions raised while processing a single frame.
///
/// None of these abort a run: the pipeline logs them, keeps its prior state
/// and moves on to the next frame. `EmptyFrameSource` is the clean end of a
/// run rather than a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisionError {
    #[error("frame source is exhausted")]
    EmptyFrameSource,

    #[error("no region found for {band} band")]
    NoRegionFound { band: String },

    #[error("table corners are collinear or coincident; homography is singular")]
    DegenerateCalibration,

    #[error("{channel:?} bounds [{lower}, {upper}] fall outside 0..={max}")]
    InvalidColorRange {
        channel: Channel,
        lower: i32,
        upper: i32,
        max: i32,
    },
}

impl VisionError {
    pub fn no_region(band: impl Into<String>) -> Self {
        Self::NoRegionFound { band: band.into() }
    }
}
