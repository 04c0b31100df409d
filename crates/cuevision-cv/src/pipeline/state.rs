//! Per-run pipeline state and the single-frame processing step

use super::config::PipelineConfig;
use crate::calibration::TableCalibrator;
use crate::overlay::Overlay;
use crate::tracking::BallTracker;
use crate::utils::ImageUtils;
use crate::Result;
use cuevision_core::{CollisionDetector, CollisionEvent, VisionError};
use opencv::{
    core::{self, Mat},
    prelude::*,
};
use tracing::{debug, info, warn};

/// Everything produced for one input frame
#[derive(Debug)]
pub struct FrameOutput {
    /// Input frame (resized) with tracking overlays
    pub annotated: Mat,
    /// Overhead view of the annotated frame; the previous one when this
    /// frame could not be rectified
    pub overhead: Option<Mat>,
    /// Frame with the ball masks and table contours, when the debug overlay
    /// is enabled
    pub debug: Option<Mat>,
    /// Contact triggered on this frame
    pub collision: Option<CollisionEvent>,
    /// Contact midpoint in overhead coordinates
    pub overhead_contact: Option<(f32, f32)>,
}

/// Owns all cross-frame state: trackers, collision latch and calibration
/// memory. Mutated only by [`FramePipeline::process`] and
/// [`FramePipeline::reset_tracks`].
pub struct FramePipeline {
    config: PipelineConfig,
    primary: BallTracker,
    secondary: BallTracker,
    collision: CollisionDetector,
    calibrator: TableCalibrator,
    overlay: Overlay,
    frames_processed: u64,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            primary: BallTracker::new(config.primary.clone()),
            secondary: BallTracker::new(config.secondary.clone()),
            collision: CollisionDetector::new(config.collision_distance),
            calibrator: TableCalibrator::new(config.calibration.clone()),
            overlay: Overlay::new(config.visualization.clone()),
            frames_processed: 0,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn primary(&self) -> &BallTracker {
        &self.primary
    }

    pub fn secondary(&self) -> &BallTracker {
        &self.secondary
    }

    pub fn collision(&self) -> &CollisionDetector {
        &self.collision
    }

    pub fn calibrator(&self) -> &TableCalibrator {
        &self.calibrator
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Clear trajectories and collision markers. Calibration memory is kept.
    pub fn reset_tracks(&mut self) {
        self.primary.reset();
        self.secondary.reset();
        self.collision.reset();
        info!(frame = self.frames_processed, "tracks reset");
    }

    /// Run every stage on one BGR frame.
    ///
    /// Calibration failures are recovered here; only OpenCV failures on the
    /// frame itself are returned.
    pub fn process(&mut self, frame: &Mat) -> Result<FrameOutput> {
        let frame = match self.config.frame_size {
            Some((width, height)) => ImageUtils::resize(frame, width, height)?,
            None => frame.try_clone()?,
        };
        let hsv = ImageUtils::to_hsv(&frame)?;

        self.primary.update(&hsv)?;
        let collision = if self.config.features.track_secondary {
            self.secondary.update(&hsv)?;
            self.collision
                .step_trackers(self.primary.object(), self.secondary.object())
        } else {
            None
        };

        let mut annotated = frame.try_clone()?;
        self.render(&mut annotated)?;

        let overhead = if self.config.features.overhead {
            self.rectify(&hsv, &annotated)?
        } else {
            if self.config.features.debug_overlay {
                // contours for the debug view only
                if let Err(err) = self.calibrator.observe(&hsv) {
                    debug!(frame = self.frames_processed, error = %err, "no table contours");
                }
            }
            None
        };

        let overhead_contact = match (collision, self.calibrator.last_calibration()) {
            (Some(event), Some(calibration)) if overhead.is_some() => calibration
                .project(&[event.contact])?
                .first()
                .copied(),
            _ => None,
        };

        let debug = if self.config.features.debug_overlay {
            Some(self.render_debug(&hsv, &frame)?)
        } else {
            None
        };

        self.frames_processed += 1;

        Ok(FrameOutput {
            annotated,
            overhead,
            debug,
            collision,
            overhead_contact,
        })
    }

    fn render(&self, frame: &mut Mat) -> Result<()> {
        if let Some(detection) = self.primary.object().current() {
            self.overlay.draw_detection(frame, detection)?;
        }
        if self.config.features.track_secondary {
            if let Some(detection) = self.secondary.object().current() {
                self.overlay.draw_detection(frame, detection)?;
            }
        }
        if let Some(event) = self.collision.latched() {
            self.overlay.draw_collision(frame, event)?;
        }

        self.overlay
            .draw_primary_trajectory(frame, self.primary.object().trajectory())?;
        self.overlay
            .draw_secondary_trajectory(frame, self.secondary.object().trajectory())?;
        Ok(())
    }

    /// Overhead image for this frame, falling back to the previous one on a
    /// recoverable calibration failure
    fn rectify(&mut self, hsv: &Mat, annotated: &Mat) -> Result<Option<Mat>> {
        match self.calibrator.update(hsv, annotated) {
            Ok(overhead) => Ok(Some(overhead.try_clone()?)),
            Err(err) => {
                match err.downcast_ref::<VisionError>() {
                    Some(VisionError::NoRegionFound { .. }) => {
                        debug!(frame = self.frames_processed, error = %err, "overhead skipped")
                    }
                    _ => warn!(frame = self.frames_processed, error = %err, "overhead skipped"),
                }
                self.calibrator
                    .last_overhead()
                    .map(|previous| previous.try_clone())
                    .transpose()
                    .map_err(Into::into)
            }
        }
    }

    fn render_debug(&self, hsv: &Mat, frame: &Mat) -> Result<Mat> {
        let mut debug = frame.try_clone()?;
        let mut mask = self.primary.mask(hsv)?;
        if self.config.features.track_secondary {
            let primary = mask;
            mask = Mat::default();
            core::bitwise_or(&primary, &self.secondary.mask(hsv)?, &mut mask, &core::no_array())?;
        }
        self.overlay
            .draw_regions(&mut debug, self.calibrator.frame_regions())?;
        if let Some(calibration) = self.calibrator.last_calibration() {
            self.overlay.draw_table(&mut debug, &calibration.corners)?;
        }
        self.overlay.draw_mask(&mut debug, &mask)?;
        Ok(debug)
    }
}
