//! Color-band ball detection feeding a core trajectory tracker

use crate::segment::{RegionMode, RegionSegmenter};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use cuevision_core::{
    BallIdentity, ColorRange, Detection, TrackedObject, TrackerConfig,
};
use opencv::{
    core::{Mat, Point2f},
    imgproc,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Detection and tracking parameters of one ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallConfig {
    /// Nominal HSV band of the ball
    pub color: ColorRange,
    /// Symmetric widening of the band on every channel
    pub sensitivity: i32,
    pub tracker: TrackerConfig,
}

impl BallConfig {
    /// Cue ball: pale, bright and low saturation
    pub fn primary() -> Self {
        Self {
            color: ColorRange::new([30, 20, 200], [55, 45, 233]),
            sensitivity: 10,
            tracker: TrackerConfig::primary(),
        }
    }

    /// Object ball: saturated blue
    pub fn secondary() -> Self {
        Self {
            color: ColorRange::new([100, 210, 100], [110, 220, 120]),
            sensitivity: 15,
            tracker: TrackerConfig::secondary(),
        }
    }

    /// Band actually used for thresholding
    pub fn band(&self) -> ColorRange {
        self.color.expanded(self.sensitivity)
    }
}

/// Finds one ball per frame and accumulates its track
pub struct BallTracker {
    config: BallConfig,
    object: TrackedObject,
}

impl BallTracker {
    pub fn new(config: BallConfig) -> Self {
        let object = TrackedObject::new(config.tracker);
        Self { config, object }
    }

    pub fn config(&self) -> &BallConfig {
        &self.config
    }

    pub fn identity(&self) -> BallIdentity {
        self.object.identity()
    }

    pub fn object(&self) -> &TrackedObject {
        &self.object
    }

    /// Binary mask of the ball band, before contour extraction
    pub fn mask(&self, hsv: &Mat) -> Result<Mat> {
        RegionSegmenter::threshold(hsv, &self.config.band())
    }

    /// Largest outer region of the ball band, fitted with its minimal
    /// enclosing circle. `None` when the band matches nothing.
    pub fn detect(&self, hsv: &Mat) -> Result<Option<Detection>> {
        let regions =
            RegionSegmenter::segment(hsv, &self.config.band(), None, RegionMode::External)?;

        let Some(region) = RegionSegmenter::select_largest(&regions) else {
            debug!(ball = ?self.identity(), "no ball region");
            return Ok(None);
        };

        let contour = ImageUtils::region_to_contour(region);
        let mut center = Point2f::default();
        let mut radius = 0.0f32;
        imgproc::min_enclosing_circle(&contour, &mut center, &mut radius)
            .context("Minimal enclosing circle fit failed")?;

        Ok(Some(Detection::from_circle(center.x, center.y, radius)))
    }

    /// Detect the ball in `hsv` and feed the result to the tracker
    pub fn update(&mut self, hsv: &Mat) -> Result<Option<Detection>> {
        let detection = self.detect(hsv)?;
        self.object.observe(detection);
        Ok(detection)
    }

    pub fn reset(&mut self) {
        self.object.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuevision_core::Point;
    use opencv::core::{self, Scalar, CV_8UC3};

    /// HSV canvas with filled discs of the given HSV color
    fn hsv_with_discs(discs: &[((i32, i32), i32)], color: [f64; 3]) -> Result<Mat> {
        let mut hsv = ImageUtils::filled(400, 300, CV_8UC3, Scalar::new(60.0, 200.0, 100.0, 0.0))?;
        for &((x, y), r) in discs {
            imgproc::circle(
                &mut hsv,
                core::Point::new(x, y),
                r,
                Scalar::new(color[0], color[1], color[2], 0.0),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
        }
        Ok(hsv)
    }

    const CUE: [f64; 3] = [40.0, 30.0, 215.0];

    #[test]
    fn test_detects_largest_disc() -> Result<()> {
        let hsv = hsv_with_discs(&[((50, 50), 4), ((200, 150), 10)], CUE)?;
        let tracker = BallTracker::new(BallConfig::primary());

        let detection = tracker.detect(&hsv)?.unwrap();
        assert!((detection.center.x - 200).abs() <= 1);
        assert!((detection.center.y - 150).abs() <= 1);
        assert!((detection.radius - 10.0).abs() < 1.5);
        Ok(())
    }

    #[test]
    fn test_no_detection_on_empty_band() -> Result<()> {
        let hsv = hsv_with_discs(&[], CUE)?;
        let mut tracker = BallTracker::new(BallConfig::primary());

        assert!(tracker.update(&hsv)?.is_none());
        assert!(tracker.object().trajectory().is_empty());
        assert!(tracker.object().last_known().is_none());
        Ok(())
    }

    #[test]
    fn test_sensitivity_widens_band() -> Result<()> {
        // just outside the nominal band, inside the widened one
        let hsv = hsv_with_discs(&[((100, 100), 6)], [25.0, 30.0, 215.0])?;

        let mut narrow = BallConfig::primary();
        narrow.sensitivity = 0;
        assert!(BallTracker::new(narrow).detect(&hsv)?.is_none());
        assert!(BallTracker::new(BallConfig::primary()).detect(&hsv)?.is_some());
        Ok(())
    }

    #[test]
    fn test_update_tracks_across_frames() -> Result<()> {
        let mut tracker = BallTracker::new(BallConfig::primary());

        for x in [100, 150, 300] {
            let hsv = hsv_with_discs(&[((x, 100), 8)], CUE)?;
            tracker.update(&hsv)?;
        }

        let trajectory = tracker.object().trajectory();
        assert_eq!(trajectory.len(), 2);
        assert!((trajectory[1].x - 150).abs() <= 1);
        let last = tracker.object().last_known().unwrap();
        assert!(last.distance(&Point::new(300, 100)) <= 1.5);
        Ok(())
    }
}
