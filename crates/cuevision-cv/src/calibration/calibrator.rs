//! Largest-region table calibration with cross-frame memory

use super::CalibrationConfig;
use crate::profile::ColorProfiler;
use crate::segment::{RegionMode, RegionSegmenter};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use cuevision_core::{DestinationSize, Point, Region, TableCorners, VisionError};
use opencv::{
    core::{self, Mat, Point2f, Scalar, Size, Vector},
    imgproc,
    prelude::*,
};
use tracing::info;

/// Homographies with a smaller determinant magnitude are treated as singular
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Result of calibrating one frame
#[derive(Debug, Clone)]
pub struct TableCalibration {
    pub corners: TableCorners,
    pub size: DestinationSize,
    /// 3x3 CV_64F perspective transform from frame to overhead coordinates
    pub homography: Mat,
}

impl TableCalibration {
    /// Build the perspective transform for a set of corners.
    ///
    /// Fails with `DegenerateCalibration` when the corners cannot span a
    /// rectangle or the resulting matrix is singular.
    pub fn from_corners(corners: TableCorners) -> Result<Self> {
        corners.ensure_non_degenerate()?;
        let size = corners.destination_size();

        let src: Vector<Point2f> = corners
            .as_array()
            .iter()
            .map(ImageUtils::to_cv_point2f)
            .collect();
        let dst: Vector<Point2f> = size
            .corners()
            .iter()
            .map(|&(x, y)| Point2f::new(x, y))
            .collect();

        let homography = imgproc::get_perspective_transform_def(&src, &dst)
            .context("Failed to compute perspective transform")?;

        let det = core::determinant(&homography)?;
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return Err(VisionError::DegenerateCalibration.into());
        }

        Ok(Self {
            corners,
            size,
            homography,
        })
    }

    /// Map frame points into overhead coordinates
    pub fn project(&self, points: &[Point]) -> Result<Vec<(f32, f32)>> {
        let src: Vector<Point2f> = points.iter().map(ImageUtils::to_cv_point2f).collect();
        let mut dst = Vector::<Point2f>::new();
        core::perspective_transform(&src, &mut dst, &self.homography)
            .context("Failed to project points")?;
        Ok(dst.iter().map(|p| (p.x, p.y)).collect())
    }

    /// Warp a full frame into the overhead view
    pub fn warp(&self, frame: &Mat) -> Result<Mat> {
        let mut overhead = Mat::default();
        imgproc::warp_perspective(
            frame,
            &mut overhead,
            &self.homography,
            Size::new(self.size.width, self.size.height),
            imgproc::INTER_LINEAR,
            core::BORDER_CONSTANT,
            Scalar::default(),
        )
        .context("Perspective warp failed")?;
        Ok(overhead)
    }
}

/// Tracks the largest table-bed region ever seen and rectifies frames with it.
///
/// The reference region only ever grows: a larger region permanently
/// replaces it, so a single oversized misdetection poisons the calibration
/// for the rest of the run.
pub struct TableCalibrator {
    config: CalibrationConfig,
    profiler: ColorProfiler,
    best_region: Option<Region>,
    best_area: f64,
    frame_regions: Vec<Region>,
    last_calibration: Option<TableCalibration>,
    last_overhead: Option<Mat>,
}

impl TableCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        let profiler = ColorProfiler::new(config.search_width);
        Self {
            config,
            profiler,
            best_region: None,
            best_area: 0.0,
            frame_regions: Vec::new(),
            last_calibration: None,
            last_overhead: None,
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn best_region(&self) -> Option<&Region> {
        self.best_region.as_ref()
    }

    pub fn best_area(&self) -> f64 {
        self.best_area
    }

    /// Candidate table regions of the most recent frame
    pub fn frame_regions(&self) -> &[Region] {
        &self.frame_regions
    }

    pub fn last_calibration(&self) -> Option<&TableCalibration> {
        self.last_calibration.as_ref()
    }

    /// Most recent successful overhead image
    pub fn last_overhead(&self) -> Option<&Mat> {
        self.last_overhead.as_ref()
    }

    /// Segment the cloth of an HSV frame and fold its largest region into
    /// the running maximum. Returns whether the reference region changed.
    pub fn observe(&mut self, hsv: &Mat) -> Result<bool> {
        let band = self.profiler.estimate_cloth_color(hsv)?;
        let regions = RegionSegmenter::segment(
            hsv,
            &band,
            Some(self.config.filter_radius),
            RegionMode::Tree,
        )?;
        self.frame_regions = regions;

        let Some(largest) = RegionSegmenter::select_largest(&self.frame_regions) else {
            return Err(VisionError::no_region("cloth").into());
        };
        Ok(self.consider(largest.clone()))
    }

    /// Running-max update: strictly larger regions replace the reference
    pub fn consider(&mut self, region: Region) -> bool {
        let area = region.area();
        if self.best_region.is_some() && area <= self.best_area {
            return false;
        }

        info!(
            area,
            previous = self.best_area,
            "table reference region updated"
        );
        self.best_area = area;
        self.best_region = Some(region);
        true
    }

    /// Calibrate against the reference region for a frame of the given size
    pub fn calibrate(&self, frame_width: i32, frame_height: i32) -> Result<TableCalibration> {
        let region = self
            .best_region
            .as_ref()
            .ok_or_else(|| VisionError::no_region("cloth"))?;
        let corners =
            TableCorners::from_region(region, frame_width, frame_height, self.config.corner_pad)?;
        TableCalibration::from_corners(corners)
    }

    /// Warp `frame` with a calibration and remember the result.
    ///
    /// On failure the previous overhead image stays untouched.
    pub fn rectify(&mut self, frame: &Mat, calibration: TableCalibration) -> Result<&Mat> {
        let overhead = calibration.warp(frame)?;
        self.last_calibration = Some(calibration);
        let overhead = self.last_overhead.insert(overhead);
        Ok(&*overhead)
    }

    /// Calibrate against the reference region at the frame's size and warp
    pub fn rectify_reference(&mut self, frame: &Mat) -> Result<&Mat> {
        let size = frame.size()?;
        let calibration = self.calibrate(size.width, size.height)?;
        self.rectify(frame, calibration)
    }

    /// Full per-frame step: observe the cloth in `hsv`, calibrate, and warp
    /// `frame` into the overhead view.
    ///
    /// A frame without cloth regions fails with `NoRegionFound` and leaves
    /// the reference region and the previous overhead untouched.
    pub fn update(&mut self, hsv: &Mat, frame: &Mat) -> Result<&Mat> {
        self.observe(hsv)?;
        self.rectify_reference(frame)
    }
}

impl Default for TableCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}
