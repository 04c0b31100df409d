//! Color thresholding and region extraction

use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use cuevision_core::{ColorRange, Region};
use opencv::{
    core::{self, Mat, Point as CvPoint, Scalar, Vec4i, Vector},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default median filter aperture for table segmentation
pub const DEFAULT_FILTER_RADIUS: i32 = 15;

/// Which contours to retrieve from a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionMode {
    /// Full contour tree, nested regions included
    Tree,
    /// Outermost contours only
    External,
}

impl RegionMode {
    fn to_opencv(self) -> i32 {
        match self {
            RegionMode::Tree => imgproc::RETR_TREE,
            RegionMode::External => imgproc::RETR_EXTERNAL,
        }
    }
}

/// Mask and contour operations over HSV frames
pub struct RegionSegmenter;

impl RegionSegmenter {
    /// Binary mask of pixels inside `range` on every channel.
    ///
    /// Out-of-domain bounds are clamped first.
    pub fn threshold(hsv: &Mat, range: &ColorRange) -> Result<Mat> {
        if let Err(err) = range.validate() {
            debug!(error = %err, "clamping color range");
        }
        let range = range.clamped();

        let lower = Scalar::new(
            range.lower[0] as f64,
            range.lower[1] as f64,
            range.lower[2] as f64,
            0.0,
        );
        let upper = Scalar::new(
            range.upper[0] as f64,
            range.upper[1] as f64,
            range.upper[2] as f64,
            0.0,
        );

        let mut mask = Mat::default();
        core::in_range(hsv, &lower, &upper, &mut mask).context("Color thresholding failed")?;
        Ok(mask)
    }

    /// Median filter to remove speckle. Even apertures are bumped to the
    /// next odd size; apertures below 3 leave the mask untouched.
    pub fn denoise(mask: &Mat, filter_radius: i32) -> Result<Mat> {
        if filter_radius < 3 {
            return Ok(mask.try_clone()?);
        }
        let ksize = if filter_radius % 2 == 0 {
            filter_radius + 1
        } else {
            filter_radius
        };

        let mut filtered = Mat::default();
        imgproc::median_blur(mask, &mut filtered, ksize).context("Median filter failed")?;
        Ok(filtered)
    }

    /// Contours of a binary mask with collinear points removed
    pub fn extract_regions(mask: &Mat, mode: RegionMode) -> Result<Vec<Region>> {
        let mut contours = Vector::<Vector<CvPoint>>::new();

        let found = match mode {
            RegionMode::Tree => {
                let mut hierarchy = Vector::<Vec4i>::new();
                imgproc::find_contours_with_hierarchy(
                    mask,
                    &mut contours,
                    &mut hierarchy,
                    mode.to_opencv(),
                    imgproc::CHAIN_APPROX_SIMPLE,
                    CvPoint::new(0, 0),
                )
            }
            RegionMode::External => imgproc::find_contours(
                mask,
                &mut contours,
                mode.to_opencv(),
                imgproc::CHAIN_APPROX_SIMPLE,
                CvPoint::new(0, 0),
            ),
        };
        found.context("Contour extraction failed")?;

        Ok(contours
            .iter()
            .map(|contour| ImageUtils::contour_to_region(&contour))
            .collect())
    }

    /// Threshold, optionally denoise, and extract regions in one go
    pub fn segment(
        hsv: &Mat,
        range: &ColorRange,
        filter_radius: Option<i32>,
        mode: RegionMode,
    ) -> Result<Vec<Region>> {
        let mask = Self::threshold(hsv, range)?;
        let mask = match filter_radius {
            Some(radius) => Self::denoise(&mask, radius)?,
            None => mask,
        };
        Self::extract_regions(&mask, mode)
    }

    /// Largest region by area; first occurrence wins ties
    pub fn select_largest(regions: &[Region]) -> Option<&Region> {
        Region::select_largest(regions).map(|i| &regions[i])
    }
}
