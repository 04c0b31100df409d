//! Cloth color estimation from per-channel histogram peaks

use crate::Result;
use anyhow::Context;
use cuevision_core::{Channel, ColorRange, VisionError};
use opencv::{
    core::{self, Mat, Vector},
    imgproc,
    prelude::*,
};

/// Default half-width of the estimated cloth band
pub const DEFAULT_SEARCH_WIDTH: i32 = 30;

/// Estimates the dominant color band of an HSV frame.
///
/// In a well lit shot the cloth covers most of the frame, so the most common
/// value of every channel approximates the cloth color.
#[derive(Debug, Clone, Copy)]
pub struct ColorProfiler {
    search_width: i32,
}

impl ColorProfiler {
    pub fn new(search_width: i32) -> Self {
        Self { search_width }
    }

    pub fn search_width(&self) -> i32 {
        self.search_width
    }

    /// Band of `peak ± search_width` per channel. The result is not clamped.
    pub fn estimate_cloth_color(&self, hsv: &Mat) -> Result<ColorRange> {
        let hue = Self::channel_histogram(hsv, Channel::Hue)?;
        let saturation = Self::channel_histogram(hsv, Channel::Saturation)?;
        let value = Self::channel_histogram(hsv, Channel::Value)?;

        ColorRange::from_histogram_peaks([&hue[..], &saturation[..], &value[..]], self.search_width)
            .ok_or_else(|| VisionError::no_region("cloth").into())
    }

    /// Bin counts of one channel over its whole domain
    pub fn channel_histogram(hsv: &Mat, channel: Channel) -> Result<Vec<f32>> {
        let mut images = Vector::<Mat>::new();
        images.push(hsv.try_clone()?);

        let channels = Vector::<i32>::from_iter([channel.index() as i32]);
        let hist_size = Vector::<i32>::from_iter([channel.bins() as i32]);
        let ranges = Vector::<f32>::from_iter([0.0, channel.bins() as f32]);

        let mut hist = Mat::default();
        imgproc::calc_hist(
            &images,
            &channels,
            &core::no_array(),
            &mut hist,
            &hist_size,
            &ranges,
            false,
        )
        .with_context(|| format!("Failed to compute {:?} histogram", channel))?;

        Ok(hist.data_typed::<f32>()?.to_vec())
    }
}

impl Default for ColorProfiler {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;
    use opencv::core::{Rect, Scalar, CV_8UC3};

    #[test]
    fn test_single_color_image() -> Result<()> {
        let (h0, s0, v0) = (60, 200, 150);
        let hsv = ImageUtils::filled(
            32,
            24,
            CV_8UC3,
            Scalar::new(h0 as f64, s0 as f64, v0 as f64, 0.0),
        )?;

        let range = ColorProfiler::new(30).estimate_cloth_color(&hsv)?;
        assert_eq!(range.lower, [h0 - 30, s0 - 30, v0 - 30]);
        assert_eq!(range.upper, [h0 + 30, s0 + 30, v0 + 30]);
        Ok(())
    }

    #[test]
    fn test_bounds_are_not_clamped() -> Result<()> {
        let hsv = ImageUtils::filled(10, 10, CV_8UC3, Scalar::new(5.0, 250.0, 0.0, 0.0))?;

        let range = ColorProfiler::new(10).estimate_cloth_color(&hsv)?;
        assert_eq!(range.lower, [-5, 240, -10]);
        assert_eq!(range.upper, [15, 260, 10]);
        Ok(())
    }

    #[test]
    fn test_majority_color_wins() -> Result<()> {
        let mut hsv = ImageUtils::filled(20, 20, CV_8UC3, Scalar::new(100.0, 120.0, 140.0, 0.0))?;
        // a quarter of the frame in another color
        imgproc::rectangle(
            &mut hsv,
            Rect::new(0, 0, 10, 10),
            Scalar::new(20.0, 30.0, 40.0, 0.0),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;

        let range = ColorProfiler::new(0).estimate_cloth_color(&hsv)?;
        assert_eq!(range.lower, [100, 120, 140]);
        Ok(())
    }

    #[test]
    fn test_histogram_bin_counts() -> Result<()> {
        let hsv = ImageUtils::filled(4, 5, CV_8UC3, Scalar::new(179.0, 0.0, 255.0, 0.0))?;

        let hue = ColorProfiler::channel_histogram(&hsv, Channel::Hue)?;
        let value = ColorProfiler::channel_histogram(&hsv, Channel::Value)?;
        assert_eq!(hue.len(), 180);
        assert_eq!(value.len(), 256);
        assert_eq!(hue[179], 20.0);
        assert_eq!(value[255], 20.0);
        Ok(())
    }
}
