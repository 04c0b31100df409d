//! Mat helpers and conversions between OpenCV and core types

use crate::Result;
use anyhow::Context;
use cuevision_core::{Point, Region};
use opencv::{
    core::{self, Mat, Point as CvPoint, Point2f, Scalar, Size, Vector},
    imgcodecs,
    imgproc,
    prelude::*,
};
use std::path::Path;

/// zlib level for written PNGs
const PNG_COMPRESSION: i32 = 3;

/// Image utility functions shared by the pipeline stages
pub struct ImageUtils;

impl ImageUtils {
    /// Convert a BGR frame to HSV (H in 0..180, S and V in 0..256)
    pub fn to_hsv(bgr: &Mat) -> Result<Mat> {
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(bgr, &mut hsv, imgproc::COLOR_BGR2HSV)
            .context("Failed to convert frame to HSV")?;
        Ok(hsv)
    }

    /// Resize a frame to exactly `width` x `height`
    pub fn resize(frame: &Mat, width: i32, height: i32) -> Result<Mat> {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .context("Failed to resize frame")?;
        Ok(resized)
    }

    /// Frame of the given size filled with one color
    pub fn filled(width: i32, height: i32, typ: i32, color: Scalar) -> Result<Mat> {
        Mat::new_rows_cols_with_default(height, width, typ, color)
            .context("Failed to allocate frame")
    }

    /// Whether a frame carries no pixels
    pub fn is_empty(frame: &Mat) -> Result<bool> {
        let size = frame.size()?;
        Ok(size.width == 0 || size.height == 0)
    }

    /// Encode a frame as PNG; the extension of `path` is not consulted
    pub fn write_png<P: AsRef<Path>>(frame: &Mat, path: P) -> Result<()> {
        let path = path.as_ref();
        let params = Vector::<i32>::from_iter([imgcodecs::IMWRITE_PNG_COMPRESSION, PNG_COMPRESSION]);

        let mut encoded = Vector::<u8>::new();
        let ok = imgcodecs::imencode(".png", frame, &mut encoded, &params)
            .with_context(|| format!("Failed to encode {:?}", path))?;
        if !ok {
            anyhow::bail!("PNG encoder rejected frame for {:?}", path);
        }
        std::fs::write(path, encoded.as_slice())
            .with_context(|| format!("Failed to write {:?}", path))
    }

    /// Deterministic BGR noise; no color covers a solid patch
    #[cfg(test)]
    pub fn speckle(width: i32, height: i32, seed: u32) -> Result<Mat> {
        let mut frame = Self::filled(width, height, core::CV_8UC3, Scalar::all(0.0))?;
        let mut state = seed.max(1);
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        for row in 0..height {
            for col in 0..width {
                let pixel = frame.at_2d_mut::<core::Vec3b>(row, col)?;
                for channel in 0..3 {
                    pixel[channel] = next();
                }
            }
        }
        Ok(frame)
    }

    pub fn to_cv_point(point: &Point) -> CvPoint {
        CvPoint::new(point.x, point.y)
    }

    pub fn to_cv_point2f(point: &Point) -> Point2f {
        Point2f::new(point.x as f32, point.y as f32)
    }

    /// OpenCV contour to core region
    pub fn contour_to_region(contour: &Vector<CvPoint>) -> Region {
        Region::new(contour.iter().map(|p| Point::new(p.x, p.y)).collect())
    }

    /// Core region to OpenCV contour
    pub fn region_to_contour(region: &Region) -> Vector<CvPoint> {
        region.points.iter().map(Self::to_cv_point).collect()
    }

    /// Regions as a contour list, for the drawing primitives
    pub fn regions_to_contours(regions: &[Region]) -> Vector<Vector<CvPoint>> {
        regions.iter().map(Self::region_to_contour).collect()
    }
}
