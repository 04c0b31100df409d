//! Table-bed corner extraction and overhead destination geometry
//!
//! The table bed is assumed to be the dominant region of cloth color. Its
//! corners are the region points nearest to each corner of the image, pushed
//! outward by a fixed pad so the cushions stay inside the rectified view.

use serde::{Deserialize, Serialize};

use crate::error::VisionError;
use crate::geometry::{cross, Point};
use crate::region::Region;

/// Default outward padding applied to every extracted corner
pub const DEFAULT_CORNER_PAD: i32 = 10;

/// Playing surfaces are twice as long as they are wide
pub const TABLE_ASPECT: i32 = 2;

/// Four table corners in homography order: UL, UR, LR, LL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCorners {
    pub upper_left: Point,
    pub upper_right: Point,
    pub lower_right: Point,
    pub lower_left: Point,
}

/// Size of the rectified overhead image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSize {
    pub width: i32,
    pub height: i32,
}

impl DestinationSize {
    /// Corners of the destination rectangle in UL, UR, LR, LL order
    pub fn corners(&self) -> [(f32, f32); 4] {
        let right = (self.width - 1) as f32;
        let bottom = (self.height - 1) as f32;
        [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)]
    }
}

impl TableCorners {
    /// Extract padded corners from `region` inside an image of the given size.
    ///
    /// Returns `NoRegionFound` for a region without points and
    /// `DegenerateCalibration` when the extracted points coincide or are
    /// collinear. The shape is checked before padding, since the pad alone
    /// can spread a single point into a valid square.
    pub fn from_region(
        region: &Region,
        image_width: i32,
        image_height: i32,
        pad: i32,
    ) -> Result<Self, VisionError> {
        let nearest = |target: Point| {
            region
                .nearest_point(&target)
                .ok_or_else(|| VisionError::no_region("table"))
        };

        let extracted = Self {
            upper_left: nearest(Point::new(0, 0))?,
            upper_right: nearest(Point::new(image_width, 0))?,
            lower_right: nearest(Point::new(image_width, image_height))?,
            lower_left: nearest(Point::new(0, image_height))?,
        };
        extracted.ensure_distinct_and_non_collinear()?;

        Ok(extracted.padded(pad))
    }

    /// Corners pushed outward by `pad` on both axes
    pub fn padded(&self, pad: i32) -> Self {
        Self {
            upper_left: self.upper_left.offset(-pad, -pad),
            upper_right: self.upper_right.offset(pad, -pad),
            lower_right: self.lower_right.offset(pad, pad),
            lower_left: self.lower_left.offset(-pad, pad),
        }
    }

    pub fn as_array(&self) -> [Point; 4] {
        [
            self.upper_left,
            self.upper_right,
            self.lower_right,
            self.lower_left,
        ]
    }

    /// Overhead size: width is the longer of the top and bottom edges
    /// (truncated), height follows the fixed table aspect.
    pub fn destination_size(&self) -> DestinationSize {
        let bottom = self.lower_left.distance(&self.lower_right);
        let top = self.upper_left.distance(&self.upper_right);
        let width = (bottom as i32).max(top as i32);
        DestinationSize {
            width,
            height: width * TABLE_ASPECT,
        }
    }

    /// Reject corner sets that cannot define a homography: any two corners
    /// coincident, any three collinear, or a destination too small to span
    /// a rectangle.
    pub fn ensure_non_degenerate(&self) -> Result<(), VisionError> {
        self.ensure_distinct_and_non_collinear()?;
        if self.destination_size().width < 2 {
            return Err(VisionError::DegenerateCalibration);
        }
        Ok(())
    }

    fn ensure_distinct_and_non_collinear(&self) -> Result<(), VisionError> {
        let pts = self.as_array();

        for i in 0..4 {
            for j in (i + 1)..4 {
                if pts[i] == pts[j] {
                    return Err(VisionError::DegenerateCalibration);
                }
            }
        }

        for skip in 0..4 {
            let tri: Vec<&Point> = pts
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| p)
                .collect();
            if cross(tri[0], tri[1], tri[2]).abs() < f64::EPSILON {
                return Err(VisionError::DegenerateCalibration);
            }
        }

        Ok(())
    }
}
