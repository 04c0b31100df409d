//! Drawing of detections, trajectories and calibration on frames

use crate::utils::ImageUtils;
use crate::Result;
use cuevision_core::{CollisionEvent, Detection, Point, Region, TableCorners};
use opencv::{
    core::{self, Mat, Point as CvPoint, Scalar, Vector},
    imgproc::{self, LINE_8},
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// Radius of the collision markers
const MARKER_RADIUS: i32 = 5;

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub draw_detections: bool,
    pub draw_trajectories: bool,
    pub draw_collisions: bool,
    pub thickness: i32,
    /// BGR colors
    pub detection_color: (u8, u8, u8),
    pub contact_color: (u8, u8, u8),
    pub secondary_contact_color: (u8, u8, u8),
    pub primary_trail_color: (u8, u8, u8),
    pub secondary_trail_color: (u8, u8, u8),
    pub table_color: (u8, u8, u8),
    pub mask_color: (u8, u8, u8),
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            draw_detections: true,
            draw_trajectories: true,
            draw_collisions: true,
            thickness: 2,
            detection_color: (0, 0, 255),
            contact_color: (250, 250, 250),
            secondary_contact_color: (255, 0, 0),
            primary_trail_color: (200, 255, 255),
            secondary_trail_color: (200, 0, 0),
            table_color: (0, 255, 0),
            mask_color: (255, 0, 255),
        }
    }
}

fn scalar((b, g, r): (u8, u8, u8)) -> Scalar {
    Scalar::new(b as f64, g as f64, r as f64, 255.0)
}

/// Renders tracking state onto BGR frames
pub struct Overlay {
    config: VisualizationConfig,
}

impl Overlay {
    pub fn new(config: VisualizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    /// Circle around a current detection
    pub fn draw_detection(&self, frame: &mut Mat, detection: &Detection) -> Result<()> {
        if !self.config.draw_detections {
            return Ok(());
        }
        imgproc::circle(
            frame,
            ImageUtils::to_cv_point(&detection.center),
            detection.radius as i32,
            scalar(self.config.detection_color),
            self.config.thickness,
            LINE_8,
            0,
        )?;
        Ok(())
    }

    /// Segments between consecutive trajectory points
    pub fn draw_trajectory(&self, frame: &mut Mat, trajectory: &[Point], color: (u8, u8, u8)) -> Result<()> {
        if !self.config.draw_trajectories {
            return Ok(());
        }
        for pair in trajectory.windows(2) {
            imgproc::line(
                frame,
                ImageUtils::to_cv_point(&pair[0]),
                ImageUtils::to_cv_point(&pair[1]),
                scalar(color),
                self.config.thickness,
                LINE_8,
                0,
            )?;
        }
        Ok(())
    }

    pub fn draw_primary_trajectory(&self, frame: &mut Mat, trajectory: &[Point]) -> Result<()> {
        self.draw_trajectory(frame, trajectory, self.config.primary_trail_color)
    }

    pub fn draw_secondary_trajectory(&self, frame: &mut Mat, trajectory: &[Point]) -> Result<()> {
        self.draw_trajectory(frame, trajectory, self.config.secondary_trail_color)
    }

    /// Contact midpoint and secondary ball markers
    pub fn draw_collision(&self, frame: &mut Mat, event: &CollisionEvent) -> Result<()> {
        if !self.config.draw_collisions {
            return Ok(());
        }
        imgproc::circle(
            frame,
            ImageUtils::to_cv_point(&event.contact),
            MARKER_RADIUS,
            scalar(self.config.contact_color),
            self.config.thickness,
            LINE_8,
            0,
        )?;
        imgproc::circle(
            frame,
            ImageUtils::to_cv_point(&event.secondary.center),
            MARKER_RADIUS,
            scalar(self.config.secondary_contact_color),
            self.config.thickness,
            LINE_8,
            0,
        )?;
        Ok(())
    }

    /// Debug view: every candidate table region
    pub fn draw_regions(&self, frame: &mut Mat, regions: &[Region]) -> Result<()> {
        let contours = ImageUtils::regions_to_contours(regions);
        imgproc::draw_contours(
            frame,
            &contours,
            -1,
            scalar(self.config.table_color),
            3,
            LINE_8,
            &core::no_array(),
            i32::MAX,
            CvPoint::default(),
        )?;
        Ok(())
    }

    /// Debug view: paint every pixel set in a single-channel `mask`
    pub fn draw_mask(&self, frame: &mut Mat, mask: &Mat) -> Result<()> {
        let tint = ImageUtils::filled(frame.cols(), frame.rows(), frame.typ(), scalar(self.config.mask_color))?;
        tint.copy_to_masked(frame, mask)?;
        Ok(())
    }

    /// Debug view: calibrated table quadrilateral
    pub fn draw_table(&self, frame: &mut Mat, corners: &TableCorners) -> Result<()> {
        let quad: Vector<CvPoint> = corners.as_array().iter().map(ImageUtils::to_cv_point).collect();
        let polygons = Vector::<Vector<CvPoint>>::from_iter([quad]);
        imgproc::polylines(
            frame,
            &polygons,
            true,
            scalar(self.config.table_color),
            self.config.thickness,
            LINE_8,
            0,
        )?;
        Ok(())
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(VisualizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuevision_core::Circle;
    use opencv::core::{CV_8UC1, CV_8UC3};

    fn blank() -> Result<Mat> {
        ImageUtils::filled(100, 100, CV_8UC3, Scalar::all(0.0))
    }

    fn lit_pixels(frame: &Mat) -> Result<i32> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(core::count_non_zero(&gray)?)
    }

    #[test]
    fn test_trajectory_draws_segments() -> Result<()> {
        let mut frame = blank()?;
        let overlay = Overlay::default();
        overlay.draw_primary_trajectory(&mut frame, &[Point::new(10, 10), Point::new(90, 10)])?;

        let pixel = *frame.at_2d::<core::Vec3b>(10, 50)?;
        assert_eq!((pixel[0], pixel[1], pixel[2]), (200, 255, 255));
        Ok(())
    }

    #[test]
    fn test_single_point_trajectory_draws_nothing() -> Result<()> {
        let mut frame = blank()?;
        Overlay::default().draw_primary_trajectory(&mut frame, &[Point::new(10, 10)])?;
        assert_eq!(lit_pixels(&frame)?, 0);
        Ok(())
    }

    #[test]
    fn test_disabled_layers_are_skipped() -> Result<()> {
        let mut frame = blank()?;
        let overlay = Overlay::new(VisualizationConfig {
            draw_detections: false,
            draw_collisions: false,
            ..Default::default()
        });
        overlay.draw_detection(&mut frame, &Detection::new(Point::new(50, 50), 10.0))?;
        overlay.draw_collision(
            &mut frame,
            &CollisionEvent {
                contact: Point::new(20, 20),
                secondary: Circle::new(Point::new(30, 20), 6.0),
            },
        )?;
        assert_eq!(lit_pixels(&frame)?, 0);
        Ok(())
    }

    #[test]
    fn test_debug_layers() -> Result<()> {
        let mut frame = blank()?;
        let overlay = Overlay::default();
        overlay.draw_regions(&mut frame, &[Region::from(vec![(10, 10), (40, 10), (40, 40), (10, 40)])])?;
        overlay.draw_table(
            &mut frame,
            &TableCorners {
                upper_left: Point::new(50, 50),
                upper_right: Point::new(90, 50),
                lower_right: Point::new(90, 90),
                lower_left: Point::new(50, 90),
            },
        )?;
        assert!(lit_pixels(&frame)? > 0);
        Ok(())
    }

    #[test]
    fn test_mask_tints_only_set_pixels() -> Result<()> {
        let mut frame = blank()?;
        let mut mask = ImageUtils::filled(100, 100, CV_8UC1, Scalar::all(0.0))?;
        imgproc::rectangle(
            &mut mask,
            core::Rect::new(20, 30, 10, 5),
            Scalar::all(255.0),
            imgproc::FILLED,
            LINE_8,
            0,
        )?;

        Overlay::default().draw_mask(&mut frame, &mask)?;

        let inside = *frame.at_2d::<core::Vec3b>(32, 25)?;
        assert_eq!((inside[0], inside[1], inside[2]), (255, 0, 255));
        assert_eq!(lit_pixels(&frame)?, 50);
        Ok(())
    }
}
