//! Table-bed calibration and overhead rectification

pub mod calibrator;

pub use calibrator::{TableCalibration, TableCalibrator};

use crate::profile::DEFAULT_SEARCH_WIDTH;
use crate::segment::DEFAULT_FILTER_RADIUS;
use cuevision_core::corners::DEFAULT_CORNER_PAD;
use serde::{Deserialize, Serialize};

/// Table calibration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Half-width of the cloth band around the histogram peaks
    pub search_width: i32,
    /// Median filter aperture applied to the cloth mask
    pub filter_radius: i32,
    /// Outward padding of every extracted table corner
    pub corner_pad: i32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            search_width: DEFAULT_SEARCH_WIDTH,
            filter_radius: DEFAULT_FILTER_RADIUS,
            corner_pad: DEFAULT_CORNER_PAD,
        }
    }
}
