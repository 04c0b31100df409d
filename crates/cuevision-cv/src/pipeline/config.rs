//! Pipeline configuration

use crate::calibration::CalibrationConfig;
use crate::overlay::VisualizationConfig;
use crate::tracking::BallConfig;
use crate::Result;
use anyhow::Context;
use cuevision_core::collision::DEFAULT_COLLISION_DISTANCE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frames are resized to (width, height) before processing
    pub frame_size: Option<(i32, i32)>,
    pub features: FeatureFlags,
    pub calibration: CalibrationConfig,
    pub primary: BallConfig,
    pub secondary: BallConfig,
    /// Contact distance between the two last known positions (exclusive)
    pub collision_distance: f64,
    pub visualization: VisualizationConfig,
}

/// Optional pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Rectify every frame into the overhead view
    pub overhead: bool,
    /// Track the object ball and detect contacts
    pub track_secondary: bool,
    /// Emit a debug frame with table contours
    pub debug_overlay: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            overhead: true,
            track_secondary: false,
            debug_overlay: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_size: Some((854, 480)),
            features: FeatureFlags::default(),
            calibration: CalibrationConfig::default(),
            primary: BallConfig::primary(),
            secondary: BallConfig::secondary(),
            collision_distance: DEFAULT_COLLISION_DISTANCE,
            visualization: VisualizationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Track both balls and report their contacts
    pub fn with_collision_tracking() -> Self {
        Self {
            features: FeatureFlags {
                track_secondary: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Tracking only, frames kept at their native size
    pub fn tracking_only() -> Self {
        Self {
            frame_size: None,
            features: FeatureFlags {
                overhead: false,
                track_secondary: true,
                debug_overlay: false,
            },
            ..Default::default()
        }
    }

    /// Load a JSON configuration; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {:?}", path.as_ref()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write config: {:?}", path.as_ref()))
    }
}
