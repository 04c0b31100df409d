//! Per-ball trajectory tracking with jump rejection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{Circle, Point};

/// Which ball a tracker follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallIdentity {
    /// Cue ball
    Primary,
    /// Object ball
    Secondary,
}

/// How the last known position follows raw detections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastKnownRule {
    /// Every raw detection becomes the last known position
    Raw,
    /// A raw detection that jumps farther than the threshold from the
    /// previous last known position is replaced by the latest accepted
    /// trajectory point
    FallbackToTrajectory,
}

/// Per-object tracking parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub identity: BallIdentity,
    /// Maximum distance (exclusive) between consecutive accepted points
    pub jump_threshold: f64,
    pub last_known_rule: LastKnownRule,
}

impl TrackerConfig {
    pub fn primary() -> Self {
        Self {
            identity: BallIdentity::Primary,
            jump_threshold: 100.0,
            last_known_rule: LastKnownRule::Raw,
        }
    }

    pub fn secondary() -> Self {
        Self {
            identity: BallIdentity::Secondary,
            jump_threshold: 20.0,
            last_known_rule: LastKnownRule::FallbackToTrajectory,
        }
    }
}

/// Ball found on a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub center: Point,
    pub radius: f32,
}

impl Detection {
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }

    /// From a float enclosing-circle fit; the center is truncated
    pub fn from_circle(x: f32, y: f32, radius: f32) -> Self {
        Self::new(Point::truncated(x, y), radius)
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

/// Accumulated state for one tracked ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    config: TrackerConfig,
    current: Option<Detection>,
    trajectory: Vec<Point>,
    last_known: Option<Point>,
    last_radius: Option<f32>,
}

impl TrackedObject {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            current: None,
            trajectory: Vec::new(),
            last_known: None,
            last_radius: None,
        }
    }

    pub fn identity(&self) -> BallIdentity {
        self.config.identity
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Detection of the most recent frame, if any
    pub fn current(&self) -> Option<&Detection> {
        self.current.as_ref()
    }

    /// Accepted trajectory, oldest first
    pub fn trajectory(&self) -> &[Point] {
        &self.trajectory
    }

    pub fn last_known(&self) -> Option<Point> {
        self.last_known
    }

    /// Radius of the latest detection ever made
    pub fn last_radius(&self) -> Option<f32> {
        self.last_radius
    }

    /// Feed the detection for one frame.
    ///
    /// Returns whether the detection was accepted into the trajectory. A
    /// frame without detection leaves everything but `current` untouched.
    pub fn observe(&mut self, detection: Option<Detection>) -> bool {
        self.current = detection;
        let Some(detection) = detection else {
            return false;
        };
        let center = detection.center;
        self.last_radius = Some(detection.radius);

        let accepted = match self.trajectory.last() {
            None => true,
            Some(last) => last.distance(&center) < self.config.jump_threshold,
        };
        if accepted {
            self.trajectory.push(center);
        } else {
            debug!(
                ball = ?self.config.identity,
                x = center.x,
                y = center.y,
                "rejected trajectory jump"
            );
        }

        self.last_known = Some(match self.config.last_known_rule {
            LastKnownRule::Raw => center,
            LastKnownRule::FallbackToTrajectory => match self.last_known {
                Some(previous) if center.distance(&previous) > self.config.jump_threshold => {
                    self.trajectory.last().copied().unwrap_or(center)
                }
                _ => center,
            },
        });

        accepted
    }

    /// Forget the accepted trajectory. The last known position survives so
    /// collision checks keep working across a reset.
    pub fn reset(&mut self) {
        self.trajectory.clear();
    }
}
