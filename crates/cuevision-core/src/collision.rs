//! Proximity-based contact detection between the two tracked balls

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::geometry::{Circle, Point};
use crate::tracker::TrackedObject;

/// Default contact distance between the two last known positions
pub const DEFAULT_COLLISION_DISTANCE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionState {
    Idle,
    /// The last [`CollisionDetector::step`] triggered; the next step that
    /// does not trigger returns to `Idle`
    JustCollided,
}

/// Markers latched at the moment of contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Midpoint between the two balls
    pub contact: Point,
    /// Secondary ball position and radius at contact
    pub secondary: Circle,
}

/// Latches a [`CollisionEvent`] whenever the balls come within range.
///
/// There is no debounce: while the balls stay within range every step
/// re-triggers and overwrites the latched event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionDetector {
    threshold: f64,
    state: CollisionState,
    latched: Option<CollisionEvent>,
    triggers: u64,
}

impl CollisionDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: CollisionState::Idle,
            latched: None,
            triggers: 0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> CollisionState {
        self.state
    }

    /// Event persisted from the most recent trigger
    pub fn latched(&self) -> Option<&CollisionEvent> {
        self.latched.as_ref()
    }

    /// Number of frames that triggered since construction or reset
    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Evaluate one frame. Returns the event if this frame triggered.
    ///
    /// `secondary_radius` is the radius latched with the contact marker.
    pub fn step(
        &mut self,
        primary: Option<Point>,
        secondary: Option<Point>,
        secondary_radius: f32,
    ) -> Option<CollisionEvent> {
        let (Some(a), Some(b)) = (primary, secondary) else {
            self.state = CollisionState::Idle;
            return None;
        };

        if a.distance(&b) >= self.threshold {
            self.state = CollisionState::Idle;
            return None;
        }

        self.state = CollisionState::JustCollided;
        let event = CollisionEvent {
            contact: a.midpoint(&b),
            secondary: Circle::new(b, secondary_radius),
        };
        self.latched = Some(event);
        self.triggers += 1;
        info!(x = event.contact.x, y = event.contact.y, "ball contact");

        Some(event)
    }

    /// Evaluate one frame from the trackers' last known positions
    pub fn step_trackers(
        &mut self,
        primary: &TrackedObject,
        secondary: &TrackedObject,
    ) -> Option<CollisionEvent> {
        self.step(
            primary.last_known(),
            secondary.last_known(),
            secondary.last_radius().unwrap_or_default(),
        )
    }

    pub fn reset(&mut self) {
        self.state = CollisionState::Idle;
        self.latched = None;
        self.triggers = 0;
    }
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_DISTANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(detector: &mut CollisionDetector, a: &[(i32, i32)], b: &[(i32, i32)]) -> Vec<CollisionEvent> {
        a.iter()
            .zip(b)
            .filter_map(|(pa, pb)| detector.step(Some((*pa).into()), Some((*pb).into()), 6.0))
            .collect()
    }

    #[test]
    fn test_single_contact_frame() {
        let mut detector = CollisionDetector::default();
        let cue = [(0, 100), (40, 100), (80, 100), (90, 100), (90, 100)];
        let object = [(200, 100), (200, 100), (95, 100), (150, 100), (200, 100)];

        let events = run(&mut detector, &cue, &object);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].contact, Point::new(87, 100));
        assert_eq!(events[0].secondary, Circle::new(Point::new(95, 100), 6.0));
        assert_eq!(detector.latched(), Some(&events[0]));
        assert_eq!(detector.state(), CollisionState::Idle);
    }

    #[test]
    fn test_state_follows_last_step() {
        let mut detector = CollisionDetector::default();
        assert_eq!(detector.state(), CollisionState::Idle);

        assert!(detector.step(Some(Point::new(0, 0)), Some(Point::new(5, 0)), 5.0).is_some());
        assert_eq!(detector.state(), CollisionState::JustCollided);

        assert!(detector.step(Some(Point::new(0, 0)), Some(Point::new(80, 0)), 5.0).is_none());
        assert_eq!(detector.state(), CollisionState::Idle);
        assert!(detector.latched().is_some());

        detector.step(Some(Point::new(0, 0)), Some(Point::new(5, 0)), 5.0);
        detector.step(None, Some(Point::new(5, 0)), 5.0);
        assert_eq!(detector.state(), CollisionState::Idle);

        detector.step(Some(Point::new(0, 0)), Some(Point::new(5, 0)), 5.0);
        detector.reset();
        assert_eq!(detector.state(), CollisionState::Idle);
    }

    #[test]
    fn test_never_within_threshold() {
        let mut detector = CollisionDetector::default();
        let cue = [(0, 0), (10, 0), (20, 0)];
        let object = [(100, 0), (60, 0), (40, 0)];

        assert!(run(&mut detector, &cue, &object).is_empty());
        assert!(detector.latched().is_none());
    }

    #[test]
    fn test_retriggers_while_in_range() {
        let mut detector = CollisionDetector::default();
        let cue = [(0, 0), (2, 0), (4, 0)];
        let object = [(10, 0), (12, 0), (14, 0)];

        let events = run(&mut detector, &cue, &object);
        assert_eq!(events.len(), 3);
        assert_eq!(detector.triggers(), 3);
        assert_eq!(detector.latched().map(|e| e.contact), Some(Point::new(9, 0)));
    }

    #[test]
    fn test_missing_position_never_triggers() {
        let mut detector = CollisionDetector::default();
        assert!(detector.step(Some(Point::new(0, 0)), None, 5.0).is_none());
        assert!(detector.step(None, Some(Point::new(0, 0)), 5.0).is_none());
    }

    #[test]
    fn test_reset_clears_latch() {
        let mut detector = CollisionDetector::default();
        detector.step(Some(Point::new(0, 0)), Some(Point::new(5, 0)), 5.0);
        assert!(detector.latched().is_some());

        detector.reset();
        assert!(detector.latched().is_none());
        assert_eq!(detector.triggers(), 0);
    }
}
