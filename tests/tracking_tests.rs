// tests/tracking_tests.rs
use cuevision_core::corners::DEFAULT_CORNER_PAD;
use cuevision_core::{
    indexer, CollisionDetector, Detection, Point, Region, TableCorners, TrackedObject,
    TrackerConfig, VisionError,
};
use rand::Rng;

fn seen(x: i32, y: i32, radius: f32) -> Option<Detection> {
    Some(Detection::new(Point::new(x, y), radius))
}

#[test]
fn test_cue_ball_jump_is_rejected() {
    let mut cue = TrackedObject::new(TrackerConfig::primary());

    for (x, y) in [(100, 100), (150, 100), (300, 100)] {
        cue.observe(seen(x, y, 9.0));
    }
    // missing frames change nothing
    cue.observe(None);

    assert_eq!(
        cue.trajectory(),
        &[Point::new(100, 100), Point::new(150, 100)]
    );
    assert_eq!(cue.last_known(), Some(Point::new(300, 100)));
    assert!(cue.current().is_none());
}

#[test]
fn test_single_contact_frame_latches_one_marker() {
    let mut cue = TrackedObject::new(TrackerConfig::primary());
    let mut object = TrackedObject::new(TrackerConfig::secondary());
    let mut detector = CollisionDetector::default();

    let frames = [
        ((100, 200), (200, 200)),
        ((150, 200), (200, 200)),
        ((186, 200), (200, 200)),
        ((140, 200), (230, 200)),
        ((120, 200), (245, 200)),
    ];

    let mut events = Vec::new();
    for (c, o) in frames {
        cue.observe(seen(c.0, c.1, 9.0));
        object.observe(seen(o.0, o.1, 7.5));
        if let Some(event) = detector.step_trackers(&cue, &object) {
            events.push(event);
        }
    }

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].contact, Point::new(193, 200));
    assert_eq!(events[0].secondary.center, Point::new(200, 200));
    assert_eq!(events[0].secondary.radius, 7.5);
    assert_eq!(detector.latched(), Some(&events[0]));
    assert_eq!(detector.triggers(), 1);
}

#[test]
fn test_distant_balls_never_collide() {
    let mut cue = TrackedObject::new(TrackerConfig::primary());
    let mut object = TrackedObject::new(TrackerConfig::secondary());
    let mut detector = CollisionDetector::default();

    for step in 0..20 {
        cue.observe(seen(100 + step * 5, 100, 9.0));
        object.observe(seen(400, 300, 7.5));
        assert!(detector.step_trackers(&cue, &object).is_none());
    }
    assert!(detector.latched().is_none());
}

#[test]
fn test_reset_keeps_last_known_positions() {
    let mut cue = TrackedObject::new(TrackerConfig::primary());
    let mut object = TrackedObject::new(TrackerConfig::secondary());
    let mut detector = CollisionDetector::default();

    cue.observe(seen(190, 50, 9.0));
    object.observe(seen(200, 50, 7.5));
    assert!(detector.step_trackers(&cue, &object).is_some());

    cue.reset();
    object.reset();
    detector.reset();

    assert!(cue.trajectory().is_empty());
    assert!(detector.latched().is_none());
    // positions survive, so the next step still sees the contact
    assert!(detector.step_trackers(&cue, &object).is_some());
}

#[test]
fn test_random_walk_trajectory_has_no_jumps() {
    let mut rng = rand::thread_rng();

    for config in [TrackerConfig::primary(), TrackerConfig::secondary()] {
        let mut ball = TrackedObject::new(config);
        let (mut x, mut y) = (400, 240);

        for _ in 0..500 {
            if rng.gen_range(0..10) == 0 {
                ball.observe(None);
                continue;
            }
            let reach = if rng.gen_range(0..8) == 0 { 300 } else { 15 };
            x += rng.gen_range(-reach..=reach);
            y += rng.gen_range(-reach..=reach);
            ball.observe(seen(x, y, 8.0));
        }

        for pair in ball.trajectory().windows(2) {
            assert!(pair[0].distance(&pair[1]) < config.jump_threshold);
        }
    }
}

#[test]
fn test_table_corners_from_rectangle() {
    let bed = Region::from(vec![(50, 40), (590, 40), (590, 440), (50, 440)]);
    let corners = TableCorners::from_region(&bed, 640, 480, 10).unwrap();

    assert_eq!(corners.upper_left, Point::new(40, 30));
    assert_eq!(corners.upper_right, Point::new(600, 30));
    assert_eq!(corners.lower_right, Point::new(600, 450));
    assert_eq!(corners.lower_left, Point::new(40, 450));

    let size = corners.destination_size();
    assert_eq!((size.width, size.height), (560, 1120));
}

#[test]
fn test_coincident_corners_are_degenerate() {
    let dot = Region::from(vec![(300, 200)]);
    for pad in [0, DEFAULT_CORNER_PAD] {
        assert_eq!(
            TableCorners::from_region(&dot, 854, 480, pad),
            Err(VisionError::DegenerateCalibration)
        );
    }
}

#[test]
fn test_largest_region_ties_go_to_first() {
    let a = Region::from(vec![(0, 0), (10, 0), (10, 10), (0, 10)]);
    let b = Region::from(vec![(20, 20), (30, 20), (30, 30), (20, 30)]);
    let small = Region::from(vec![(0, 0), (2, 0), (2, 2)]);

    assert_eq!(Region::select_largest(&[small, a, b]), Some(1));
    assert_eq!(Region::select_largest(&[]), None);
    assert_eq!(indexer::index_of_max(&[3, 7, 7, 1]), Some(1));
    assert_eq!(indexer::index_of_min(&[3, 1, 7, 1]), Some(1));
}
