//! Integer image points and circles

use serde::{Deserialize, Serialize};

/// Pixel coordinate in image space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point from float coordinates, truncated toward zero.
    pub fn truncated(x: f32, y: f32) -> Self {
        Self::new(x as i32, y as i32)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint with each coordinate truncated toward zero
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(
            ((self.x + other.x) as f64 / 2.0) as i32,
            ((self.y + other.y) as f64 / 2.0) as i32,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Circle with an integer center, as drawn on frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Twice the signed area of triangle (a, b, c); zero when collinear.
pub fn cross(a: &Point, b: &Point, c: &Point) -> f64 {
    let abx = (b.x - a.x) as f64;
    let aby = (b.y - a.y) as f64;
    let acx = (c.x - a.x) as f64;
    let acy = (c.y - a.y) as f64;
    abx * acy - aby * acx
}
