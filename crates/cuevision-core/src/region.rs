//! Closed polygonal regions extracted from binary masks

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::indexer::{index_of_max_by_key, index_of_min_by_key};

/// Outer boundary of a segmented blob
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub points: Vec<Point>,
}

impl Region {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed shoelace area; sign depends on the winding order
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice = 0i64;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        twice as f64 / 2.0
    }

    /// Enclosed area, independent of winding order
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Point of the region closest to `target`; first occurrence wins ties
    pub fn nearest_point(&self, target: &Point) -> Option<Point> {
        index_of_min_by_key(&self.points, |p| p.distance(target)).map(|i| self.points[i])
    }

    /// Index of the region with the largest area; first occurrence wins ties
    pub fn select_largest(regions: &[Region]) -> Option<usize> {
        index_of_max_by_key(regions, |r| r.area())
    }
}

impl From<Vec<(i32, i32)>> for Region {
    fn from(points: Vec<(i32, i32)>) -> Self {
        Self::new(points.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i32, y: i32, side: i32) -> Region {
        Region::from(vec![(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
    }

    #[test]
    fn test_area_ignores_winding() {
        let cw = square(0, 0, 10);
        let mut ccw = cw.clone();
        ccw.points.reverse();

        assert_eq!(cw.area(), 100.0);
        assert_eq!(ccw.area(), 100.0);
        assert_eq!(cw.signed_area(), -ccw.signed_area());
    }

    #[test]
    fn test_degenerate_area() {
        assert_eq!(Region::from(vec![(1, 1), (5, 5)]).area(), 0.0);
        assert_eq!(Region::default().area(), 0.0);
    }

    #[test]
    fn test_select_largest_first_occurrence() {
        let regions = vec![square(0, 0, 2), square(10, 10, 5), square(50, 50, 5), square(0, 0, 1)];
        assert_eq!(Region::select_largest(&regions), Some(1));
        assert_eq!(Region::select_largest(&[]), None);
    }

    #[test]
    fn test_nearest_point() {
        let region = square(10, 10, 20);
        assert_eq!(region.nearest_point(&Point::new(0, 0)), Some(Point::new(10, 10)));
        assert_eq!(region.nearest_point(&Point::new(100, 0)), Some(Point::new(30, 10)));
        assert_eq!(Region::default().nearest_point(&Point::new(0, 0)), None);
    }
}
