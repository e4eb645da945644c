//! Rectangles.

use cgmath::{EuclideanSpace, Point2, Vector2};
use std::ops;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Creates a new rectangle from its components.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// Returns true if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0. || self.size.y <= 0.
    }

    /// Returns the point opposite to the origin.
    pub fn max(&self) -> Point2<f64> {
        self.origin + self.size
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns true if the two rectangles intersect.
    ///
    /// Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        let own_opposite = self.max();
        let rect_opposite = rect.max();

        self.origin.x < rect_opposite.x
            && self.origin.y < rect_opposite.y
            && rect.origin.x < own_opposite.x
            && rect.origin.y < own_opposite.y
    }

    /// Returns the intersection rectangle, or None if it would be empty.
    pub fn intersect(&self, rect: Rect) -> Option<Rect> {
        if self.is_empty() || rect.is_empty() || !self.intersects(rect) {
            return None;
        }

        let min_x = self.origin.x.max(rect.origin.x);
        let min_y = self.origin.y.max(rect.origin.y);
        let max_x = (self.origin.x + self.size.x).min(rect.origin.x + rect.size.x);
        let max_y = (self.origin.y + self.size.y).min(rect.origin.y + rect.size.y);

        Some(Rect {
            origin: (min_x, min_y).into(),
            size: (max_x - min_x, max_y - min_y).into(),
        })
    }

    /// Returns a new rectangle grown outwards by the given amounts.
    pub fn outset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        Rect {
            origin: (self.origin.x - left, self.origin.y - top).into(),
            size: (self.size.x + left + right, self.size.y + top + bottom).into(),
        }
    }
}

impl ops::Add<Vector2<f64>> for Rect {
    type Output = Rect;
    fn add(self, offset: Vector2<f64>) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

impl ops::Add<Point2<f64>> for Rect {
    type Output = Rect;
    fn add(self, point: Point2<f64>) -> Rect {
        self + point.to_vec()
    }
}
