//! Ellipse object.

use super::{ObjectGeometry, ObjectStyle};
use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An ellipse placed by its centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseObject {
    pub id: ObjectId,
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Rotation in degrees around the centre.
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl EllipseObject {
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: ObjectId::generate(),
            x: center.x,
            y: center.y,
            radius_x,
            radius_y,
            rotation: 0.0,
            style: ObjectStyle::default(),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl ObjectGeometry for EllipseObject {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let half_w = ((self.radius_x * cos).powi(2) + (self.radius_y * sin).powi(2)).sqrt();
        let half_h = ((self.radius_x * sin).powi(2) + (self.radius_y * cos).powi(2)).sqrt();
        Rect::new(
            self.x - half_w,
            self.y - half_h,
            self.x + half_w,
            self.y + half_h,
        )
    }

    fn translate(&mut self, offset: Vec2) {
        self.x += offset.x;
        self.y += offset.y;
    }

    /// Axis extremes in order: right, bottom, left, top (rotation ignored).
    fn anchors(&self) -> Vec<Point> {
        vec![
            Point::new(self.x + self.radius_x, self.y),
            Point::new(self.x, self.y + self.radius_y),
            Point::new(self.x - self.radius_x, self.y),
            Point::new(self.x, self.y - self.radius_y),
        ]
    }

    fn set_anchor(&mut self, index: usize, point: Point) -> bool {
        match index {
            0 | 2 => self.radius_x = (point.x - self.x).abs(),
            1 | 3 => self.radius_y = (point.y - self.y).abs(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_bounds() {
        let ellipse = EllipseObject::new(Point::new(50.0, 50.0), 20.0, 10.0);
        let bounds = ellipse.bounds();
        assert!((bounds.x0 - 30.0).abs() < 1e-9);
        assert!((bounds.x1 - 70.0).abs() < 1e-9);
        assert!((bounds.y0 - 40.0).abs() < 1e-9);
        assert!((bounds.y1 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_turn_swaps_extent() {
        let mut ellipse = EllipseObject::new(Point::new(0.0, 0.0), 20.0, 10.0);
        ellipse.rotation = 90.0;
        let bounds = ellipse.bounds();
        assert!((bounds.width() - 20.0).abs() < 1e-9);
        assert!((bounds.height() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_anchor_changes_radius() {
        let mut ellipse = EllipseObject::new(Point::new(0.0, 0.0), 20.0, 10.0);
        assert!(ellipse.set_anchor(3, Point::new(0.0, -25.0)));
        assert!((ellipse.radius_y - 25.0).abs() < f64::EPSILON);
        assert!(!ellipse.set_anchor(7, Point::ZERO));
    }
}
