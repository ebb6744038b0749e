//! Vector (polyline) object.

use super::{ObjectGeometry, ObjectStyle, flat_points};
use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An open polyline through a list of vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObject {
    pub id: ObjectId,
    #[serde(with = "flat_points")]
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl VectorObject {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: ObjectId::generate(),
            points,
            style: ObjectStyle::default(),
        }
    }
}

impl ObjectGeometry for VectorObject {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(&first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |acc, &p| acc.union_pt(p))
    }

    fn translate(&mut self, offset: Vec2) {
        for p in &mut self.points {
            *p += offset;
        }
    }

    fn anchors(&self) -> Vec<Point> {
        self.points.clone()
    }

    fn set_anchor(&mut self, index: usize, point: Point) -> bool {
        match self.points.get_mut(index) {
            Some(p) => {
                *p = point;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_bounds() {
        let vector = VectorObject::new(vec![
            Point::new(10.0, 0.0),
            Point::new(-5.0, 20.0),
            Point::new(30.0, 5.0),
        ]);
        assert_eq!(vector.bounds(), Rect::new(-5.0, 0.0, 30.0, 20.0));
    }

    #[test]
    fn test_empty_vector_has_zero_bounds() {
        let vector = VectorObject::new(Vec::new());
        assert_eq!(vector.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_move_anchor() {
        let mut vector = VectorObject::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert!(vector.set_anchor(1, Point::new(10.0, 10.0)));
        assert_eq!(vector.points[1], Point::new(10.0, 10.0));
        assert!(!vector.set_anchor(2, Point::ZERO));
    }
}
