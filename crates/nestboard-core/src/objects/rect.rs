//! Rectangle object.

use super::{ObjectGeometry, ObjectStyle};
use crate::ids::ObjectId;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, optionally rotated around its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectObject {
    pub id: ObjectId,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise, around `(x, y)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl RectObject {
    /// Create a new rectangle with a fresh id.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: ObjectId::generate(),
            x: position.x,
            y: position.y,
            width,
            height,
            rotation: 0.0,
            style: ObjectStyle::default(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The rectangle ignoring rotation.
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn placement(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::rotate(self.rotation.to_radians())
    }
}

impl ObjectGeometry for RectObject {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn bounds(&self) -> Rect {
        if self.rotation == 0.0 {
            return self.as_rect();
        }
        self.placement()
            .transform_rect_bbox(Rect::new(0.0, 0.0, self.width, self.height))
    }

    fn translate(&mut self, offset: Vec2) {
        self.x += offset.x;
        self.y += offset.y;
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    fn anchors(&self) -> Vec<Point> {
        let placement = self.placement();
        [
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
        .into_iter()
        .map(|p| placement * p)
        .collect()
    }

    fn set_anchor(&mut self, index: usize, point: Point) -> bool {
        // The opposite corner stays put. Rotation is not accounted for.
        let rect = self.as_rect();
        let opposite = match index {
            0 => Point::new(rect.x1, rect.y1),
            1 => Point::new(rect.x0, rect.y1),
            2 => Point::new(rect.x0, rect.y0),
            3 => Point::new(rect.x1, rect.y0),
            _ => return false,
        };
        let resized = Rect::from_points(opposite, point);
        self.x = resized.x0;
        self.y = resized.y0;
        self.width = resized.width();
        self.height = resized.height();
        true
    }
}
