//! Drawable canvas objects.

mod ellipse;
mod rect;
mod vector;

pub use ellipse::EllipseObject;
pub use rect::RectObject;
pub use vector::VectorObject;

use crate::ids::ObjectId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Stroke and fill attributes shared by every object kind.
///
/// Colors are kept as the strings the server sent (`"red"`, `"#ff0000"`);
/// they are handed to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStyle {
    /// Fill color (None = no fill).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Stroke color.
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    /// Stroke width.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_stroke_width() -> f64 {
    1.0
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

/// The kind of a canvas object, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rect,
    Ellipse,
    Vector,
}

/// Geometry operations every object kind implements.
pub trait ObjectGeometry {
    /// Get the unique identifier.
    fn id(&self) -> &ObjectId;

    /// Axis-aligned bounding box in canvas-local coordinates.
    fn bounds(&self) -> Rect;

    /// Shift the object by an offset.
    fn translate(&mut self, offset: Vec2);

    /// Points a user can drag to reshape the object.
    fn anchors(&self) -> Vec<Point>;

    /// Move the anchor at `index` to `point`.
    /// Returns false if there is no such anchor.
    fn set_anchor(&mut self, index: usize, point: Point) -> bool;
}

/// A drawable object. Tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasObject {
    Rect(RectObject),
    Ellipse(EllipseObject),
    Vector(VectorObject),
}

impl CanvasObject {
    pub fn id(&self) -> &ObjectId {
        match self {
            CanvasObject::Rect(o) => o.id(),
            CanvasObject::Ellipse(o) => o.id(),
            CanvasObject::Vector(o) => o.id(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            CanvasObject::Rect(_) => ObjectKind::Rect,
            CanvasObject::Ellipse(_) => ObjectKind::Ellipse,
            CanvasObject::Vector(_) => ObjectKind::Vector,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            CanvasObject::Rect(o) => o.bounds(),
            CanvasObject::Ellipse(o) => o.bounds(),
            CanvasObject::Vector(o) => o.bounds(),
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        match self {
            CanvasObject::Rect(o) => o.translate(offset),
            CanvasObject::Ellipse(o) => o.translate(offset),
            CanvasObject::Vector(o) => o.translate(offset),
        }
    }

    pub fn anchors(&self) -> Vec<Point> {
        match self {
            CanvasObject::Rect(o) => o.anchors(),
            CanvasObject::Ellipse(o) => o.anchors(),
            CanvasObject::Vector(o) => o.anchors(),
        }
    }

    pub fn set_anchor(&mut self, index: usize, point: Point) -> bool {
        match self {
            CanvasObject::Rect(o) => o.set_anchor(index, point),
            CanvasObject::Ellipse(o) => o.set_anchor(index, point),
            CanvasObject::Vector(o) => o.set_anchor(index, point),
        }
    }

    pub fn style(&self) -> &ObjectStyle {
        match self {
            CanvasObject::Rect(o) => &o.style,
            CanvasObject::Ellipse(o) => &o.style,
            CanvasObject::Vector(o) => &o.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ObjectStyle {
        match self {
            CanvasObject::Rect(o) => &mut o.style,
            CanvasObject::Ellipse(o) => &mut o.style,
            CanvasObject::Vector(o) => &mut o.style,
        }
    }

    /// The reference point used to place the object: the top-left corner of
    /// a rect, the centre of an ellipse, the first vertex of a vector.
    pub fn position(&self) -> Point {
        match self {
            CanvasObject::Rect(o) => o.position(),
            CanvasObject::Ellipse(o) => o.center(),
            CanvasObject::Vector(o) => o.points.first().copied().unwrap_or(Point::ZERO),
        }
    }
}

impl From<RectObject> for CanvasObject {
    fn from(o: RectObject) -> Self {
        CanvasObject::Rect(o)
    }
}

impl From<EllipseObject> for CanvasObject {
    fn from(o: EllipseObject) -> Self {
        CanvasObject::Ellipse(o)
    }
}

impl From<VectorObject> for CanvasObject {
    fn from(o: VectorObject) -> Self {
        CanvasObject::Vector(o)
    }
}

/// Serde adapter for polyline points, which travel as a flat
/// `[x0, y0, x1, y1, ...]` array.
pub(crate) mod flat_points {
    use kurbo::Point;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().flat_map(|p| [p.x, p.y]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<f64>::deserialize(deserializer)?;
        if flat.len() % 2 != 0 {
            return Err(D::Error::custom(format!(
                "point list has odd length {}",
                flat.len()
            )));
        }
        Ok(flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_wire_format() {
        let json = r#"{
            "type": "rect",
            "id": "68d5e8d4829da666aece0300",
            "width": 10, "height": 10, "x": 20, "y": 20, "rotation": 0,
            "fillColor": "red", "strokeColor": "black", "strokeWidth": 1.0
        }"#;
        let obj: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.kind(), ObjectKind::Rect);
        assert_eq!(obj.id().as_str(), "68d5e8d4829da666aece0300");
        assert_eq!(obj.style().fill_color.as_deref(), Some("red"));
        assert_eq!(obj.bounds(), Rect::new(20.0, 20.0, 30.0, 30.0));
    }

    #[test]
    fn test_vector_points_are_flat_on_the_wire() {
        let json = r#"{"type":"vector","id":"v1","points":[0,0,10,5,20,0],"strokeColor":"blue","strokeWidth":2}"#;
        let obj: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.anchors().len(), 3);

        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["type"], "vector");
        assert_eq!(value["points"], serde_json::json!([0.0, 0.0, 10.0, 5.0, 20.0, 0.0]));
    }

    #[test]
    fn test_odd_point_list_is_rejected() {
        let json = r#"{"type":"vector","id":"v1","points":[0,0,10]}"#;
        assert!(serde_json::from_str::<CanvasObject>(json).is_err());
    }

    #[test]
    fn test_style_defaults_when_absent() {
        let json = r#"{"type":"ellipse","id":"e1","x":5,"y":5,"radiusX":2,"radiusY":3}"#;
        let obj: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.style(), &ObjectStyle::default());
    }

    #[test]
    fn test_translate_dispatches_per_kind() {
        let mut objects: Vec<CanvasObject> = vec![
            RectObject::new(Point::new(0.0, 0.0), 10.0, 10.0).into(),
            EllipseObject::new(Point::new(5.0, 5.0), 5.0, 5.0).into(),
            VectorObject::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]).into(),
        ];
        for obj in &mut objects {
            let before = obj.bounds();
            obj.translate(Vec2::new(100.0, 50.0));
            let after = obj.bounds();
            assert!((after.x0 - before.x0 - 100.0).abs() < 1e-9);
            assert!((after.y0 - before.y0 - 50.0).abs() < 1e-9);
        }
    }
}
