//! Canvas records and the canvas payload received from the server.

use crate::ids::{CanvasId, ObjectId, UserId};
use crate::objects::CanvasObject;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where a nested canvas sits inside its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentCanvas {
    pub canvas_id: CanvasId,
    /// Offset of the child's top-left corner in parent coordinates.
    pub origin_x: f64,
    pub origin_y: f64,
}

impl ParentCanvas {
    pub fn new(canvas_id: CanvasId, origin_x: f64, origin_y: f64) -> Self {
        Self {
            canvas_id,
            origin_x,
            origin_y,
        }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }
}

/// Which users may work on a canvas.
///
/// On the wire a missing or null list means everyone is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<UserId>>", into = "Option<Vec<UserId>>")]
pub enum AccessList {
    #[default]
    Unrestricted,
    Only(BTreeSet<UserId>),
}

impl AccessList {
    pub fn allows(&self, user: &UserId) -> bool {
        match self {
            AccessList::Unrestricted => true,
            AccessList::Only(users) => users.contains(user),
        }
    }
}

impl From<Option<Vec<UserId>>> for AccessList {
    fn from(users: Option<Vec<UserId>>) -> Self {
        match users {
            None => AccessList::Unrestricted,
            Some(users) => AccessList::Only(users.into_iter().collect()),
        }
    }
}

impl From<AccessList> for Option<Vec<UserId>> {
    fn from(access: AccessList) -> Self {
        match access {
            AccessList::Unrestricted => None,
            AccessList::Only(users) => Some(users.into_iter().collect()),
        }
    }
}

/// A canvas as stored in the canvas table. Objects and access lists live in
/// their own indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub id: CanvasId,
    #[serde(default)]
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_canvas: Option<ParentCanvas>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_modified: Option<String>,
}

impl Canvas {
    /// Create a root canvas with a fresh id.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: CanvasId::generate(),
            name: name.into(),
            width,
            height,
            parent_canvas: None,
            time_created: None,
            time_last_modified: None,
        }
    }

    /// Nest this canvas inside `parent` at the given origin.
    pub fn with_parent(mut self, parent: CanvasId, origin_x: f64, origin_y: f64) -> Self {
        self.parent_canvas = Some(ParentCanvas::new(parent, origin_x, origin_y));
        self
    }
}

/// A canvas payload: the canvas itself plus everything drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasData {
    #[serde(flatten)]
    pub canvas: Canvas,
    #[serde(default)]
    pub allowed_users: AccessList,
    #[serde(default)]
    pub shapes: BTreeMap<ObjectId, CanvasObject>,
}

impl CanvasData {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            allowed_users: AccessList::Unrestricted,
            shapes: BTreeMap::new(),
        }
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = CanvasObject>) -> Self {
        for object in objects {
            self.shapes.insert(object.id().clone(), object);
        }
        self
    }

    pub fn with_access(mut self, access: AccessList) -> Self {
        self.allowed_users = access;
        self
    }

    /// Split the payload into the records each index stores.
    pub fn normalize(self) -> NormalizedCanvas {
        let mut objects = Vec::with_capacity(self.shapes.len());
        for (key, object) in self.shapes {
            if &key != object.id() {
                log::warn!(
                    "canvas {}: object keyed {} carries id {}, using the latter",
                    self.canvas.id,
                    key,
                    object.id()
                );
            }
            objects.push(object);
        }
        NormalizedCanvas {
            canvas: self.canvas,
            access: self.allowed_users,
            objects,
        }
    }
}

/// Output of [`CanvasData::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedCanvas {
    pub canvas: Canvas,
    pub access: AccessList,
    pub objects: Vec<CanvasObject>,
}

impl NormalizedCanvas {
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectKind;

    const NESTED: &str = r#"{
        "id": "68d5e8d4829da666aece0204",
        "width": 100,
        "height": 100,
        "name": "Canvas Alpha - Three",
        "parentCanvas": {
            "canvasId": "68d5e8d4829da666aece0202",
            "originX": 50,
            "originY": 50
        },
        "timeCreated": "2025-08-01T12:10:00.000Z",
        "shapes": {
            "68d5e8d4829da666aece0300": {
                "type": "rect", "id": "68d5e8d4829da666aece0300",
                "width": 10, "height": 10, "x": 20, "y": 20, "rotation": 0,
                "fillColor": "red", "strokeColor": "black", "strokeWidth": 1.0
            }
        }
    }"#;

    #[test]
    fn test_parse_nested_canvas() {
        let data: CanvasData = serde_json::from_str(NESTED).unwrap();
        let parent = data.canvas.parent_canvas.as_ref().unwrap();
        assert_eq!(parent.canvas_id.as_str(), "68d5e8d4829da666aece0202");
        assert_eq!(parent.origin(), Vec2::new(50.0, 50.0));
        assert_eq!(data.allowed_users, AccessList::Unrestricted);
        assert_eq!(data.shapes.len(), 1);
    }

    #[test]
    fn test_normalize_splits_records() {
        let data: CanvasData = serde_json::from_str(NESTED).unwrap();
        let normalized = data.normalize();
        assert_eq!(normalized.canvas.name, "Canvas Alpha - Three");
        assert_eq!(normalized.objects.len(), 1);
        assert_eq!(normalized.objects[0].kind(), ObjectKind::Rect);
        assert_eq!(
            normalized.object_ids(),
            vec![ObjectId::from("68d5e8d4829da666aece0300")]
        );
    }

    #[test]
    fn test_access_list() {
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        let open: AccessList = serde_json::from_str("null").unwrap();
        assert!(open.allows(&bob));

        let closed: AccessList = serde_json::from_str(r#"["alice"]"#).unwrap();
        assert!(closed.allows(&alice));
        assert!(!closed.allows(&bob));

        assert_eq!(serde_json::to_string(&closed).unwrap(), r#"["alice"]"#);
    }
}
