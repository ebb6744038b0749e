//! Whiteboard records.

use crate::canvas::CanvasData;
use crate::ids::{CanvasId, UserId, WhiteboardId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Level of access a user holds on a whiteboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
    Own,
}

/// One entry of a whiteboard's permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    pub user: UserId,
    pub permission: Permission,
}

/// A whiteboard: the document that owns a root canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whiteboard {
    pub id: WhiteboardId,
    #[serde(default)]
    pub name: String,
    pub root_canvas: CanvasId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(default)]
    pub user_permissions: Vec<UserPermission>,
}

impl Whiteboard {
    /// Highest permission listed for `user`, if any.
    pub fn permission_of(&self, user: &UserId) -> Option<Permission> {
        self.user_permissions
            .iter()
            .filter(|p| &p.user == user)
            .map(|p| p.permission)
            .max()
    }
}

/// A whiteboard payload with every canvas the user can reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardData {
    #[serde(flatten)]
    pub whiteboard: Whiteboard,
    #[serde(default)]
    pub canvases: Vec<CanvasData>,
}

impl WhiteboardData {
    /// Canvases ordered so every parent comes before its children.
    ///
    /// Canvases whose parent is not part of the payload are treated as roots.
    pub fn canvases_parents_first(self) -> (Whiteboard, Vec<CanvasData>) {
        let Self { whiteboard, canvases } = self;
        let in_payload: HashSet<CanvasId> = canvases.iter().map(|c| c.canvas.id.clone()).collect();
        let mut placed: HashSet<CanvasId> = HashSet::new();
        let mut ordered = Vec::with_capacity(canvases.len());
        let mut pending = canvases;

        while !pending.is_empty() {
            let before = pending.len();
            let (ready, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|data| {
                match &data.canvas.parent_canvas {
                    None => true,
                    Some(parent) => {
                        placed.contains(&parent.canvas_id) || !in_payload.contains(&parent.canvas_id)
                    }
                }
            });
            placed.extend(ready.iter().map(|c| c.canvas.id.clone()));
            ordered.extend(ready);

            if rest.len() == before {
                // Parent cycle among the remaining canvases; keep payload order.
                log::warn!(
                    "whiteboard {}: {} canvases form a parent cycle",
                    whiteboard.id,
                    rest.len()
                );
                ordered.extend(rest);
                break;
            }
            pending = rest;
        }

        (whiteboard, ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    #[test]
    fn test_permission_of() {
        let json = r#"{
            "id": "68d5e8d4829da666aece0402",
            "name": "Project Gamma",
            "rootCanvas": "68d5e8d4829da666aece0206",
            "userPermissions": [
                {"type": "user", "user": "carol", "permission": "own"},
                {"type": "user", "user": "alice", "permission": "edit"}
            ]
        }"#;
        let board: Whiteboard = serde_json::from_str(json).unwrap();
        assert_eq!(board.permission_of(&UserId::from("alice")), Some(Permission::Edit));
        assert_eq!(board.permission_of(&UserId::from("carol")), Some(Permission::Own));
        assert_eq!(board.permission_of(&UserId::from("dave")), None);
    }

    #[test]
    fn test_parents_first_ordering() {
        let root = Canvas::new("root", 3000.0, 3000.0);
        let child = Canvas::new("child", 200.0, 200.0).with_parent(root.id.clone(), 100.0, 100.0);
        let grandchild =
            Canvas::new("grandchild", 100.0, 100.0).with_parent(child.id.clone(), 50.0, 50.0);

        let data = WhiteboardData {
            whiteboard: Whiteboard {
                id: WhiteboardId::from("wb"),
                name: "Project".to_string(),
                root_canvas: root.id.clone(),
                time_created: None,
                user_permissions: Vec::new(),
            },
            canvases: vec![
                CanvasData::new(grandchild.clone()),
                CanvasData::new(child.clone()),
                CanvasData::new(root.clone()),
            ],
        };

        let (_, ordered) = data.canvases_parents_first();
        let ids: Vec<_> = ordered.iter().map(|c| c.canvas.id.clone()).collect();
        assert_eq!(ids, vec![root.id, child.id, grandchild.id]);
    }
}
