//! Session bridge between the wire protocol and the store.
//!
//! Incoming server messages are decoded and applied to the store. Local
//! actions are applied immediately and queued as outbound messages, which the
//! transport drains with [`Session::take_outgoing`].

use crate::canvas::CanvasData;
use crate::error::ProtocolError;
use crate::ids::{CanvasId, ClientId, ObjectId, WhiteboardId};
use crate::objects::CanvasObject;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::store::{MergeOutcome, WhiteboardStore};

/// What applying a server message changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    WhiteboardLoaded {
        whiteboard: WhiteboardId,
        canvases: usize,
    },
    CanvasCreated { canvas: CanvasId },
    CanvasDeleted { canvas: CanvasId },
    CanvasMerged {
        canvas: CanvasId,
        outcome: MergeOutcome,
    },
    /// Objects were created or updated on a canvas.
    ObjectsChanged {
        canvas: CanvasId,
        objects: Vec<ObjectId>,
    },
    ObjectsDeleted { objects: Vec<ObjectId> },
    EditorChanged {
        canvas: CanvasId,
        editor: Option<ClientId>,
    },
    ActiveUsersChanged { whiteboard: WhiteboardId },
    /// The server reported an error.
    Error { message: String },
}

/// One client's connection to a whiteboard.
pub struct Session {
    store: WhiteboardStore,
    /// This client's id, used for edit claims.
    client_id: ClientId,
    /// Whiteboard loaded by the last `init_whiteboard`.
    whiteboard: Option<WhiteboardId>,
    /// Pending outgoing messages (JSON strings).
    outgoing: Vec<String>,
}

impl Session {
    pub fn new(client_id: ClientId, store: WhiteboardStore) -> Self {
        Self {
            store,
            client_id,
            whiteboard: None,
            outgoing: Vec::new(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn whiteboard(&self) -> Option<&WhiteboardId> {
        self.whiteboard.as_ref()
    }

    pub fn store(&self) -> &WhiteboardStore {
        &self.store
    }

    /// Selection is local state; it goes through the store directly.
    pub fn store_mut(&mut self) -> &mut WhiteboardStore {
        &mut self.store
    }

    pub fn into_store(self) -> WhiteboardStore {
        self.store
    }

    // --- Incoming Message Handling ---

    /// Decode and apply an incoming server message.
    pub fn handle_message(&mut self, json: &str) -> Result<SessionEvent, ProtocolError> {
        let msg = ServerMessage::from_json(json)?;
        Ok(self.apply(msg))
    }

    /// Apply an already decoded server message.
    pub fn apply(&mut self, msg: ServerMessage) -> SessionEvent {
        match msg {
            ServerMessage::InitWhiteboard { whiteboard } => {
                let id = whiteboard.whiteboard.id.clone();
                let canvases = whiteboard.canvases.len();
                self.store.add_whiteboard(whiteboard);
                self.whiteboard = Some(id.clone());
                log::info!("session: loaded whiteboard {} ({} canvases)", id, canvases);
                SessionEvent::WhiteboardLoaded {
                    whiteboard: id,
                    canvases,
                }
            }
            ServerMessage::CreateCanvas {
                whiteboard_id,
                canvas,
            } => {
                let id = canvas.canvas.id.clone();
                self.store.add_canvas(&whiteboard_id, canvas);
                SessionEvent::CanvasCreated { canvas: id }
            }
            ServerMessage::DeleteCanvas { canvas_id } => {
                self.store.delete_canvas(&canvas_id);
                SessionEvent::CanvasDeleted { canvas: canvas_id }
            }
            ServerMessage::MergeCanvas { canvas_id } => {
                let outcome = self.store.merge_canvas(&canvas_id);
                SessionEvent::CanvasMerged {
                    canvas: canvas_id,
                    outcome,
                }
            }
            ServerMessage::CreateCanvasObjects { canvas_id, objects }
            | ServerMessage::UpdateCanvasObjects { canvas_id, objects } => {
                let objects = self.store.set_canvas_objects(&canvas_id, objects);
                SessionEvent::ObjectsChanged {
                    canvas: canvas_id,
                    objects,
                }
            }
            ServerMessage::DeleteCanvasObjects { object_ids } => {
                self.store.remove_canvas_objects(&object_ids);
                SessionEvent::ObjectsDeleted {
                    objects: object_ids,
                }
            }
            ServerMessage::EditingCanvas {
                canvas_id,
                client_id,
            } => {
                self.store.set_current_editor(&canvas_id, &client_id);
                SessionEvent::EditorChanged {
                    canvas: canvas_id,
                    editor: Some(client_id),
                }
            }
            ServerMessage::DoneEditingCanvas { canvas_id } => {
                self.store.unset_current_editor(&canvas_id);
                SessionEvent::EditorChanged {
                    canvas: canvas_id,
                    editor: None,
                }
            }
            ServerMessage::ActiveUsers {
                whiteboard_id,
                clients,
            } => {
                self.store.set_active_users(&whiteboard_id, &clients);
                SessionEvent::ActiveUsersChanged {
                    whiteboard: whiteboard_id,
                }
            }
            ServerMessage::UserJoined {
                whiteboard_id,
                client_id,
            } => {
                self.store
                    .add_active_users(&whiteboard_id, std::slice::from_ref(&client_id));
                SessionEvent::ActiveUsersChanged {
                    whiteboard: whiteboard_id,
                }
            }
            ServerMessage::UserLeft {
                whiteboard_id,
                client_id,
            } => {
                self.store
                    .remove_active_users(&whiteboard_id, std::slice::from_ref(&client_id));
                SessionEvent::ActiveUsersChanged {
                    whiteboard: whiteboard_id,
                }
            }
            ServerMessage::Error { message } => {
                log::warn!("session: server error: {}", message);
                SessionEvent::Error { message }
            }
        }
    }

    // --- Local Actions ---

    /// Create a canvas on the loaded whiteboard.
    ///
    /// Returns None if no whiteboard has been loaded yet.
    pub fn local_create_canvas(&mut self, canvas: CanvasData) -> Option<CanvasId> {
        let Some(whiteboard) = self.whiteboard.clone() else {
            log::warn!("session: cannot create canvas before a whiteboard is loaded");
            return None;
        };
        let id = canvas.canvas.id.clone();
        self.store.add_canvas(&whiteboard, canvas.clone());
        self.queue(ClientMessage::CreateCanvas {
            whiteboard_id: whiteboard,
            canvas,
        });
        Some(id)
    }

    /// Draw new objects on a canvas.
    pub fn local_create_objects(&mut self, canvas: &CanvasId, objects: Vec<CanvasObject>) -> Vec<ObjectId> {
        let written = self.store.set_canvas_objects(canvas, objects.clone());
        if !written.is_empty() {
            self.queue(ClientMessage::CreateCanvasObjects {
                canvas_id: canvas.clone(),
                objects: retain_written(objects, &written),
            });
        }
        written
    }

    /// Store edited objects and send them to the server.
    pub fn local_update_objects(&mut self, canvas: &CanvasId, objects: Vec<CanvasObject>) -> Vec<ObjectId> {
        let written = self.store.set_canvas_objects(canvas, objects.clone());
        if !written.is_empty() {
            self.queue(ClientMessage::UpdateCanvasObjects {
                canvas_id: canvas.clone(),
                objects: retain_written(objects, &written),
            });
        }
        written
    }

    /// Delete objects. Only ids that existed are sent.
    pub fn local_delete_objects(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let removed: Vec<ObjectId> = self
            .store
            .remove_canvas_objects(ids)
            .iter()
            .map(|object| object.id().clone())
            .collect();
        if !removed.is_empty() {
            self.queue(ClientMessage::DeleteCanvasObjects {
                object_ids: removed.clone(),
            });
        }
        removed
    }

    pub fn local_merge_canvas(&mut self, canvas: &CanvasId) -> MergeOutcome {
        let outcome = self.store.merge_canvas(canvas);
        if matches!(outcome, MergeOutcome::Merged { .. }) {
            self.queue(ClientMessage::MergeCanvas {
                canvas_id: canvas.clone(),
            });
        }
        outcome
    }

    pub fn local_delete_canvas(&mut self, canvas: &CanvasId) -> bool {
        let deleted = self.store.delete_canvas(canvas);
        if deleted {
            self.queue(ClientMessage::DeleteCanvas {
                canvas_id: canvas.clone(),
            });
        }
        deleted
    }

    /// Take edit focus on a canvas. Returns the client that held it before.
    pub fn local_claim_canvas(&mut self, canvas: &CanvasId) -> Option<ClientId> {
        let displaced = self.store.set_current_editor(canvas, &self.client_id);
        self.queue(ClientMessage::EditingCanvas {
            canvas_id: canvas.clone(),
        });
        displaced
    }

    /// Give up edit focus. Does nothing unless this client holds it.
    pub fn local_release_canvas(&mut self, canvas: &CanvasId) -> bool {
        if self.store.current_editor(canvas) != Some(&self.client_id) {
            return false;
        }
        self.store.unset_current_editor(canvas);
        self.queue(ClientMessage::DoneEditingCanvas {
            canvas_id: canvas.clone(),
        });
        true
    }

    // --- Outgoing ---

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    fn queue(&mut self, msg: ClientMessage) {
        match msg.to_json() {
            Ok(json) => self.outgoing.push(json),
            Err(err) => log::error!("session: dropping outgoing message: {}", err),
        }
    }
}

fn retain_written(objects: Vec<CanvasObject>, written: &[ObjectId]) -> Vec<CanvasObject> {
    objects
        .into_iter()
        .filter(|object| written.contains(object.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::objects::RectObject;
    use kurbo::Point;

    const INIT: &str = r#"{
        "type": "init_whiteboard",
        "whiteboard": {
            "id": "wb",
            "name": "Board",
            "rootCanvas": "A",
            "canvases": [
                {"id": "B", "width": 100, "height": 100,
                 "parentCanvas": {"canvasId": "A", "originX": 10, "originY": 10},
                 "shapes": {"o2": {"type": "rect", "id": "o2", "x": 0, "y": 0, "width": 5, "height": 5}}},
                {"id": "A", "width": 1000, "height": 1000,
                 "shapes": {"o1": {"type": "ellipse", "id": "o1", "x": 50, "y": 50, "radiusX": 5, "radiusY": 5}}}
            ]
        }
    }"#;

    fn loaded_session() -> Session {
        let mut session = Session::new(ClientId::from("me"), WhiteboardStore::new());
        session.handle_message(INIT).unwrap();
        session
    }

    fn canvas(id: &str) -> CanvasId {
        CanvasId::from(id)
    }

    #[test]
    fn test_init_whiteboard() {
        let session = loaded_session();
        let store = session.store();

        assert_eq!(session.whiteboard(), Some(&WhiteboardId::from("wb")));
        assert_eq!(store.parent_of(&canvas("B")), Some(&canvas("A")));
        assert_eq!(store.canvases_in_whiteboard(&WhiteboardId::from("wb")), &[canvas("A"), canvas("B")]);
        assert_eq!(store.objects_by_whiteboard(&WhiteboardId::from("wb")).len(), 2);
        assert!(!session.has_outgoing());
    }

    #[test]
    fn test_remote_merge() {
        let mut session = loaded_session();
        let event = session
            .handle_message(r#"{"type":"merge_canvas","canvasId":"B"}"#)
            .unwrap();

        assert!(matches!(event, SessionEvent::CanvasMerged { outcome: MergeOutcome::Merged { .. }, .. }));
        let objects = session.store().objects_in_canvas(&canvas("A")).unwrap();
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn test_remote_editing_and_leave() {
        let mut session = loaded_session();
        session
            .handle_message(r#"{"type":"active_users","whiteboardId":"wb","clients":["me","bob"]}"#)
            .unwrap();
        session
            .handle_message(r#"{"type":"editing_canvas","canvasId":"A","clientId":"bob"}"#)
            .unwrap();
        assert_eq!(session.store().current_editor(&canvas("A")), Some(&ClientId::from("bob")));

        session
            .handle_message(r#"{"type":"user_left","whiteboardId":"wb","clientId":"bob"}"#)
            .unwrap();
        assert_eq!(session.store().current_editor(&canvas("A")), None);
    }

    #[test]
    fn test_remote_object_updates() {
        let mut session = loaded_session();
        let event = session
            .handle_message(
                r#"{"type":"update_canvas_objects","canvasId":"A",
                    "objects":[{"type":"rect","id":"o3","x":1,"y":1,"width":2,"height":2}]}"#,
            )
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::ObjectsChanged {
                canvas: canvas("A"),
                objects: vec![ObjectId::from("o3")],
            }
        );

        session.store_mut().set_selected(&[ObjectId::from("o3")]);
        session
            .handle_message(r#"{"type":"delete_canvas_objects","objectIds":["o3"]}"#)
            .unwrap();
        assert!(session.store().object(&ObjectId::from("o3")).is_none());
        assert!(!session.store().is_selected(&ObjectId::from("o3")));
    }

    #[test]
    fn test_malformed_message_leaves_store_untouched() {
        let mut session = loaded_session();
        assert!(session.handle_message(r#"{"type":"merge_canvas"}"#).is_err());
        assert!(session.store().canvas(&canvas("B")).is_some());
    }

    #[test]
    fn test_server_error_event() {
        let mut session = loaded_session();
        let event = session
            .handle_message(r#"{"type":"error","message":"forbidden"}"#)
            .unwrap();
        assert_eq!(event, SessionEvent::Error { message: "forbidden".to_string() });
    }

    #[test]
    fn test_local_actions_queue_messages() {
        let mut session = loaded_session();
        let rect: CanvasObject = RectObject::new(Point::new(0.0, 0.0), 10.0, 10.0).into();
        let rect_id = rect.id().clone();

        session.local_create_objects(&canvas("A"), vec![rect]);
        session.local_claim_canvas(&canvas("A"));
        session.local_delete_objects(&[rect_id.clone(), ObjectId::from("missing")]);
        assert!(session.local_release_canvas(&canvas("A")));

        let outgoing = session.take_outgoing();
        assert_eq!(outgoing.len(), 4);
        assert!(outgoing[0].contains(r#""type":"create_canvas_objects""#));
        assert_eq!(outgoing[1], r#"{"type":"editing_canvas","canvasId":"A"}"#);
        assert_eq!(
            outgoing[2],
            format!(r#"{{"type":"delete_canvas_objects","objectIds":["{}"]}}"#, rect_id)
        );
        assert_eq!(outgoing[3], r#"{"type":"done_editing_canvas","canvasId":"A"}"#);
        assert!(!session.has_outgoing());
    }

    #[test]
    fn test_release_requires_own_claim() {
        let mut session = loaded_session();
        session
            .handle_message(r#"{"type":"editing_canvas","canvasId":"A","clientId":"bob"}"#)
            .unwrap();

        assert!(!session.local_release_canvas(&canvas("A")));
        assert_eq!(session.store().current_editor(&canvas("A")), Some(&ClientId::from("bob")));
        assert_eq!(session.local_claim_canvas(&canvas("A")), Some(ClientId::from("bob")));
    }

    #[test]
    fn test_local_merge_and_create_canvas() {
        let mut session = loaded_session();
        assert_eq!(session.local_merge_canvas(&canvas("A")), MergeOutcome::NoParent);
        assert!(!session.has_outgoing());

        session.local_merge_canvas(&canvas("B"));
        let child = Canvas::new("sketch", 20.0, 20.0).with_parent(canvas("A"), 0.0, 0.0);
        let child_id = session.local_create_canvas(CanvasData::new(child)).unwrap();

        assert_eq!(session.store().parent_of(&child_id), Some(&canvas("A")));
        let outgoing = session.take_outgoing();
        assert_eq!(outgoing[0], r#"{"type":"merge_canvas","canvasId":"B"}"#);
        assert!(outgoing[1].contains(r#""type":"create_canvas""#));
    }

    #[test]
    fn test_create_canvas_requires_whiteboard() {
        let mut session = Session::new(ClientId::from("me"), WhiteboardStore::new());
        let canvas = CanvasData::new(Canvas::new("orphan", 1.0, 1.0));
        assert_eq!(session.local_create_canvas(canvas), None);
    }
}
