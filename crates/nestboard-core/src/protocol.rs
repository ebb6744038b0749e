//! Wire messages exchanged with the whiteboard server.
//!
//! Messages are JSON objects tagged by `"type"` with snake_case kinds and
//! camelCase fields.

use crate::canvas::CanvasData;
use crate::error::ProtocolError;
use crate::ids::{CanvasId, ClientId, ObjectId, WhiteboardId};
use crate::objects::CanvasObject;
use crate::whiteboard::WhiteboardData;
use serde::{Deserialize, Serialize};

/// Messages sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    CreateCanvasObjects {
        canvas_id: CanvasId,
        objects: Vec<CanvasObject>,
    },
    UpdateCanvasObjects {
        canvas_id: CanvasId,
        objects: Vec<CanvasObject>,
    },
    DeleteCanvasObjects { object_ids: Vec<ObjectId> },
    CreateCanvas {
        whiteboard_id: WhiteboardId,
        canvas: CanvasData,
    },
    /// Fold a canvas into its parent
    MergeCanvas { canvas_id: CanvasId },
    DeleteCanvas { canvas_id: CanvasId },
    /// Claim edit focus on a canvas
    EditingCanvas { canvas_id: CanvasId },
    /// Release edit focus
    DoneEditingCanvas { canvas_id: CanvasId },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// Messages received from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full whiteboard state, sent once after connecting
    InitWhiteboard { whiteboard: WhiteboardData },
    CreateCanvas {
        whiteboard_id: WhiteboardId,
        canvas: CanvasData,
    },
    DeleteCanvas { canvas_id: CanvasId },
    MergeCanvas { canvas_id: CanvasId },
    CreateCanvasObjects {
        canvas_id: CanvasId,
        objects: Vec<CanvasObject>,
    },
    UpdateCanvasObjects {
        canvas_id: CanvasId,
        objects: Vec<CanvasObject>,
    },
    DeleteCanvasObjects { object_ids: Vec<ObjectId> },
    /// A client took edit focus on a canvas
    EditingCanvas {
        canvas_id: CanvasId,
        client_id: ClientId,
    },
    DoneEditingCanvas { canvas_id: CanvasId },
    /// Everyone currently connected to a whiteboard
    ActiveUsers {
        whiteboard_id: WhiteboardId,
        clients: Vec<ClientId>,
    },
    UserJoined {
        whiteboard_id: WhiteboardId,
        client_id: ClientId,
    },
    UserLeft {
        whiteboard_id: WhiteboardId,
        client_id: ClientId,
    },
    Error { message: String },
}

impl ServerMessage {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(ProtocolError::Decode)
    }
}
