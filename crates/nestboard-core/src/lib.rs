//! Nestboard Core Library
//!
//! Client-side state for a collaborative whiteboard of nested canvases: a
//! normalized object table with membership, hierarchy, selection and editor
//! indices, kept consistent by a single mutation protocol.

pub mod canvas;
pub mod config;
pub mod editors;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod membership;
pub mod objects;
pub mod protocol;
pub mod roster;
pub mod selection;
pub mod session;
pub mod store;
pub mod table;
pub mod whiteboard;

pub use canvas::{AccessList, Canvas, CanvasData, ParentCanvas};
pub use config::StoreConfig;
pub use error::{ConfigError, ProtocolError, StoreError, StoreResult};
pub use ids::{CanvasId, ClientId, ObjectId, UserId, WhiteboardId};
pub use membership::MembershipMode;
pub use objects::{CanvasObject, EllipseObject, ObjectGeometry, ObjectKind, ObjectStyle, RectObject, VectorObject};
pub use protocol::{ClientMessage, ServerMessage};
pub use session::{Session, SessionEvent};
pub use store::{DeletePolicy, DeleteReport, MergeOutcome, WhiteboardStore};
pub use whiteboard::{Permission, Whiteboard, WhiteboardData};
