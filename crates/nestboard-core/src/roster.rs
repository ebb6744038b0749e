//! Whiteboard-level bookkeeping: which canvases belong to which whiteboard,
//! and which clients are connected to it.

use crate::ids::{CanvasId, ClientId, WhiteboardId};
use std::collections::{BTreeSet, HashMap};

/// Ordered list of canvases per whiteboard, with a reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct WhiteboardCanvases {
    canvases_by_whiteboard: HashMap<WhiteboardId, Vec<CanvasId>>,
    whiteboard_by_canvas: HashMap<CanvasId, WhiteboardId>,
}

impl WhiteboardCanvases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append canvases to a whiteboard's list. Canvases already listed under
    /// another whiteboard move; canvases already listed here keep their place.
    pub fn add(&mut self, whiteboard: &WhiteboardId, canvases: &[CanvasId]) {
        for canvas in canvases {
            match self.whiteboard_by_canvas.get(canvas).cloned() {
                Some(owner) if &owner == whiteboard => continue,
                Some(_) => self.remove(std::slice::from_ref(canvas)),
                None => {}
            }
            self.canvases_by_whiteboard
                .entry(whiteboard.clone())
                .or_default()
                .push(canvas.clone());
            self.whiteboard_by_canvas
                .insert(canvas.clone(), whiteboard.clone());
        }
    }

    /// Remove canvases from whichever whiteboard lists them.
    pub fn remove(&mut self, canvases: &[CanvasId]) {
        for canvas in canvases {
            if let Some(whiteboard) = self.whiteboard_by_canvas.remove(canvas) {
                if let Some(list) = self.canvases_by_whiteboard.get_mut(&whiteboard) {
                    list.retain(|c| c != canvas);
                }
            }
        }
    }

    pub fn canvases_of(&self, whiteboard: &WhiteboardId) -> Option<&[CanvasId]> {
        self.canvases_by_whiteboard.get(whiteboard).map(Vec::as_slice)
    }

    pub fn whiteboard_of(&self, canvas: &CanvasId) -> Option<&WhiteboardId> {
        self.whiteboard_by_canvas.get(canvas)
    }
}

/// Connected clients per whiteboard.
#[derive(Debug, Clone, Default)]
pub struct ActiveUsers {
    by_whiteboard: HashMap<WhiteboardId, BTreeSet<ClientId>>,
}

impl ActiveUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) {
        self.by_whiteboard
            .insert(whiteboard.clone(), clients.iter().cloned().collect());
    }

    pub fn add(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) {
        self.by_whiteboard
            .entry(whiteboard.clone())
            .or_default()
            .extend(clients.iter().cloned());
    }

    /// Returns the clients that were actually present.
    pub fn remove(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) -> Vec<ClientId> {
        let Some(active) = self.by_whiteboard.get_mut(whiteboard) else {
            return Vec::new();
        };
        clients
            .iter()
            .filter(|client| active.remove(*client))
            .cloned()
            .collect()
    }

    pub fn of(&self, whiteboard: &WhiteboardId) -> Option<&BTreeSet<ClientId>> {
        self.by_whiteboard.get(whiteboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_order_and_skips_duplicates() {
        let mut index = WhiteboardCanvases::new();
        let wb = WhiteboardId::from("wb");
        index.add(&wb, &[CanvasId::from("b"), CanvasId::from("a")]);
        index.add(&wb, &[CanvasId::from("b")]);

        assert_eq!(
            index.canvases_of(&wb).unwrap(),
            &[CanvasId::from("b"), CanvasId::from("a")]
        );
    }

    #[test]
    fn test_canvas_moves_between_whiteboards() {
        let mut index = WhiteboardCanvases::new();
        let one = WhiteboardId::from("one");
        let two = WhiteboardId::from("two");
        index.add(&one, &[CanvasId::from("c")]);
        index.add(&two, &[CanvasId::from("c")]);

        assert!(index.canvases_of(&one).unwrap().is_empty());
        assert_eq!(index.whiteboard_of(&CanvasId::from("c")), Some(&two));
    }

    #[test]
    fn test_remove() {
        let mut index = WhiteboardCanvases::new();
        let wb = WhiteboardId::from("wb");
        index.add(&wb, &[CanvasId::from("a"), CanvasId::from("b")]);
        index.remove(&[CanvasId::from("a"), CanvasId::from("missing")]);

        assert_eq!(index.canvases_of(&wb).unwrap(), &[CanvasId::from("b")]);
        assert_eq!(index.whiteboard_of(&CanvasId::from("a")), None);
    }

    #[test]
    fn test_active_users() {
        let mut users = ActiveUsers::new();
        let wb = WhiteboardId::from("wb");
        users.set(&wb, &[ClientId::from("alice")]);
        users.add(&wb, &[ClientId::from("bob")]);

        let gone = users.remove(&wb, &[ClientId::from("alice"), ClientId::from("carol")]);
        assert_eq!(gone, vec![ClientId::from("alice")]);
        assert_eq!(users.of(&wb).unwrap().len(), 1);
        assert!(users.remove(&WhiteboardId::from("other"), &[ClientId::from("bob")]).is_empty());
    }
}
