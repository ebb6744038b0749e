//! Active-editor registry: which client holds edit focus on which canvas.

use crate::ids::{CanvasId, ClientId};
use std::collections::HashMap;

/// At most one editor per canvas. A later claim replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct EditorRegistry {
    editors: HashMap<CanvasId, ClientId>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `client` as the editor of `canvas`, returning the displaced claim.
    pub fn set_editor(&mut self, canvas: &CanvasId, client: &ClientId) -> Option<ClientId> {
        let displaced = self.editors.insert(canvas.clone(), client.clone());
        if let Some(previous) = &displaced {
            if previous != client {
                log::debug!("editors: {} takes canvas {} from {}", client, canvas, previous);
            }
        }
        displaced
    }

    pub fn unset_editor(&mut self, canvas: &CanvasId) -> Option<ClientId> {
        self.editors.remove(canvas)
    }

    pub fn editor_of(&self, canvas: &CanvasId) -> Option<&ClientId> {
        self.editors.get(canvas)
    }

    /// Drop every claim held by `client`. Returns the canvases released.
    pub fn release_client(&mut self, client: &ClientId) -> Vec<CanvasId> {
        let mut released: Vec<CanvasId> = self
            .editors
            .iter()
            .filter(|(_, holder)| *holder == client)
            .map(|(canvas, _)| canvas.clone())
            .collect();
        released.sort();
        for canvas in &released {
            self.editors.remove(canvas);
        }
        released
    }
}
