//! Canvas-membership index: which canvas owns which objects.

use crate::ids::{CanvasId, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// How [`MembershipIndex::set_objects_by_canvas`] treats the previous members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMode {
    /// The canvas ends up owning exactly the listed objects. Dropped members
    /// lose their back-reference and listed objects leave their old canvas.
    #[default]
    Exact,
    /// Overwrite the canvas's set and rewrite back-references for the listed
    /// objects only. Earlier members and other canvases are not touched, so
    /// the two directions can disagree afterwards.
    Additive,
}

/// Bidirectional map between canvases and the objects they contain.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    objects_by_canvas: HashMap<CanvasId, BTreeSet<ObjectId>>,
    canvas_by_object: HashMap<ObjectId, CanvasId>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the membership set of `canvas`.
    ///
    /// Returns the objects that lost their owner: former members this canvas
    /// owned that are not in `ids`. Always empty in `Additive` mode.
    pub fn set_objects_by_canvas(
        &mut self,
        canvas: &CanvasId,
        ids: &[ObjectId],
        mode: MembershipMode,
    ) -> Vec<ObjectId> {
        let new_members: BTreeSet<ObjectId> = ids.iter().cloned().collect();
        let mut orphaned = Vec::new();

        if mode == MembershipMode::Exact {
            if let Some(old_members) = self.objects_by_canvas.remove(canvas) {
                for dropped in old_members.difference(&new_members) {
                    if self.canvas_by_object.get(dropped) == Some(canvas) {
                        self.canvas_by_object.remove(dropped);
                        orphaned.push(dropped.clone());
                    }
                }
            }
            for id in &new_members {
                self.detach_elsewhere(id, canvas);
            }
        }

        for id in &new_members {
            self.canvas_by_object.insert(id.clone(), canvas.clone());
        }
        self.objects_by_canvas.insert(canvas.clone(), new_members);
        orphaned
    }

    /// Add objects to a canvas that already has an entry.
    ///
    /// Returns false, changing nothing, if the canvas is unknown.
    pub fn add_objects_by_canvas(&mut self, canvas: &CanvasId, ids: &[ObjectId]) -> bool {
        if !self.objects_by_canvas.contains_key(canvas) {
            log::debug!("membership: ignoring add of {} objects to unknown canvas {}", ids.len(), canvas);
            return false;
        }
        for id in ids {
            self.detach_elsewhere(id, canvas);
            self.canvas_by_object.insert(id.clone(), canvas.clone());
        }
        if let Some(members) = self.objects_by_canvas.get_mut(canvas) {
            members.extend(ids.iter().cloned());
        }
        true
    }

    /// Remove objects from whichever canvas owns them. Unknown ids are skipped.
    ///
    /// Returns how many objects were removed.
    pub fn remove_by_object_ids(&mut self, ids: &[ObjectId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(canvas) = self.canvas_by_object.remove(id) {
                if let Some(members) = self.objects_by_canvas.get_mut(&canvas) {
                    members.remove(id);
                }
                removed += 1;
            }
        }
        removed
    }

    /// Drop a canvas's entry along with the back-references of its members.
    ///
    /// Returns the ids it owned. Members whose back-reference points at
    /// another canvas are dropped from the set but not returned.
    pub fn remove_canvas(&mut self, canvas: &CanvasId) -> Vec<ObjectId> {
        let owned = self.owned_by(canvas);
        self.objects_by_canvas.remove(canvas);
        for id in &owned {
            self.canvas_by_object.remove(id);
        }
        owned
    }

    /// Members of `canvas` whose back-reference points at it.
    pub fn owned_by(&self, canvas: &CanvasId) -> Vec<ObjectId> {
        self.objects_by_canvas
            .get(canvas)
            .map(|members| {
                members
                    .iter()
                    .filter(|id| self.canvas_by_object.get(*id) == Some(canvas))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Object ids owned by `canvas`, or None if the canvas has no entry.
    pub fn objects_in(&self, canvas: &CanvasId) -> Option<&BTreeSet<ObjectId>> {
        self.objects_by_canvas.get(canvas)
    }

    pub fn canvas_of(&self, object: &ObjectId) -> Option<&CanvasId> {
        self.canvas_by_object.get(object)
    }

    pub fn contains_canvas(&self, canvas: &CanvasId) -> bool {
        self.objects_by_canvas.contains_key(canvas)
    }

    /// Whether both directions agree: every back-reference is matched by a
    /// set entry and every set entry by a back-reference.
    pub fn is_consistent(&self) -> bool {
        let forward = self.canvas_by_object.iter().all(|(object, canvas)| {
            self.objects_by_canvas
                .get(canvas)
                .is_some_and(|members| members.contains(object))
        });
        let backward = self.objects_by_canvas.iter().all(|(canvas, members)| {
            members
                .iter()
                .all(|object| self.canvas_by_object.get(object) == Some(canvas))
        });
        forward && backward
    }

    fn detach_elsewhere(&mut self, id: &ObjectId, keep: &CanvasId) {
        if let Some(previous) = self.canvas_by_object.get(id) {
            if previous != keep {
                if let Some(members) = self.objects_by_canvas.get_mut(previous) {
                    members.remove(id);
                }
            }
        }
    }
}
