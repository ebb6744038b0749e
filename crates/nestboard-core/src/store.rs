//! The whiteboard store and its mutation protocol.
//!
//! Every index lives in [`WhiteboardStore`]. Callers change state only
//! through its methods, each of which updates all affected indices before
//! returning. Queries borrow the store immutably and never mutate.

use crate::canvas::{AccessList, Canvas, CanvasData, ParentCanvas};
use crate::config::StoreConfig;
use crate::editors::EditorRegistry;
use crate::error::{StoreError, StoreResult};
use crate::hierarchy::HierarchyIndex;
use crate::ids::{CanvasId, ClientId, ObjectId, UserId, WhiteboardId};
use crate::membership::MembershipIndex;
use crate::objects::{CanvasObject, ObjectKind};
use crate::roster::{ActiveUsers, WhiteboardCanvases};
use crate::selection::SelectionSet;
use crate::table::ObjectTable;
use crate::whiteboard::{Whiteboard, WhiteboardData};
use kurbo::{Point, Vec2};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::slice;

/// Objects of one canvas, keyed by id.
pub type CanvasObjects<'a> = BTreeMap<&'a ObjectId, &'a CanvasObject>;

/// Result of [`WhiteboardStore::merge_canvas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The canvas has no parent; nothing changed.
    NoParent,
    Merged {
        into: CanvasId,
        /// Objects that moved to `into`.
        objects: Vec<ObjectId>,
        /// Child canvases that now hang from `into`.
        reparented: Vec<CanvasId>,
    },
}

/// What [`WhiteboardStore::delete_canvas_tree`] does with a canvas's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Delete the canvas, every descendant canvas, and all of their objects.
    Cascade,
    /// Hand objects and child canvases to the parent, then delete the canvas.
    /// A root canvas has no parent and is cascaded instead.
    ReparentToGrandparent,
    /// Delete only an empty canvas: no objects, no child canvases.
    RejectIfNonEmpty,
}

/// What a tree delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Canvases removed, the target first.
    pub canvases: Vec<CanvasId>,
    /// Objects removed from the object table.
    pub objects: Vec<ObjectId>,
    /// Canvas that received the contents, for a reparenting delete.
    pub moved_to: Option<CanvasId>,
}

/// Normalized, multi-index client state for whiteboards, canvases, objects,
/// selection and editors.
#[derive(Debug, Clone, Default)]
pub struct WhiteboardStore {
    config: StoreConfig,
    whiteboards: HashMap<WhiteboardId, Whiteboard>,
    canvases: HashMap<CanvasId, Canvas>,
    access: HashMap<CanvasId, AccessList>,
    objects: ObjectTable,
    membership: MembershipIndex,
    hierarchy: HierarchyIndex,
    whiteboard_canvases: WhiteboardCanvases,
    selection: SelectionSet,
    editors: EditorRegistry,
    active_users: ActiveUsers,
}

impl WhiteboardStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Whiteboards and canvases ---

    /// Record a whiteboard and load every canvas it carries.
    pub fn add_whiteboard(&mut self, data: WhiteboardData) {
        let (whiteboard, canvases) = data.canvases_parents_first();
        let id = whiteboard.id.clone();
        log::debug!("store: whiteboard {} with {} canvases", id, canvases.len());
        self.whiteboards.insert(id.clone(), whiteboard);
        for canvas in canvases {
            self.add_canvas(&id, canvas);
        }
    }

    /// Load a canvas payload into every index and list it under `whiteboard`.
    ///
    /// Loading a canvas that is already present replaces its record, access
    /// list and membership. Objects it owned that the new payload leaves out
    /// are removed from the table. A parent link the hierarchy refuses keeps
    /// the previous link on the record.
    pub fn add_canvas(&mut self, whiteboard: &WhiteboardId, data: CanvasData) {
        let mut normalized = data.normalize();
        let canvas_id = normalized.canvas.id.clone();
        let object_ids = normalized.object_ids();

        let declared_parent = normalized
            .canvas
            .parent_canvas
            .as_ref()
            .map(|p| p.canvas_id.clone());
        match declared_parent {
            Some(parent) => {
                let attached = self
                    .hierarchy
                    .add_children_by_canvas(&parent, slice::from_ref(&canvas_id));
                if attached == 0 {
                    normalized.canvas.parent_canvas = self
                        .canvases
                        .get(&canvas_id)
                        .and_then(|c| c.parent_canvas.clone());
                }
            }
            None => self.hierarchy.remove_child_canvases(slice::from_ref(&canvas_id)),
        }

        self.canvases.insert(canvas_id.clone(), normalized.canvas);
        self.objects.set_many(normalized.objects);
        let orphaned = self.membership.set_objects_by_canvas(
            &canvas_id,
            &object_ids,
            self.config.membership_mode,
        );
        if !orphaned.is_empty() {
            self.objects.remove_many(&orphaned);
            if self.config.prune_selection_on_remove {
                self.selection.remove(&orphaned);
            }
            log::debug!(
                "store: canvas {} reload dropped {} objects",
                canvas_id,
                orphaned.len()
            );
        }
        self.access.insert(canvas_id.clone(), normalized.access);
        self.whiteboard_canvases
            .add(whiteboard, slice::from_ref(&canvas_id));

        log::debug!(
            "store: canvas {} added to whiteboard {} with {} objects",
            canvas_id,
            whiteboard,
            object_ids.len()
        );
    }

    /// Remove a canvas from the canvas table, its whiteboard, the hierarchy,
    /// the access table and the editor registry.
    ///
    /// This does not cascade: the canvas's objects and membership entry stay,
    /// and its child canvases become roots. Use [`Self::delete_canvas_tree`]
    /// for a cascading delete. Returns false if the canvas was unknown.
    pub fn delete_canvas(&mut self, canvas: &CanvasId) -> bool {
        let known = self.canvases.remove(canvas).is_some()
            | self.whiteboard_canvases.whiteboard_of(canvas).is_some();
        self.whiteboard_canvases.remove(slice::from_ref(canvas));
        self.hierarchy.remove_canvases(slice::from_ref(canvas));
        self.access.remove(canvas);
        self.editors.unset_editor(canvas);
        if known {
            log::debug!("store: canvas {} deleted", canvas);
        }
        known
    }

    /// Delete a canvas together with what it contains, according to `policy`.
    ///
    /// An unknown canvas yields an empty report.
    pub fn delete_canvas_tree(
        &mut self,
        canvas: &CanvasId,
        policy: DeletePolicy,
    ) -> StoreResult<DeleteReport> {
        if !self.knows_canvas(canvas) {
            log::debug!("store: delete of unknown canvas {}", canvas);
            return Ok(DeleteReport::default());
        }

        match policy {
            DeletePolicy::RejectIfNonEmpty => {
                let objects = self.membership.objects_in(canvas).map_or(0, BTreeSet::len);
                let children = self.hierarchy.children_of(canvas).map_or(0, BTreeSet::len);
                if objects > 0 || children > 0 {
                    return Err(StoreError::CanvasNotEmpty {
                        canvas: canvas.clone(),
                        objects,
                        children,
                    });
                }
                Ok(self.cascade(canvas))
            }
            DeletePolicy::ReparentToGrandparent => match self.merge_canvas(canvas) {
                MergeOutcome::Merged { into, .. } => Ok(DeleteReport {
                    canvases: vec![canvas.clone()],
                    objects: Vec::new(),
                    moved_to: Some(into),
                }),
                MergeOutcome::NoParent => Ok(self.cascade(canvas)),
            },
            DeletePolicy::Cascade => Ok(self.cascade(canvas)),
        }
    }

    /// Fold a canvas into its parent.
    ///
    /// Its objects join the parent's membership and its child canvases are
    /// attached to the parent. With `translate_on_merge`, both are shifted by
    /// the canvas's origin so nothing moves on screen. The canvas is then
    /// removed from every index. A canvas without a parent is left alone.
    pub fn merge_canvas(&mut self, canvas: &CanvasId) -> MergeOutcome {
        let Some(parent) = self.hierarchy.parent_of(canvas).cloned() else {
            log::debug!("store: canvas {} has no parent to merge into", canvas);
            return MergeOutcome::NoParent;
        };

        let origin = self
            .canvases
            .get(canvas)
            .and_then(|c| c.parent_canvas.as_ref())
            .filter(|link| link.canvas_id == parent)
            .map_or(Vec2::ZERO, ParentCanvas::origin);
        let shift = if self.config.translate_on_merge {
            origin
        } else {
            Vec2::ZERO
        };

        let objects = self.membership.owned_by(canvas);
        if !self.membership.contains_canvas(&parent) {
            self.membership
                .set_objects_by_canvas(&parent, &[], self.config.membership_mode);
        }
        self.membership.add_objects_by_canvas(&parent, &objects);
        self.membership.remove_canvas(canvas);
        if shift != Vec2::ZERO {
            for id in &objects {
                if let Some(object) = self.objects.get_mut(id) {
                    object.translate(shift);
                }
            }
        }

        let reparented: Vec<CanvasId> = self
            .hierarchy
            .children_of(canvas)
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default();
        self.hierarchy.add_children_by_canvas(&parent, &reparented);
        for child in &reparented {
            if let Some(record) = self.canvases.get_mut(child) {
                let (x, y) = record
                    .parent_canvas
                    .as_ref()
                    .map_or((0.0, 0.0), |p| (p.origin_x, p.origin_y));
                record.parent_canvas =
                    Some(ParentCanvas::new(parent.clone(), x + shift.x, y + shift.y));
            }
        }

        self.hierarchy.remove_canvases(slice::from_ref(canvas));
        self.canvases.remove(canvas);
        self.whiteboard_canvases.remove(slice::from_ref(canvas));
        self.access.remove(canvas);
        self.editors.unset_editor(canvas);

        log::debug!(
            "store: merged canvas {} into {} ({} objects, {} child canvases)",
            canvas,
            parent,
            objects.len(),
            reparented.len()
        );
        MergeOutcome::Merged {
            into: parent,
            objects,
            reparented,
        }
    }

    // --- Objects ---

    /// Insert or update objects drawn on `canvas`.
    ///
    /// If the canvas is unknown, updates to objects already in the table are
    /// applied but new objects are dropped, since they would belong to no
    /// canvas. Returns the ids that were written.
    pub fn set_canvas_objects(
        &mut self,
        canvas: &CanvasId,
        records: impl IntoIterator<Item = CanvasObject>,
    ) -> Vec<ObjectId> {
        if self.membership.contains_canvas(canvas) {
            let records: Vec<CanvasObject> = records.into_iter().collect();
            let ids: Vec<ObjectId> = records.iter().map(|r| r.id().clone()).collect();
            self.objects.set_many(records);
            self.membership.add_objects_by_canvas(canvas, &ids);
            return ids;
        }

        let (known, unknown): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| self.objects.contains(r.id()));
        if !unknown.is_empty() {
            log::warn!(
                "store: dropping {} new objects for unknown canvas {}",
                unknown.len(),
                canvas
            );
        }
        let ids: Vec<ObjectId> = known.iter().map(|r| r.id().clone()).collect();
        self.objects.set_many(known);
        ids
    }

    /// Remove objects from the table and their canvases, and from the
    /// selection when `prune_selection_on_remove` is set.
    ///
    /// Unknown ids are ignored. Returns the removed records.
    pub fn remove_canvas_objects(&mut self, ids: &[ObjectId]) -> Vec<CanvasObject> {
        let removed = self.objects.remove_many(ids);
        self.membership.remove_by_object_ids(ids);
        if self.config.prune_selection_on_remove {
            self.selection.remove(ids);
        }
        log::debug!("store: removed {} of {} objects", removed.len(), ids.len());
        removed
    }

    /// Move objects by `offset`. Returns the ids that exist and were moved.
    pub fn translate_objects(&mut self, ids: &[ObjectId], offset: Vec2) -> Vec<ObjectId> {
        ids.iter()
            .filter(|id| match self.objects.get_mut(id) {
                Some(object) => {
                    object.translate(offset);
                    true
                }
                None => false,
            })
            .cloned()
            .collect()
    }

    /// Drag one anchor of an object. Returns false for an unknown object or anchor.
    pub fn move_object_anchor(&mut self, id: &ObjectId, index: usize, point: Point) -> bool {
        self.objects
            .get_mut(id)
            .is_some_and(|object| object.set_anchor(index, point))
    }

    // --- Editors ---

    /// Claim edit focus on a canvas. The last claim wins; the displaced
    /// editor is returned.
    pub fn set_current_editor(&mut self, canvas: &CanvasId, client: &ClientId) -> Option<ClientId> {
        self.editors.set_editor(canvas, client)
    }

    pub fn unset_current_editor(&mut self, canvas: &CanvasId) -> Option<ClientId> {
        self.editors.unset_editor(canvas)
    }

    // --- Selection ---

    pub fn set_selected(&mut self, ids: &[ObjectId]) {
        self.selection.set(ids);
    }

    pub fn add_selected(&mut self, ids: &[ObjectId]) {
        self.selection.add(ids);
    }

    pub fn remove_selected(&mut self, ids: &[ObjectId]) {
        self.selection.remove(ids);
    }

    pub fn clear_selected(&mut self) {
        self.selection.clear();
    }

    // --- Active users ---

    pub fn set_active_users(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) {
        self.active_users.set(whiteboard, clients);
    }

    pub fn add_active_users(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) {
        self.active_users.add(whiteboard, clients);
    }

    /// Mark clients as gone and release the canvases they were editing.
    pub fn remove_active_users(&mut self, whiteboard: &WhiteboardId, clients: &[ClientId]) {
        for client in self.active_users.remove(whiteboard, clients) {
            let released = self.editors.release_client(&client);
            if !released.is_empty() {
                log::debug!("store: {} left, releasing {} canvases", client, released.len());
            }
        }
    }

    // --- Queries ---

    pub fn whiteboard(&self, id: &WhiteboardId) -> Option<&Whiteboard> {
        self.whiteboards.get(id)
    }

    pub fn canvas(&self, id: &CanvasId) -> Option<&Canvas> {
        self.canvases.get(id)
    }

    /// Canvases listed under a whiteboard, in the order they were added.
    pub fn canvases_in_whiteboard(&self, whiteboard: &WhiteboardId) -> &[CanvasId] {
        self.whiteboard_canvases
            .canvases_of(whiteboard)
            .unwrap_or_default()
    }

    pub fn object(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.get(id)
    }

    pub fn object_kind(&self, id: &ObjectId) -> Option<ObjectKind> {
        self.objects.get(id).map(CanvasObject::kind)
    }

    pub fn canvas_of_object(&self, id: &ObjectId) -> Option<&CanvasId> {
        self.membership.canvas_of(id)
    }

    /// Objects on a canvas, or None if the canvas has no membership entry.
    /// Member ids without a record are skipped.
    pub fn objects_in_canvas(&self, canvas: &CanvasId) -> Option<CanvasObjects<'_>> {
        let members = self.membership.objects_in(canvas)?;
        Some(
            members
                .iter()
                .filter_map(|id| self.objects.get(id).map(|object| (id, object)))
                .collect(),
        )
    }

    /// Objects of every canvas listed under a whiteboard, by canvas.
    /// Canvases without a membership entry are left out.
    pub fn objects_by_whiteboard(
        &self,
        whiteboard: &WhiteboardId,
    ) -> BTreeMap<&CanvasId, CanvasObjects<'_>> {
        self.canvases_in_whiteboard(whiteboard)
            .iter()
            .filter_map(|canvas| self.objects_in_canvas(canvas).map(|objects| (canvas, objects)))
            .collect()
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.selection.iter()
    }

    pub fn parent_of(&self, canvas: &CanvasId) -> Option<&CanvasId> {
        self.hierarchy.parent_of(canvas)
    }

    pub fn children_of(&self, canvas: &CanvasId) -> Vec<&CanvasId> {
        self.hierarchy
            .children_of(canvas)
            .map(|children| children.iter().collect())
            .unwrap_or_default()
    }

    pub fn current_editor(&self, canvas: &CanvasId) -> Option<&ClientId> {
        self.editors.editor_of(canvas)
    }

    pub fn active_users(&self, whiteboard: &WhiteboardId) -> Vec<&ClientId> {
        self.active_users
            .of(whiteboard)
            .map(|clients| clients.iter().collect())
            .unwrap_or_default()
    }

    /// Whether `user` may work on `canvas`. Unknown canvases allow nobody.
    pub fn can_access(&self, canvas: &CanvasId, user: &UserId) -> bool {
        self.access.get(canvas).is_some_and(|access| access.allows(user))
    }

    /// Position of an object in the coordinates of its root canvas.
    pub fn object_world_position(&self, id: &ObjectId) -> Option<Point> {
        let object = self.objects.get(id)?;
        let mut position = object.position();
        let mut current = self.membership.canvas_of(id)?;
        while let Some(parent) = self.hierarchy.parent_of(current) {
            if let Some(link) = self.canvases.get(current).and_then(|c| c.parent_canvas.as_ref()) {
                if &link.canvas_id == parent {
                    position += link.origin();
                }
            }
            current = parent;
        }
        Some(position)
    }

    /// Read access to the individual indices.
    pub fn object_table(&self) -> &ObjectTable {
        &self.objects
    }

    pub fn membership(&self) -> &MembershipIndex {
        &self.membership
    }

    pub fn hierarchy(&self) -> &HierarchyIndex {
        &self.hierarchy
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn editors(&self) -> &EditorRegistry {
        &self.editors
    }

    /// Whether the membership and hierarchy indices agree with themselves and
    /// every object in the table belongs to a canvas.
    pub fn is_consistent(&self) -> bool {
        self.membership.is_consistent()
            && self.hierarchy.is_consistent()
            && self
                .objects
                .iter()
                .all(|(id, _)| self.membership.canvas_of(id).is_some())
    }

    fn knows_canvas(&self, canvas: &CanvasId) -> bool {
        self.canvases.contains_key(canvas)
            || self.membership.contains_canvas(canvas)
            || self.hierarchy.children_of(canvas).is_some()
            || self.hierarchy.parent_of(canvas).is_some()
    }

    /// Remove a canvas, all its descendants and all of their objects.
    fn cascade(&mut self, canvas: &CanvasId) -> DeleteReport {
        let mut doomed = vec![canvas.clone()];
        doomed.extend(self.hierarchy.descendants_of(canvas));

        let mut removed_objects = Vec::new();
        for id in &doomed {
            let owned = self.membership.remove_canvas(id);
            self.objects.remove_many(&owned);
            removed_objects.extend(owned);
            self.canvases.remove(id);
            self.access.remove(id);
            self.editors.unset_editor(id);
        }
        if self.config.prune_selection_on_remove {
            self.selection.remove(&removed_objects);
        }
        self.whiteboard_canvases.remove(&doomed);
        self.hierarchy.remove_canvases(&doomed);

        log::debug!(
            "store: cascade from {} removed {} canvases and {} objects",
            canvas,
            doomed.len(),
            removed_objects.len()
        );
        DeleteReport {
            canvases: doomed,
            objects: removed_objects,
            moved_to: None,
        }
    }
}
