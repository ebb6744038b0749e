//! The client's selection: which objects are selected, regardless of canvas.

use crate::ids::ObjectId;
use std::collections::BTreeSet;

/// Set of selected object ids.
///
/// Selection is scoped to the whole client, so selecting an object does not
/// need its canvas. Ids are not checked against the object table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<ObjectId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection.
    pub fn set(&mut self, ids: &[ObjectId]) {
        self.selected = ids.iter().cloned().collect();
    }

    /// Add to the selection.
    pub fn add(&mut self, ids: &[ObjectId]) {
        self.selected.extend(ids.iter().cloned());
    }

    /// Remove from the selection. Returns how many ids were selected before.
    pub fn remove(&mut self, ids: &[ObjectId]) -> usize {
        ids.iter().filter(|id| self.selected.remove(*id)).count()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.selected.iter()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
