//! The object table: the only owner of object content.

use crate::ids::ObjectId;
use crate::objects::CanvasObject;
use std::collections::HashMap;

/// Canonical map of object id to object record.
///
/// The table does no cascading. Removing an object here leaves membership
/// and selection untouched; the store keeps those in step.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: HashMap<ObjectId, CanvasObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut CanvasObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Insert or replace records by id. Entries not mentioned are kept.
    pub fn set_many(&mut self, records: impl IntoIterator<Item = CanvasObject>) {
        for record in records {
            self.objects.insert(record.id().clone(), record);
        }
    }

    /// Delete records, returning the ones that existed.
    pub fn remove_many<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a ObjectId>,
    ) -> Vec<CanvasObject> {
        ids.into_iter()
            .filter_map(|id| self.objects.remove(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &CanvasObject)> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
