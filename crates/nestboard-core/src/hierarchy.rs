//! Canvas-hierarchy index: parent and child links between canvases.

use crate::ids::CanvasId;
use std::collections::{BTreeSet, HashMap};

/// Bidirectional parent/child map. The links always form a forest.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    children_by_canvas: HashMap<CanvasId, BTreeSet<CanvasId>>,
    parent_by_canvas: HashMap<CanvasId, CanvasId>,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ids` the complete child set of `parent`.
    ///
    /// Former children become roots. Each new child is detached from its old
    /// parent first. Children that would close a cycle are refused.
    /// Returns how many children were attached.
    pub fn set_children_by_canvas(&mut self, parent: &CanvasId, ids: &[CanvasId]) -> usize {
        if let Some(old_children) = self.children_by_canvas.remove(parent) {
            for child in &old_children {
                if self.parent_by_canvas.get(child) == Some(parent) {
                    self.parent_by_canvas.remove(child);
                }
            }
        }
        self.children_by_canvas.entry(parent.clone()).or_default();
        self.attach_all(parent, ids)
    }

    /// Attach `ids` beneath `parent`, detaching each from any previous parent.
    /// Returns how many children were attached.
    pub fn add_children_by_canvas(&mut self, parent: &CanvasId, ids: &[CanvasId]) -> usize {
        self.children_by_canvas.entry(parent.clone()).or_default();
        self.attach_all(parent, ids)
    }

    /// Remove canvases from the tree in both directions.
    ///
    /// Each canvas is detached from its parent and loses its child set. Its
    /// children are not removed; they become roots.
    pub fn remove_canvases(&mut self, ids: &[CanvasId]) {
        self.remove_child_canvases(ids);
        for id in ids {
            if let Some(children) = self.children_by_canvas.remove(id) {
                for child in &children {
                    if self.parent_by_canvas.get(child) == Some(id) {
                        self.parent_by_canvas.remove(child);
                    }
                }
            }
        }
    }

    /// Detach canvases from their parents, keeping their own children.
    pub fn remove_child_canvases(&mut self, ids: &[CanvasId]) {
        for id in ids {
            if let Some(parent) = self.parent_by_canvas.remove(id) {
                if let Some(siblings) = self.children_by_canvas.get_mut(&parent) {
                    siblings.remove(id);
                }
            }
        }
    }

    pub fn parent_of(&self, canvas: &CanvasId) -> Option<&CanvasId> {
        self.parent_by_canvas.get(canvas)
    }

    pub fn children_of(&self, canvas: &CanvasId) -> Option<&BTreeSet<CanvasId>> {
        self.children_by_canvas.get(canvas)
    }

    pub fn has_children(&self, canvas: &CanvasId) -> bool {
        self.children_by_canvas
            .get(canvas)
            .is_some_and(|children| !children.is_empty())
    }

    /// All canvases below `canvas`, depth first, each parent before its children.
    pub fn descendants_of(&self, canvas: &CanvasId) -> Vec<CanvasId> {
        let mut out = Vec::new();
        let mut stack: Vec<&CanvasId> = self
            .children_of(canvas)
            .map(|c| c.iter().rev().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next.clone());
            if let Some(children) = self.children_of(next) {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Canvases above `canvas`, nearest first.
    pub fn ancestors_of(&self, canvas: &CanvasId) -> Vec<CanvasId> {
        let mut out = Vec::new();
        let mut current = canvas;
        while let Some(parent) = self.parent_by_canvas.get(current) {
            if out.len() > self.parent_by_canvas.len() {
                log::error!("hierarchy: parent cycle above {}", canvas);
                break;
            }
            out.push(parent.clone());
            current = parent;
        }
        out
    }

    /// Whether both directions agree and no canvas is its own ancestor.
    pub fn is_consistent(&self) -> bool {
        let forward = self.parent_by_canvas.iter().all(|(child, parent)| {
            self.children_by_canvas
                .get(parent)
                .is_some_and(|children| children.contains(child))
        });
        let backward = self.children_by_canvas.iter().all(|(parent, children)| {
            children
                .iter()
                .all(|child| self.parent_by_canvas.get(child) == Some(parent))
        });
        let acyclic = self
            .parent_by_canvas
            .keys()
            .all(|canvas| !self.ancestors_of(canvas).contains(canvas));
        forward && backward && acyclic
    }

    fn attach_all(&mut self, parent: &CanvasId, ids: &[CanvasId]) -> usize {
        let mut attached = 0;
        for child in ids {
            if child == parent || self.ancestors_of(parent).contains(child) {
                log::warn!(
                    "hierarchy: refusing to place canvas {} beneath its own descendant {}",
                    child,
                    parent
                );
                continue;
            }
            if let Some(previous) = self.parent_by_canvas.insert(child.clone(), parent.clone()) {
                if &previous != parent {
                    if let Some(siblings) = self.children_by_canvas.get_mut(&previous) {
                        siblings.remove(child);
                    }
                }
            }
            if let Some(children) = self.children_by_canvas.get_mut(parent) {
                children.insert(child.clone());
            }
            attached += 1;
        }
        attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str) -> CanvasId {
        CanvasId::from(name)
    }

    #[test]
    fn test_add_children() {
        let mut index = HierarchyIndex::new();
        assert_eq!(index.add_children_by_canvas(&c("root"), &[c("a"), c("b")]), 2);

        assert_eq!(index.parent_of(&c("a")), Some(&c("root")));
        assert_eq!(index.children_of(&c("root")).unwrap().len(), 2);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_reattach_moves_child() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("p1"), &[c("x")]);
        index.add_children_by_canvas(&c("p2"), &[c("x")]);

        assert_eq!(index.parent_of(&c("x")), Some(&c("p2")));
        assert!(!index.children_of(&c("p1")).unwrap().contains(&c("x")));
        assert!(index.is_consistent());
    }

    #[test]
    fn test_set_children_replaces() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("p"), &[c("a"), c("b")]);
        index.set_children_by_canvas(&c("p"), &[c("b"), c("c")]);

        assert_eq!(index.parent_of(&c("a")), None);
        assert_eq!(index.parent_of(&c("c")), Some(&c("p")));
        assert_eq!(
            index.children_of(&c("p")).unwrap().iter().cloned().collect::<Vec<_>>(),
            vec![c("b"), c("c")]
        );
        assert!(index.is_consistent());
    }

    #[test]
    fn test_set_children_steals_from_other_parent() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("p1"), &[c("x")]);
        index.set_children_by_canvas(&c("p2"), &[c("x")]);

        assert!(index.children_of(&c("p1")).unwrap().is_empty());
        assert!(index.is_consistent());
    }

    #[test]
    fn test_remove_canvases_orphans_children() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("root"), &[c("mid")]);
        index.add_children_by_canvas(&c("mid"), &[c("leaf")]);

        index.remove_canvases(&[c("mid")]);

        assert!(index.children_of(&c("root")).unwrap().is_empty());
        assert_eq!(index.children_of(&c("mid")), None);
        assert_eq!(index.parent_of(&c("leaf")), None);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_remove_child_canvases_keeps_subtree() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("root"), &[c("mid")]);
        index.add_children_by_canvas(&c("mid"), &[c("leaf")]);

        index.remove_child_canvases(&[c("mid")]);

        assert_eq!(index.parent_of(&c("mid")), None);
        assert_eq!(index.parent_of(&c("leaf")), Some(&c("mid")));
        assert!(index.is_consistent());
    }

    #[test]
    fn test_cycle_is_refused() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("a"), &[c("b")]);
        index.add_children_by_canvas(&c("b"), &[c("c")]);

        assert_eq!(index.add_children_by_canvas(&c("c"), &[c("a")]), 0);
        assert_eq!(index.add_children_by_canvas(&c("a"), &[c("a")]), 0);
        assert_eq!(index.parent_of(&c("a")), None);
        assert!(index.is_consistent());
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let mut index = HierarchyIndex::new();
        index.add_children_by_canvas(&c("root"), &[c("a"), c("b")]);
        index.add_children_by_canvas(&c("a"), &[c("a1")]);

        assert_eq!(index.descendants_of(&c("root")), vec![c("a"), c("a1"), c("b")]);
        assert_eq!(index.ancestors_of(&c("a1")), vec![c("a"), c("root")]);
        assert!(index.descendants_of(&c("b")).is_empty());
    }
}
