//! Selection state and keyboard navigation.
//!
//! The selection is an ordered, duplicate-free list of node ids in the
//! order the user picked them (not tree order). Navigation walks the tree
//! as a flattened pre-order sequence without building it.

use comp_core::id::NodeId;
use comp_core::tree::Tree;
use smallvec::SmallVec;

/// Currently selected node(s), in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: SmallVec<[NodeId; 4]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from ids, dropping repeats (first occurrence wins).
    pub fn from_ids(ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut selection = Self::new();
        selection.set(ids);
        selection
    }

    pub fn current(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.ids.last().copied()
    }

    /// Replace the selection with `[id]`.
    pub fn select(&mut self, id: NodeId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Append `id` unless it is already selected. Returns whether it was added.
    pub fn extend(&mut self, id: NodeId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with `ids`, dropping repeats.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids.clear();
        for id in ids {
            self.extend(id);
        }
    }

    /// Pointer click: a plain click selects, an additive click (shift or
    /// ⌘ held) extends, a click on empty canvas clears.
    pub fn click(&mut self, hit: Option<NodeId>, additive: bool) {
        match hit {
            Some(id) if additive => {
                self.extend(id);
            }
            Some(id) => self.select(id),
            None => self.clear(),
        }
    }

    /// Drop ids that are no longer in `tree`.
    pub fn retain_live(&mut self, tree: &Tree) {
        self.ids.retain(|id| tree.contains(*id));
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// Move to the node before the first selected one in document order.
    /// Returns `false` (selection untouched) when there is nowhere to go.
    pub fn move_up(&mut self, tree: &Tree) -> bool {
        let Some(target) = self.first().and_then(|anchor| node_above(tree, anchor)) else {
            return false;
        };
        self.select(target);
        true
    }

    /// Move to the node after the last selected one in document order.
    /// Returns `false` (selection untouched) when there is nowhere to go.
    pub fn move_down(&mut self, tree: &Tree) -> bool {
        let Some(target) = self.last().and_then(|anchor| node_below(tree, anchor)) else {
            return false;
        };
        self.select(target);
        true
    }
}

/// The node immediately before `id` in document order: the previous
/// sibling's deepest last descendant, or the parent when `id` comes first.
/// `None` for the first top-level node and for ids not in the tree.
pub fn node_above(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let parent = tree.parent_of(id)?;
    let index = tree.index_in_parent(id)?;
    if index == 0 {
        return (!parent.is_root()).then_some(parent);
    }
    let siblings = tree.children_of(parent)?;
    let mut current = siblings[index - 1];
    while let Some(&last) = tree.children_of(current).and_then(|c| c.last()) {
        current = last;
    }
    Some(current)
}

/// The node immediately after `id` in document order: its first child,
/// else the next sibling of the nearest ancestor-or-self that has one.
/// `None` at the end of the document and for ids not in the tree.
pub fn node_below(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let node = tree.get_node(id)?;
    if let Some(&first) = node.child_ids().first() {
        return Some(first);
    }
    let mut current = id;
    loop {
        let parent = tree.parent_of(current)?;
        let siblings = tree.children_of(parent)?;
        let index = siblings.iter().position(|c| *c == current)?;
        if let Some(&next) = siblings.get(index + 1) {
            return Some(next);
        }
        if parent.is_root() {
            return None;
        }
        current = parent;
    }
}
