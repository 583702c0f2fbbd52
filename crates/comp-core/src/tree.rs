//! Tree Store: the id → node arena and its structural primitives.
//!
//! Every primitive validates first and mutates second, so a returned
//! error always means the tree is exactly as it was before the call.

use crate::error::TreeError;
use crate::id::NodeId;
use crate::model::{Children, ComponentNode, PropValue, RootNode};
use std::collections::HashMap;

/// The composition tree: root record plus a flat map of component nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    /// Absent until the first insertion.
    root: Option<RootNode>,
    nodes: HashMap<NodeId, ComponentNode>,
}

impl Tree {
    /// An empty tree with no root record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a tree from decoded parts without checking it.
    /// Callers run [`crate::check::check_tree`] on the result.
    pub(crate) fn from_parts(root: Option<RootNode>, nodes: HashMap<NodeId, ComponentNode>) -> Self {
        Self { root, nodes }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Number of component nodes (root excluded).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&RootNode> {
        self.root.as_ref()
    }

    /// Top-level ids in document order. Empty when root is absent.
    pub fn root_children(&self) -> &[NodeId] {
        self.root.as_ref().map_or(&[], |r| r.children.as_slice())
    }

    /// Whether `id` is a live component node. The root is not one.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(&id)
    }

    /// All component nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values()
    }

    /// Children of a node or of the root. `None` for leaves and missing ids.
    pub fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        if id.is_root() {
            return Some(self.root_children());
        }
        match &self.nodes.get(&id)?.children {
            Children::Leaf => None,
            Children::Container(ids) => Some(ids),
        }
    }

    /// Whether `id` currently has at least one child.
    pub fn has_children(&self, id: NodeId) -> bool {
        self.children_of(id).is_some_and(|ids| !ids.is_empty())
    }

    /// Whether `id` is the root or a container node.
    pub fn can_hold_children(&self, id: NodeId) -> bool {
        id.is_root() || self.nodes.get(&id).is_some_and(|n| n.is_container())
    }

    /// Parent of a component node. `None` for the root and missing ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).map(|n| n.parent)
    }

    /// Position of `id` within its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent)?.iter().position(|c| *c == id)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    /// A node is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = descendant;
        // Bounded walk: a well-formed chain is never longer than the tree.
        for _ in 0..=self.nodes.len() {
            match self.parent_of(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) if !parent.is_root() => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// All descendants of `id` in document pre-order, `id` excluded.
    ///
    /// Uses an explicit stack so arbitrarily deep trees cannot overflow.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .children_of(id)
            .map(|ids| ids.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(ids) = self.children_of(next) {
                stack.extend(ids.iter().rev().copied());
            }
        }
        out
    }

    /// A new id with the given prefix that is not live in this tree.
    pub fn fresh_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::with_prefix(prefix);
            if !self.contains(id) && !id.is_root() {
                return id;
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Insert the empty root record if it is absent.
    pub fn ensure_root(&mut self) {
        if self.root.is_none() {
            self.root = Some(RootNode::default());
        }
    }

    /// Insert `node` under `parent` at `index` (appended when `None`,
    /// clamped to the sibling count otherwise). Returns the node's id.
    ///
    /// The node arrives childless: a container keeps its capability but
    /// any child ids it carries are dropped. Children are linked by
    /// inserting them in turn.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        mut node: ComponentNode,
        index: Option<usize>,
    ) -> Result<NodeId, TreeError> {
        let id = node.id;
        if id.is_root() || self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }
        self.check_parent(parent)?;

        if parent.is_root() {
            self.ensure_root();
        }
        node.parent = parent;
        if let Children::Container(ids) = &mut node.children {
            ids.clear();
        }
        self.nodes.insert(id, node);

        let siblings = self
            .child_list_mut(parent)
            .ok_or(TreeError::InvalidParent(parent))?;
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, id);
        Ok(id)
    }

    /// Remove `id` and all of its descendants.
    ///
    /// Returns the deleted ids in pre-order: the subtree root first, then
    /// its descendants in document order.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let parent = self.parent_of(id).ok_or(TreeError::NotFound(id))?;

        // Collect everything before touching the map.
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));

        if let Some(siblings) = self.child_list_mut(parent) {
            siblings.retain(|c| *c != id);
        }
        for gone in &doomed {
            self.nodes.remove(gone);
        }
        Ok(doomed)
    }

    /// Move `id` under `new_parent` at `index`. The index refers to the
    /// new parent's child list after `id` has been detached.
    pub fn move_child(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        let old_parent = self.parent_of(id).ok_or(TreeError::NotFound(id))?;
        self.check_parent(new_parent)?;
        if id == new_parent || self.is_ancestor_of(id, new_parent) {
            return Err(TreeError::InvalidParent(new_parent));
        }

        if let Some(siblings) = self.child_list_mut(old_parent) {
            siblings.retain(|c| *c != id);
        }
        if new_parent.is_root() {
            self.ensure_root();
        }
        let siblings = self
            .child_list_mut(new_parent)
            .ok_or(TreeError::InvalidParent(new_parent))?;
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, id);

        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
        }
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) a property. Returns the previous
    /// value. No schema validation happens here.
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: Option<PropValue>,
    ) -> Result<Option<PropValue>, TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        Ok(match value {
            Some(v) => node.props.insert(key.to_string(), v),
            None => node.props.remove(key),
        })
    }

    /// Swap a node's component type and drop its props, keeping its
    /// children. The caller guarantees both types share the same
    /// children capability.
    pub fn retype(&mut self, id: NodeId, component_type: &str) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        node.component_type = component_type.to_string();
        node.props.clear();
        Ok(())
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn check_parent(&self, parent: NodeId) -> Result<(), TreeError> {
        if parent.is_root() {
            return Ok(());
        }
        match self.nodes.get(&parent) {
            None => Err(TreeError::NotFound(parent)),
            Some(p) if !p.is_container() => Err(TreeError::InvalidParent(parent)),
            Some(_) => Ok(()),
        }
    }

    fn child_list_mut(&mut self, parent: NodeId) -> Option<&mut Vec<NodeId>> {
        if parent.is_root() {
            return self.root.as_mut().map(|r| &mut r.children);
        }
        match &mut self.nodes.get_mut(&parent)?.children {
            Children::Leaf => None,
            Children::Container(ids) => Some(ids),
        }
    }
}
