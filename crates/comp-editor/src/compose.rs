//! Composition operations: the edits a user triggers by clicking and
//! typing. Each one reads the selection, reshapes the tree through the
//! store's primitives, and leaves a new selection behind.
//!
//! Ids in the selection that are no longer in the tree are skipped. An
//! operation whose preconditions do not hold does nothing and reports
//! `Ok(None)` / `Ok(false)`; only id-generation bugs surface as errors.

use crate::selection::Selection;
use comp_core::error::TreeError;
use comp_core::id::NodeId;
use comp_core::model::ComponentNode;
use comp_core::registry::ComponentRegistry;
use comp_core::template::instantiate_template;
use comp_core::tree::Tree;

// ─── Add ─────────────────────────────────────────────────────────────────

/// Where a new node goes, given the current selection.
///
/// One selected container: appended as its last child. One selected leaf:
/// right after it, under the same parent. Anything else: top level.
pub fn insertion_point(tree: &Tree, selection: &Selection) -> (NodeId, Option<usize>) {
    let live: Vec<NodeId> = selection
        .current()
        .iter()
        .copied()
        .filter(|id| tree.contains(*id))
        .collect();
    if let [only] = *live.as_slice() {
        if tree.can_hold_children(only) {
            return (only, None);
        }
        if let (Some(parent), Some(index)) = (tree.parent_of(only), tree.index_in_parent(only)) {
            return (parent, Some(index + 1));
        }
    }
    (NodeId::root(), None)
}

/// Add a `component_type` node (or its template) at the insertion point
/// and select it. Returns the new node's id, or `None` for a type the
/// registry does not know.
pub fn add_component(
    tree: &mut Tree,
    selection: &mut Selection,
    registry: &dyn ComponentRegistry,
    component_type: &str,
) -> Result<Option<NodeId>, TreeError> {
    if registry.schema(component_type).is_none() {
        log::warn!("add: unknown component type `{component_type}`");
        return Ok(None);
    }
    let (parent, index) = insertion_point(tree, selection);

    let id = match registry.template(component_type) {
        Some(template) => instantiate_template(tree, registry, template, parent, index)?,
        None => {
            let node = ComponentNode::new(
                tree.fresh_id(component_type),
                component_type,
                registry.supports_children(component_type),
            );
            tree.insert_child(parent, node, index)?
        }
    };
    log::debug!("add: {component_type} `{id}` under `{parent}`");
    selection.select(id);
    Ok(Some(id))
}

// ─── Group ───────────────────────────────────────────────────────────────

/// Wrap the selected nodes in a new `container_type` node placed at the
/// first selected node's slot. Children follow selection order, not
/// document order. The new container becomes the selection.
pub fn group_selected(
    tree: &mut Tree,
    selection: &mut Selection,
    registry: &dyn ComponentRegistry,
    container_type: &str,
) -> Result<Option<NodeId>, TreeError> {
    let ids: Vec<NodeId> = selection
        .current()
        .iter()
        .copied()
        .filter(|id| !id.is_root() && tree.contains(*id))
        .collect();
    let Some(&first) = ids.first() else {
        return Ok(None);
    };
    if !registry.supports_children(container_type) {
        log::warn!("group: `{container_type}` cannot hold children");
        return Ok(None);
    }
    let (Some(parent), Some(index)) = (tree.parent_of(first), tree.index_in_parent(first)) else {
        return Ok(None);
    };
    // The container lands under `parent`; a selected ancestor of it would
    // end up inside its own descendant.
    if ids
        .iter()
        .any(|&id| id == parent || tree.is_ancestor_of(id, parent))
    {
        log::debug!("group: selection contains an ancestor of `{parent}`");
        return Ok(None);
    }

    let container = ComponentNode::container(tree.fresh_id(container_type), container_type);
    let container_id = tree.insert_child(parent, container, Some(index))?;
    // `first` now sits at index + 1; moving it out leaves the container
    // exactly in its old slot.
    for &id in &ids {
        tree.move_child(id, container_id, None)?;
    }

    log::debug!("group: {} node(s) into `{container_id}`", ids.len());
    selection.select(container_id);
    Ok(Some(container_id))
}

// ─── Ungroup ─────────────────────────────────────────────────────────────

/// Dissolve every selected container, splicing its children into its
/// parent at its slot. The freed children become the selection.
///
/// Returns `false` without touching anything when no selected node is a
/// container.
pub fn ungroup_selected(tree: &mut Tree, selection: &mut Selection) -> Result<bool, TreeError> {
    let mut freed = Vec::new();
    let mut any = false;

    for id in selection.current().to_vec() {
        let Some(node) = tree.get_node(id) else {
            log::trace!("ungroup: skipping missing `{id}`");
            continue;
        };
        if !node.is_container() {
            continue;
        }
        let parent = node.parent;
        let children = node.child_ids().to_vec();
        let Some(index) = tree.index_in_parent(id) else {
            continue;
        };

        // Each child goes in front of the container, which slides right
        // and is removed once empty.
        for (offset, &child) in children.iter().enumerate() {
            tree.move_child(child, parent, Some(index + offset))?;
        }
        tree.remove_subtree(id)?;
        log::debug!("ungroup: `{id}` freed {} child(ren)", children.len());

        freed.extend(children);
        any = true;
    }

    if !any {
        return Ok(false);
    }
    // A container freed by an earlier ungroup in this batch may itself
    // have been dissolved since.
    selection.set(freed.into_iter().filter(|id| tree.contains(*id)));
    Ok(true)
}

// ─── Delete ──────────────────────────────────────────────────────────────

/// Delete every selected node with its descendants, last-selected first.
///
/// The next selection comes from the first node actually deleted: the
/// sibling now in its slot, else its parent's last remaining child, else
/// its parent (unless that is the root).
pub fn delete_selected(tree: &mut Tree, selection: &mut Selection) -> Result<bool, TreeError> {
    if selection.is_empty() {
        return Ok(false);
    }

    let mut neighborhood: Option<(NodeId, usize)> = None;
    let mut deleted = 0usize;

    for &id in selection.current().iter().rev() {
        let (Some(parent), Some(index)) = (tree.parent_of(id), tree.index_in_parent(id)) else {
            log::trace!("delete: `{id}` already gone");
            continue;
        };
        match tree.remove_subtree(id) {
            Ok(gone) => deleted += gone.len(),
            Err(TreeError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
        neighborhood.get_or_insert((parent, index));
    }

    let next = neighborhood.and_then(|(parent, index)| next_after_delete(tree, parent, index));
    selection.set(next);
    log::debug!("delete: removed {deleted} node(s), next selection {next:?}");
    Ok(deleted > 0)
}

fn next_after_delete(tree: &Tree, parent: NodeId, index: usize) -> Option<NodeId> {
    if !parent.is_root() && !tree.contains(parent) {
        return None;
    }
    let siblings = tree.children_of(parent)?;
    siblings
        .get(index)
        .or_else(|| siblings.last())
        .copied()
        .or_else(|| (!parent.is_root()).then_some(parent))
}

// ─── Layout type ─────────────────────────────────────────────────────────

/// Switch a layout container to another layout type. Props reset because
/// the two types do not share a schema. Returns whether anything changed.
pub fn change_layout_type(
    tree: &mut Tree,
    registry: &dyn ComponentRegistry,
    id: NodeId,
    component_type: &str,
) -> Result<bool, TreeError> {
    let node = tree.get_node(id).ok_or(TreeError::NotFound(id))?;
    if node.component_type == component_type {
        return Ok(false);
    }
    if !registry.is_layout(&node.component_type) || !registry.is_layout(component_type) {
        log::debug!(
            "layout: `{id}` ({}) cannot become {component_type}",
            node.component_type
        );
        return Ok(false);
    }
    tree.retype(id, component_type)?;
    Ok(true)
}
