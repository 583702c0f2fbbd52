//! Snapshot format: the flat id → record map that storage holds.
//!
//! ```json
//! {
//!   "root":     { "childIds": ["Button_0"], "parentId": "__null__" },
//!   "Button_0": { "componentType": "Button", "props": {}, "parentId": "root" }
//! }
//! ```
//!
//! `childIds` is present exactly on records that can hold children. The
//! same structure is available as MessagePack for compact storage.

use crate::check::check_tree;
use crate::error::SnapshotError;
use crate::id::{NO_PARENT, NodeId};
use crate::model::{Children, ComponentNode, Props, RootNode};
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One stored record. The root record has no type and no props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_ids: Option<Vec<NodeId>>,
    pub parent_id: NodeId,
}

/// The whole stored tree, keyed by id (sorted for stable output).
pub type Snapshot = BTreeMap<NodeId, SavedRecord>;

/// Encode a tree as a snapshot. An empty tree without a root encodes as
/// an empty map.
pub fn to_snapshot(tree: &Tree) -> Snapshot {
    let mut snapshot = Snapshot::new();
    if let Some(root) = tree.root() {
        snapshot.insert(
            NodeId::root(),
            SavedRecord {
                component_type: None,
                props: None,
                child_ids: Some(root.children.clone()),
                parent_id: NodeId::intern(NO_PARENT),
            },
        );
    }
    for node in tree.nodes() {
        snapshot.insert(
            node.id,
            SavedRecord {
                component_type: Some(node.component_type.clone()),
                props: Some(node.props.clone()),
                child_ids: match &node.children {
                    Children::Leaf => None,
                    Children::Container(ids) => Some(ids.clone()),
                },
                parent_id: node.parent,
            },
        );
    }
    snapshot
}

/// Decode a snapshot, rejecting anything that is not a well-formed tree.
pub fn from_snapshot(snapshot: Snapshot) -> Result<Tree, SnapshotError> {
    let mut root = None;
    let mut nodes = HashMap::with_capacity(snapshot.len());

    for (id, record) in snapshot {
        id.reserve();
        if id.is_root() {
            if record.component_type.is_some() || record.parent_id.as_str() != NO_PARENT {
                return Err(SnapshotError::Inconsistent(
                    "root record must have no type and no parent".into(),
                ));
            }
            root = Some(RootNode {
                children: record.child_ids.unwrap_or_default(),
            });
            continue;
        }

        let component_type = record.component_type.ok_or_else(|| {
            SnapshotError::Inconsistent(format!("record `{id}` has no componentType"))
        })?;
        nodes.insert(
            id,
            ComponentNode {
                id,
                component_type,
                props: record.props.unwrap_or_default(),
                parent: record.parent_id,
                children: match record.child_ids {
                    Some(ids) => Children::Container(ids),
                    None => Children::Leaf,
                },
            },
        );
    }

    let tree = Tree::from_parts(root, nodes);
    let diags = check_tree(&tree, None);
    if let Some(first) = diags.first() {
        log::warn!("rejecting snapshot with {} problem(s)", diags.len());
        return Err(SnapshotError::Inconsistent(format!(
            "{} ({} problem(s) total)",
            first.message,
            diags.len()
        )));
    }
    Ok(tree)
}

pub fn to_json(tree: &Tree) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&to_snapshot(tree))?)
}

pub fn from_json(json: &str) -> Result<Tree, SnapshotError> {
    from_snapshot(serde_json::from_str(json)?)
}

pub fn to_msgpack(tree: &Tree) -> Result<Vec<u8>, SnapshotError> {
    // Named fields: records skip absent fields, so positional encoding
    // would not decode.
    Ok(rmp_serde::to_vec_named(&to_snapshot(tree))?)
}

pub fn from_msgpack(bytes: &[u8]) -> Result<Tree, SnapshotError> {
    from_snapshot(rmp_serde::from_slice(bytes)?)
}
