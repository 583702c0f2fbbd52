//! Persistence seam: where the tree lives between sessions.
//!
//! The editor only sees `TreeStorage`. A browser host plugs in
//! `localStorage`; tests and native hosts use `MemoryStorage`.

use comp_core::error::SnapshotError;
use comp_core::snapshot;
use comp_core::tree::Tree;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("stored tree is unreadable: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Load and save a whole tree.
pub trait TreeStorage {
    /// The saved tree, or an empty tree (no root) when nothing was saved.
    fn load(&self) -> Result<Tree, StorageError>;

    fn save(&mut self, tree: &Tree) -> Result<(), StorageError>;
}

/// Keeps the last saved tree as its JSON snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    json: Option<String>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously saved JSON snapshot.
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }

    /// The last saved snapshot.
    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }

    /// Number of successful writes since creation.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl TreeStorage for MemoryStorage {
    fn load(&self) -> Result<Tree, StorageError> {
        match &self.json {
            Some(json) => Ok(snapshot::from_json(json)?),
            None => Ok(Tree::new()),
        }
    }

    fn save(&mut self, tree: &Tree) -> Result<(), StorageError> {
        self.json = Some(snapshot::to_json(tree)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comp_core::id::NodeId;
    use comp_core::model::ComponentNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_without_save_is_empty() {
        let tree = MemoryStorage::new().load().unwrap();
        assert!(!tree.has_root());
        assert!(tree.is_empty());
    }

    #[test]
    fn save_then_load() {
        let mut tree = Tree::new();
        tree.insert_child(
            NodeId::root(),
            ComponentNode::leaf(NodeId::intern("mem_b"), "Button"),
            None,
        )
        .unwrap();
        let mut storage = MemoryStorage::new();
        storage.save(&tree).unwrap();
        assert_eq!(storage.save_count(), 1);
        assert_eq!(storage.load().unwrap(), tree);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let storage = MemoryStorage::with_json("[1, 2]");
        assert!(matches!(storage.load(), Err(StorageError::Snapshot(_))));
    }
}
