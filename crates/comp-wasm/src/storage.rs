//! `localStorage` persistence for the browser build.

use comp_core::snapshot;
use comp_core::tree::Tree;
use comp_editor::storage::{StorageError, TreeStorage};
use wasm_bindgen::JsValue;

/// Stores the tree's JSON snapshot under one `localStorage` key.
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))
    }
}

impl TreeStorage for LocalStorage {
    fn load(&self) -> Result<Tree, StorageError> {
        match Self::storage()?.get_item(&self.key).map_err(js_error)? {
            Some(json) => Ok(snapshot::from_json(&json)?),
            None => Ok(Tree::new()),
        }
    }

    fn save(&mut self, tree: &Tree) -> Result<(), StorageError> {
        let json = snapshot::to_json(tree)?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(js_error)
    }
}

/// Quota errors and the like arrive as arbitrary JS values.
fn js_error(value: JsValue) -> StorageError {
    StorageError::Unavailable(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
