//! Editor configuration.
//!
//! Every field has a default, so a host can deserialize a partial JSON
//! object (or nothing at all) and get a working editor.

use serde::Deserialize;

/// Knobs the host application may override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Component type created by "group selected". Must be a type the
    /// registry lets hold children. Default: **LayoutFlex**.
    pub group_container_type: String,

    /// Query-string key carrying the comma-joined selection.
    /// Default: **selected**.
    pub selection_param: String,

    /// Key the persistence adapter stores the tree under.
    /// Default: **componentConfigs**.
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            group_container_type: "LayoutFlex".to_string(),
            selection_param: "selected".to_string(),
            storage_key: "componentConfigs".to_string(),
        }
    }
}
