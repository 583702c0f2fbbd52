//! WASM bridge for Composition: exposes the tree editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page renders the tree
//! and the property form; every gesture comes back through
//! `CompositionCanvas`, which persists to `localStorage`.

mod storage;

use comp_core::id::NodeId;
use comp_core::model::PropValue;
use comp_core::registry::{
    ComponentCategory, ComponentRegistry, StaticRegistry, builtin_registry,
};
use comp_core::snapshot;
use comp_editor::engine::{EditCommand, EditError, EditOutcome, Editor};
use comp_editor::shortcuts::{ShortcutAction, ShortcutMap};
use comp_editor::EditorConfig;
use wasm_bindgen::prelude::*;

pub use storage::LocalStorage;

/// The main WASM-facing editor controller.
///
/// Holds the editor engine over the built-in registry. All interaction
/// from the page goes through this struct.
#[wasm_bindgen]
pub struct CompositionCanvas {
    editor: Editor<StaticRegistry, LocalStorage>,
}

#[wasm_bindgen]
impl CompositionCanvas {
    /// Load the saved tree. `config_json` may override any
    /// `EditorConfig` field; malformed config falls back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        console_error_panic_hook_setup();

        let config = parse_config(config_json.as_deref());
        let storage = LocalStorage::new(config.storage_key.clone());
        Self {
            editor: Editor::load(builtin_registry(), storage, config),
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Restore the selection from `location.search`.
    pub fn restore_selection(&mut self, query: &str) {
        self.editor.restore_selection(query);
    }

    /// The selection as a query fragment, e.g. `selected=Button_0%2CText_1`.
    pub fn selection_query(&self) -> String {
        self.editor.selection_query()
    }

    /// Pointer click on a node, or on empty canvas when `node_id` is
    /// empty. Shift or ⌘ adds to the selection.
    /// Returns `true` if the selection changed.
    pub fn click(&mut self, node_id: &str, shift: bool, meta: bool) -> bool {
        let hit = (!node_id.is_empty()).then(|| NodeId::intern(node_id));
        self.apply(EditCommand::Click {
            hit,
            additive: shift || meta,
        })
    }

    /// Select a single node (e.g. from the component browser).
    /// Returns `true` if the node exists.
    pub fn select_by_id(&mut self, node_id: &str) -> bool {
        let id = NodeId::intern(node_id);
        if !self.editor.tree().contains(id) {
            return false;
        }
        self.apply(EditCommand::Select(id));
        true
    }

    /// Get all selected node IDs as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<&str> = self
            .editor
            .selection()
            .current()
            .iter()
            .map(|id| id.as_str())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Composition ─────────────────────────────────────────────────────

    /// Add a component next to / inside the selection. Returns `true` if
    /// the tree changed.
    pub fn add_component(&mut self, component_type: &str) -> bool {
        self.apply(EditCommand::AddComponent {
            component_type: component_type.to_string(),
        })
    }

    pub fn group_selected(&mut self) -> bool {
        self.apply(EditCommand::GroupSelected)
    }

    pub fn ungroup_selected(&mut self) -> bool {
        self.apply(EditCommand::UngroupSelected)
    }

    pub fn delete_selected(&mut self) -> bool {
        self.apply(EditCommand::DeleteSelected)
    }

    /// Switch a layout container between layout types (props reset).
    pub fn change_layout_type(&mut self, node_id: &str, component_type: &str) -> bool {
        self.apply(EditCommand::ChangeLayoutType {
            id: NodeId::intern(node_id),
            component_type: component_type.to_string(),
        })
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>"}`
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return key_result_json(None, false);
        };
        let changed = outcome_changed(self.editor.handle_action(action));
        key_result_json(Some(action), changed)
    }

    // ─── Tree & properties ───────────────────────────────────────────────

    /// The whole tree in its stored JSON form.
    pub fn get_tree_json(&self) -> String {
        snapshot::to_json(self.editor.tree()).unwrap_or_else(|_| "{}".to_string())
    }

    /// A node's props as the form should show them (defaults filled in).
    /// Returns `{}` for unknown nodes.
    pub fn get_props_json(&self, node_id: &str) -> String {
        self.editor
            .resolved_props(NodeId::intern(node_id))
            .and_then(|props| serde_json::to_string(&props).ok())
            .unwrap_or_else(|| "{}".to_string())
    }

    /// Set a property from its JSON encoding; `null` clears it.
    /// Returns `true` if the tree changed.
    pub fn set_prop_json(&mut self, node_id: &str, key: &str, value_json: &str) -> bool {
        match parse_prop_json(value_json) {
            Ok(value) => self.set_prop_value(node_id, key, value),
            Err(e) => {
                log::debug!("ignoring malformed value for `{key}`: {e}");
                false
            }
        }
    }

    /// Set a property from a native JS value; `null` / `undefined` clears it.
    pub fn set_prop(&mut self, node_id: &str, key: &str, value: JsValue) -> bool {
        if value.is_null() || value.is_undefined() {
            return self.set_prop_value(node_id, key, None);
        }
        match js_to_prop(&value) {
            Some(prop) => self.set_prop_value(node_id, key, Some(prop)),
            None => false,
        }
    }

    /// The property schema of a component type, or `null`.
    pub fn get_schema_json(&self, component_type: &str) -> String {
        self.editor
            .registry()
            .schema(component_type)
            .and_then(|schema| serde_json::to_string(schema).ok())
            .unwrap_or_else(|| "null".to_string())
    }
}

impl CompositionCanvas {
    fn apply(&mut self, command: EditCommand) -> bool {
        outcome_changed(self.editor.apply(command))
    }

    fn set_prop_value(&mut self, node_id: &str, key: &str, value: Option<PropValue>) -> bool {
        outcome_changed(
            self.editor
                .set_property(NodeId::intern(node_id), key, value),
        )
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// The add-component menu: `{"primitives":[..],"layouts":[..],"library":[..]}`.
#[wasm_bindgen]
pub fn component_types_json() -> String {
    component_menu(&builtin_registry()).to_string()
}

/// Check a stored tree. Returns JSON: `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_snapshot(json: &str) -> String {
    match snapshot::from_json(json) {
        Ok(_) => serde_json::json!({ "ok": true }).to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse_config(json: Option<&str>) -> EditorConfig {
    match json.map(serde_json::from_str::<EditorConfig>) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("bad editor config, using defaults: {e}");
            EditorConfig::default()
        }
        None => EditorConfig::default(),
    }
}

/// Errors never cross into JS; a refused edit simply did nothing.
fn outcome_changed(result: Result<EditOutcome, EditError>) -> bool {
    match result {
        Ok(outcome) => outcome.changed(),
        Err(e) => {
            log::debug!("edit refused: {e}");
            false
        }
    }
}

fn key_result_json(action: Option<ShortcutAction>, changed: bool) -> String {
    let name = action.map_or("none", ShortcutAction::name);
    serde_json::json!({ "changed": changed, "action": name }).to_string()
}

fn parse_prop_json(json: &str) -> Result<Option<PropValue>, serde_json::Error> {
    serde_json::from_str(json)
}

fn js_to_prop(value: &JsValue) -> Option<PropValue> {
    if let Some(b) = value.as_bool() {
        return Some(PropValue::Bool(b));
    }
    if let Some(n) = value.as_f64() {
        return Some(PropValue::Number(n));
    }
    if let Some(s) = value.as_string() {
        return Some(PropValue::String(s));
    }
    if js_sys::Array::is_array(value) {
        let items = js_sys::Array::from(value)
            .iter()
            .map(|item| item.as_string())
            .collect::<Option<Vec<_>>>()?;
        return Some(PropValue::StringArray(items));
    }
    None
}

fn component_menu(registry: &StaticRegistry) -> serde_json::Value {
    serde_json::json!({
        "primitives": registry.types_in(ComponentCategory::Primitive),
        "layouts": registry.types_in(ComponentCategory::Layout),
        "library": registry.types_in(ComponentCategory::Library),
    })
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Composition WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
