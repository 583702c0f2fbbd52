//! Editor engine: the single owner of the tree and the selection.
//!
//! Every user gesture becomes an `EditCommand`. The engine applies it,
//! reports what changed, and hands the tree to storage whenever the tree
//! (not just the selection) changed. Storage failures are logged and
//! otherwise ignored; the in-memory tree stays authoritative.

use crate::compose::{
    add_component, change_layout_type, delete_selected, group_selected, ungroup_selected,
};
use crate::config::EditorConfig;
use crate::query::{selection_from_query, selection_to_query};
use crate::selection::Selection;
use crate::shortcuts::ShortcutAction;
use crate::storage::TreeStorage;
use comp_core::error::{PropError, TreeError};
use comp_core::id::NodeId;
use comp_core::model::{PropValue, Props};
use comp_core::props::{resolve_props, validate_prop};
use comp_core::registry::ComponentRegistry;
use comp_core::tree::Tree;
use thiserror::Error;

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Prop(#[from] PropError),
}

/// A user-level edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    AddComponent {
        component_type: String,
    },
    GroupSelected,
    UngroupSelected,
    DeleteSelected,
    Select(NodeId),
    Extend(NodeId),
    /// Pointer click. `None` is a click on empty canvas.
    Click {
        hit: Option<NodeId>,
        additive: bool,
    },
    ClearSelection,
    MoveUp,
    MoveDown,
    /// Set (`Some`) or clear (`None`) a property, checked against the
    /// registry.
    SetProperty {
        id: NodeId,
        key: String,
        value: Option<PropValue>,
    },
    ChangeLayoutType {
        id: NodeId,
        component_type: String,
    },
}

/// What an applied command changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub tree_changed: bool,
    pub selection_changed: bool,
}

impl EditOutcome {
    pub fn changed(&self) -> bool {
        self.tree_changed || self.selection_changed
    }
}

pub struct Editor<R, S> {
    tree: Tree,
    selection: Selection,
    registry: R,
    storage: S,
    config: EditorConfig,
}

impl<R: ComponentRegistry, S: TreeStorage> Editor<R, S> {
    /// An editor over an empty tree. Nothing is read from `storage`.
    pub fn new(registry: R, storage: S, config: EditorConfig) -> Self {
        Self {
            tree: Tree::new(),
            selection: Selection::new(),
            registry,
            storage,
            config,
        }
    }

    /// An editor over whatever `storage` holds. An unreadable store
    /// starts empty; the next edit overwrites it.
    pub fn load(registry: R, storage: S, config: EditorConfig) -> Self {
        let mut editor = Self::new(registry, storage, config);
        match editor.storage.load() {
            Ok(tree) => {
                log::debug!("loaded tree with {} node(s)", tree.len());
                editor.tree = tree;
            }
            Err(e) => log::warn!("starting with an empty tree: {e}"),
        }
        editor
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Stored props plus registry defaults for unset required props.
    pub fn resolved_props(&self, id: NodeId) -> Option<Props> {
        self.tree
            .get_node(id)
            .map(|node| resolve_props(&self.registry, node))
    }

    // ─── Selection in the URL ────────────────────────────────────────────

    /// Replace the selection with the ids found in `query`, dropping any
    /// that are not in the tree.
    pub fn restore_selection(&mut self, query: &str) {
        self.selection = selection_from_query(query, &self.config.selection_param, &self.tree);
    }

    /// The selection as a `key=value` query fragment (empty when nothing
    /// is selected).
    pub fn selection_query(&self) -> String {
        selection_to_query(self.selection.current(), &self.config.selection_param)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Apply a command. The tree is saved iff it changed.
    pub fn apply(&mut self, command: EditCommand) -> Result<EditOutcome, EditError> {
        log::debug!("apply {command:?}");
        let before = self.selection.clone();

        let tree_changed = match self.dispatch(command) {
            Ok(changed) => changed,
            Err(e) => {
                if let EditError::Tree(TreeError::DuplicateId(id)) = &e {
                    log::error!("id collision on `{id}`: fresh ids are not unique");
                } else {
                    log::debug!("command refused: {e}");
                }
                return Err(e);
            }
        };

        if tree_changed {
            self.persist();
        }
        Ok(EditOutcome {
            tree_changed,
            selection_changed: self.selection != before,
        })
    }

    /// Apply the command bound to a shortcut. `QuickAdd` belongs to the
    /// host UI and changes nothing here.
    pub fn handle_action(&mut self, action: ShortcutAction) -> Result<EditOutcome, EditError> {
        let command = match action {
            ShortcutAction::Delete => EditCommand::DeleteSelected,
            ShortcutAction::Group => EditCommand::GroupSelected,
            ShortcutAction::Ungroup => EditCommand::UngroupSelected,
            ShortcutAction::MoveUp => EditCommand::MoveUp,
            ShortcutAction::MoveDown => EditCommand::MoveDown,
            ShortcutAction::Deselect => EditCommand::ClearSelection,
            ShortcutAction::QuickAdd => return Ok(EditOutcome::default()),
        };
        self.apply(command)
    }

    /// Validated property write. See [`EditCommand::SetProperty`].
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: &str,
        value: Option<PropValue>,
    ) -> Result<EditOutcome, EditError> {
        self.apply(EditCommand::SetProperty {
            id,
            key: key.to_string(),
            value,
        })
    }

    /// Returns whether the tree changed.
    fn dispatch(&mut self, command: EditCommand) -> Result<bool, EditError> {
        let tree = &mut self.tree;
        let selection = &mut self.selection;
        Ok(match command {
            EditCommand::AddComponent { component_type } => {
                add_component(tree, selection, &self.registry, &component_type)?.is_some()
            }
            EditCommand::GroupSelected => group_selected(
                tree,
                selection,
                &self.registry,
                &self.config.group_container_type,
            )?
            .is_some(),
            EditCommand::UngroupSelected => ungroup_selected(tree, selection)?,
            EditCommand::DeleteSelected => delete_selected(tree, selection)?,
            EditCommand::Select(id) => {
                if tree.contains(id) {
                    selection.select(id);
                }
                false
            }
            EditCommand::Extend(id) => {
                if tree.contains(id) {
                    selection.extend(id);
                }
                false
            }
            EditCommand::Click { hit, additive } => {
                match hit {
                    Some(id) if !tree.contains(id) => log::trace!("click on stale `{id}`"),
                    _ => selection.click(hit, additive),
                }
                false
            }
            EditCommand::ClearSelection => {
                selection.clear();
                false
            }
            EditCommand::MoveUp => {
                selection.move_up(tree);
                false
            }
            EditCommand::MoveDown => {
                selection.move_down(tree);
                false
            }
            EditCommand::SetProperty { id, key, value } => {
                let node = tree.get_node(id).ok_or(TreeError::NotFound(id))?;
                if let Some(value) = &value {
                    validate_prop(&self.registry, &node.component_type, &key, value)?;
                }
                if node.props.get(&key) == value.as_ref() {
                    false
                } else {
                    tree.set_property(id, &key, value)?;
                    true
                }
            }
            EditCommand::ChangeLayoutType { id, component_type } => {
                change_layout_type(tree, &self.registry, id, &component_type)?
            }
        })
    }

    fn persist(&mut self) {
        match self.storage.save(&self.tree) {
            Ok(()) => log::debug!("saved tree with {} node(s)", self.tree.len()),
            Err(e) => log::warn!("failed to save tree: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};
    use comp_core::registry::{StaticRegistry, builtin_registry};
    use pretty_assertions::assert_eq;

    type TestEditor = Editor<StaticRegistry, MemoryStorage>;

    fn editor() -> TestEditor {
        Editor::new(
            builtin_registry(),
            MemoryStorage::new(),
            EditorConfig::default(),
        )
    }

    fn add(ed: &mut TestEditor, ty: &str) -> NodeId {
        ed.apply(EditCommand::AddComponent {
            component_type: ty.to_string(),
        })
        .unwrap();
        ed.selection().current()[0]
    }

    struct BrokenStorage;

    impl TreeStorage for BrokenStorage {
        fn load(&self) -> Result<Tree, StorageError> {
            Err(StorageError::Unavailable("no disk".into()))
        }

        fn save(&mut self, _tree: &Tree) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("no disk".into()))
        }
    }

    #[test]
    fn saves_only_when_tree_changes() {
        let mut ed = editor();
        let b = add(&mut ed, "Button");
        assert_eq!(ed.storage().save_count(), 1);

        let outcome = ed.apply(EditCommand::ClearSelection).unwrap();
        assert_eq!(
            outcome,
            EditOutcome {
                tree_changed: false,
                selection_changed: true
            }
        );
        // Ungroup with no container selected: nothing at all.
        ed.apply(EditCommand::Select(b)).unwrap();
        let outcome = ed.apply(EditCommand::UngroupSelected).unwrap();
        assert!(!outcome.changed());
        assert_eq!(ed.storage().save_count(), 1);

        ed.apply(EditCommand::DeleteSelected).unwrap();
        assert_eq!(ed.storage().save_count(), 2);
    }

    #[test]
    fn load_restores_saved_tree() {
        let mut ed = editor();
        let flex = add(&mut ed, "LayoutFlex");
        add(&mut ed, "Text");
        let json = ed.storage().json().unwrap().to_string();

        let loaded = Editor::load(
            builtin_registry(),
            MemoryStorage::with_json(json),
            EditorConfig::default(),
        );
        assert_eq!(loaded.tree(), ed.tree());
        assert!(loaded.selection().is_empty());
        assert!(loaded.tree().contains(flex));
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut ed = Editor::load(builtin_registry(), BrokenStorage, EditorConfig::default());
        assert!(ed.tree().is_empty());
        let outcome = ed
            .apply(EditCommand::AddComponent {
                component_type: "Button".into(),
            })
            .unwrap();
        assert!(outcome.tree_changed);
        assert_eq!(ed.tree().len(), 1);
    }

    #[test]
    fn set_property_validates() {
        let mut ed = editor();
        let flex = add(&mut ed, "LayoutFlex");

        let outcome = ed
            .set_property(flex, "flexDirection", Some("column".into()))
            .unwrap();
        assert!(outcome.tree_changed);
        // Same value again: no change, no save.
        let saves = ed.storage().save_count();
        let outcome = ed
            .set_property(flex, "flexDirection", Some("column".into()))
            .unwrap();
        assert!(!outcome.tree_changed);
        assert_eq!(ed.storage().save_count(), saves);

        assert!(matches!(
            ed.set_property(flex, "flexDirection", Some("sideways".into())),
            Err(EditError::Prop(PropError::NotAllowed { .. }))
        ));
        assert!(matches!(
            ed.set_property(NodeId::intern("eng_gone"), "gap", None),
            Err(EditError::Tree(TreeError::NotFound(_)))
        ));

        // Clearing is always allowed.
        assert!(
            ed.set_property(flex, "flexDirection", None)
                .unwrap()
                .tree_changed
        );
        assert!(ed.tree().get_node(flex).unwrap().props.is_empty());
    }

    #[test]
    fn non_finite_numbers_never_reach_storage() {
        let mut ed = editor();
        let flex = add(&mut ed, "LayoutFlex");
        ed.set_property(flex, "gap", Some(PropValue::Number(8.0)))
            .unwrap();
        let saves = ed.storage().save_count();

        for n in [f64::INFINITY, f64::NAN] {
            assert_eq!(
                ed.set_property(flex, "gap", Some(PropValue::Number(n))),
                Err(EditError::Prop(PropError::NotFinite { prop: "gap".into() }))
            );
        }
        assert_eq!(ed.storage().save_count(), saves);

        let json = ed.storage().json().unwrap().to_string();
        let reloaded = Editor::load(
            builtin_registry(),
            MemoryStorage::with_json(json),
            EditorConfig::default(),
        );
        assert_eq!(reloaded.tree().len(), 1);
        assert_eq!(
            reloaded.tree().get_node(flex).unwrap().props["gap"],
            PropValue::Number(8.0)
        );
    }

    #[test]
    fn unencodable_tree_keeps_the_last_save() {
        let mut ed = editor();
        let flex = add(&mut ed, "LayoutFlex");
        let saved = ed.storage().json().unwrap().to_string();

        // Bypass validation: the store itself accepts anything.
        ed.tree
            .set_property(flex, "gap", Some(PropValue::Number(f64::INFINITY)))
            .unwrap();
        add(&mut ed, "Text");
        assert_eq!(ed.tree().len(), 2);
        assert_eq!(ed.storage().json(), Some(saved.as_str()));
    }

    #[test]
    fn resolved_props_fill_required_defaults() {
        let mut ed = editor();
        let text = add(&mut ed, "Text");
        assert_eq!(
            ed.resolved_props(text).unwrap().get("value"),
            Some(&PropValue::from("<text>"))
        );
        // Defaults are never stored.
        assert!(ed.tree().get_node(text).unwrap().props.is_empty());
    }

    #[test]
    fn selection_query_roundtrip() {
        let mut ed = editor();
        let a = add(&mut ed, "Button");
        ed.apply(EditCommand::ClearSelection).unwrap();
        let b = add(&mut ed, "Text");
        ed.apply(EditCommand::Extend(a)).unwrap();
        let query = ed.selection_query();
        assert_eq!(query, format!("selected={b}%2C{a}"));

        ed.apply(EditCommand::ClearSelection).unwrap();
        ed.restore_selection(&format!("?{query}"));
        assert_eq!(ed.selection().current(), &[b, a]);
    }

    #[test]
    fn stale_clicks_and_selects_are_ignored() {
        let mut ed = editor();
        let a = add(&mut ed, "Button");
        let gone = NodeId::intern("eng_stale");
        for cmd in [
            EditCommand::Select(gone),
            EditCommand::Extend(gone),
            EditCommand::Click {
                hit: Some(gone),
                additive: false,
            },
        ] {
            assert!(!ed.apply(cmd).unwrap().changed());
        }
        assert_eq!(ed.selection().current(), &[a]);

        ed.apply(EditCommand::Click {
            hit: None,
            additive: false,
        })
        .unwrap();
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn shortcut_actions_dispatch() {
        let mut ed = editor();
        let a = add(&mut ed, "Button");
        let b = add(&mut ed, "Text");
        ed.handle_action(ShortcutAction::MoveUp).unwrap();
        assert_eq!(ed.selection().current(), &[a]);
        ed.handle_action(ShortcutAction::MoveDown).unwrap();
        assert_eq!(ed.selection().current(), &[b]);
        assert!(!ed.handle_action(ShortcutAction::QuickAdd).unwrap().changed());
        ed.handle_action(ShortcutAction::Deselect).unwrap();
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn custom_group_container() {
        let config = EditorConfig {
            group_container_type: "LayoutGrid".into(),
            ..EditorConfig::default()
        };
        let mut ed = Editor::new(builtin_registry(), MemoryStorage::new(), config);
        add(&mut ed, "Button");
        ed.handle_action(ShortcutAction::Group).unwrap();
        let group = ed.selection().current()[0];
        assert_eq!(ed.tree().get_node(group).unwrap().component_type, "LayoutGrid");
    }
}
