//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.
//!
//! - Backspace / Delete = delete selected
//! - ↑ / ↓ = walk the tree in document order
//! - ⌘G = group, ⌘⇧G = ungroup
//! - Escape = deselect
//! - `/` = open quick add (the host UI owns the search box)

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    Group,
    Ungroup,

    // ── Navigate ──
    MoveUp,
    MoveDown,
    Deselect,

    // ── UI ──
    /// Handled by the host; the editor reports it and does nothing.
    QuickAdd,
}

impl ShortcutAction {
    /// Stable name used across the WASM boundary.
    pub fn name(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Group => "group",
            Self::Ungroup => "ungroup",
            Self::MoveUp => "moveUp",
            Self::MoveDown => "moveDown",
            Self::Deselect => "deselect",
            Self::QuickAdd => "quickAdd",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"g"`, `"Backspace"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "g" | "G" => Some(ShortcutAction::Ungroup),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "g" | "G" => Some(ShortcutAction::Group),
                _ => None,
            };
        }

        // ── Single keys (shift is ignored) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "ArrowUp" => Some(ShortcutAction::MoveUp),
            "ArrowDown" => Some(ShortcutAction::MoveDown),
            "Escape" => Some(ShortcutAction::Deselect),
            "/" if !shift => Some(ShortcutAction::QuickAdd),
            _ => None,
        }
    }
}
