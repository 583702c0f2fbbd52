use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for node IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter behind generated IDs. Never rewinds, so an ID handed
/// out in this session is never handed out again. Loaded snapshots push it
/// past their highest suffix (see [`NodeId::reserve`]); IDs deleted before
/// the last save are not remembered across sessions.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// The fixed ID of the root pseudo-node.
pub const ROOT_ID: &str = "root";

/// Parent marker stored on the root record: "no parent".
pub const NO_PARENT: &str = "__null__";

/// A lightweight, interned identifier for component nodes.
/// Internally a 4-byte `Spur` index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The distinguished root ID.
    pub fn root() -> Self {
        Self::intern(ROOT_ID)
    }

    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }

    /// Generate a new ID with a component-type prefix (e.g. `Button_4`).
    ///
    /// Uniqueness against IDs loaded from storage is the tree's job, see
    /// [`crate::tree::Tree::fresh_id`].
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Keep generated IDs clear of this one: a `<prefix>_<n>` ID moves the
    /// counter past `n`.
    pub fn reserve(&self) {
        let suffix = self
            .as_str()
            .rsplit_once('_')
            .and_then(|(_, n)| n.parse::<u64>().ok());
        if let Some(n) = suffix {
            COUNTER.fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by the resolved string, so sorted output is stable across runs.
impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("login_button");
        let b = NodeId::intern("login_button");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "login_button");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("Button");
        let b = NodeId::with_prefix("Button");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Button_"));
    }

    #[test]
    fn reserved_suffixes_are_skipped() {
        NodeId::intern("Button_900000").reserve();
        NodeId::intern("no_suffix_here").reserve();
        let next = NodeId::with_prefix("Text");
        let n: u64 = next.as_str().trim_start_matches("Text_").parse().unwrap();
        assert!(n > 900_000);
    }

    #[test]
    fn root_is_fixed() {
        assert!(NodeId::root().is_root());
        assert_eq!(NodeId::root().as_str(), "root");
        assert!(!NodeId::intern("b1").is_root());
    }

    #[test]
    fn ordering_follows_string() {
        let mut ids = vec![NodeId::intern("zeta"), NodeId::intern("alpha")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "alpha");
    }
}
