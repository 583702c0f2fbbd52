use crate::id::NodeId;
use thiserror::Error;

/// Failure of a single Tree Store primitive. Primitives that fail leave
/// the tree untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The referenced node does not exist (or is the root where a real
    /// node is required).
    #[error("node `{0}` not found")]
    NotFound(NodeId),
    /// The target cannot hold children, or the move would create a cycle.
    #[error("`{0}` is not a valid parent here")]
    InvalidParent(NodeId),
    /// An inserted id collides with a live node. Points at an
    /// id-generation bug.
    #[error("node id `{0}` already exists")]
    DuplicateId(NodeId),
}

/// Failure decoding or encoding a stored tree.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack encode error: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decode error: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

/// A property write rejected by the component's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropError {
    #[error("unknown component type `{0}`")]
    UnknownComponent(String),
    #[error("`{component}` has no property `{prop}`")]
    UnknownProp { component: String, prop: String },
    #[error("property `{prop}` expects {expected}, got {found}")]
    WrongKind {
        prop: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{value}` is not an allowed value for `{prop}`")]
    NotAllowed { prop: String, value: String },
    /// NaN and the infinities have no JSON form.
    #[error("property `{prop}` must be a finite number")]
    NotFinite { prop: String },
}
