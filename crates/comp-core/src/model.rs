//! Core data model for composition trees.
//!
//! A tree is a flat arena: every placed component is a `ComponentNode`
//! keyed by its `NodeId`, and parent/child links are stored as IDs rather
//! than references. The root is a separate pseudo-node that only holds the
//! ordered top-level IDs.

use crate::id::NodeId;
use serde::{Deserialize, Serialize, Serializer, ser};
use std::collections::BTreeMap;
use std::fmt;

// ─── Property values ─────────────────────────────────────────────────────

/// A stored property value. Closed set of primitive kinds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    String(String),
    StringArray(Vec<String>),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "bool",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::StringArray(_) => "array",
        }
    }
}

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            // Whole numbers go out as integers, the way browsers write them.
            PropValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            // JSON would write these as `null`, which no longer decodes.
            PropValue::Number(n) if !n.is_finite() => {
                Err(ser::Error::custom(format!("non-finite number {n}")))
            }
            PropValue::Number(n) => serializer.serialize_f64(*n),
            PropValue::String(s) => serializer.serialize_str(s),
            PropValue::StringArray(items) => items.serialize(serializer),
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::String(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::String(v)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(v: Vec<String>) -> Self {
        PropValue::StringArray(v)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::String(s) => f.write_str(s),
            PropValue::StringArray(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Explicitly-set properties of a node. Unset properties are absent.
pub type Props = BTreeMap<String, PropValue>;

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Whether a node can hold children, and which ones it holds.
///
/// On the wire this is the presence (`Container`) or absence (`Leaf`) of
/// the `childIds` field; an empty container is not the same as a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children {
    #[default]
    Leaf,
    Container(Vec<NodeId>),
}

impl Children {
    pub fn ids(&self) -> &[NodeId] {
        match self {
            Children::Leaf => &[],
            Children::Container(ids) => ids,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Children::Container(_))
    }
}

/// One placed component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub id: NodeId,

    /// Registry key, e.g. `Button` or `LayoutFlex`.
    pub component_type: String,

    pub props: Props,

    /// Containing node, or [`NodeId::root`] for top-level nodes.
    pub parent: NodeId,

    pub children: Children,
}

impl ComponentNode {
    /// A node that cannot have children. `parent` is set on insertion.
    pub fn leaf(id: NodeId, component_type: impl Into<String>) -> Self {
        Self {
            id,
            component_type: component_type.into(),
            props: Props::new(),
            parent: NodeId::root(),
            children: Children::Leaf,
        }
    }

    /// A node that can hold children, starting empty.
    pub fn container(id: NodeId, component_type: impl Into<String>) -> Self {
        Self {
            children: Children::Container(Vec::new()),
            ..Self::leaf(id, component_type)
        }
    }

    /// Pick `leaf` or `container` from a capability flag (usually the
    /// registry's `supports_children`).
    pub fn new(id: NodeId, component_type: impl Into<String>, supports_children: bool) -> Self {
        if supports_children {
            Self::container(id, component_type)
        } else {
            Self::leaf(id, component_type)
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn child_ids(&self) -> &[NodeId] {
        self.children.ids()
    }

    pub fn is_container(&self) -> bool {
        self.children.is_container()
    }
}

/// The root pseudo-node: ordered top-level IDs and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootNode {
    pub children: Vec<NodeId>,
}
