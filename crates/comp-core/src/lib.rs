pub mod check;
pub mod error;
pub mod id;
pub mod model;
pub mod props;
pub mod registry;
pub mod snapshot;
pub mod template;
pub mod tree;

pub use check::{TreeDiagnostic, check_tree};
pub use error::{PropError, SnapshotError, TreeError};
pub use id::NodeId;
pub use model::*;
pub use props::{resolve_props, validate_prop};
pub use registry::{
    ComponentCategory, ComponentRegistry, ComponentSchema, PropKind, PropSpec, StaticRegistry,
    builtin_registry,
};
pub use template::{ComponentTemplate, instantiate_template};
pub use tree::Tree;
