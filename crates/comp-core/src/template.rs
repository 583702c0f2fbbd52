//! Component templates: pre-built subtrees that some component types
//! expand into when added (e.g. `Select` → form control + label + options).

use crate::error::TreeError;
use crate::id::NodeId;
use crate::model::{ComponentNode, PropValue, Props};
use crate::registry::ComponentRegistry;
use crate::tree::Tree;

/// A declared node plus its declared children.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTemplate {
    pub component_type: String,
    pub props: Props,
    pub children: Vec<ComponentTemplate>,
}

impl ComponentTemplate {
    pub fn new(component_type: &str) -> Self {
        Self {
            component_type: component_type.to_string(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: ComponentTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes this template creates, itself included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(t) = stack.pop() {
            count += 1;
            stack.extend(t.children.iter());
        }
        count
    }

    /// First templated type that declares children but cannot hold them.
    fn first_incapable<'a>(&'a self, registry: &dyn ComponentRegistry) -> Option<&'a str> {
        let mut stack = vec![self];
        while let Some(t) = stack.pop() {
            if !t.children.is_empty() && !registry.supports_children(&t.component_type) {
                return Some(&t.component_type);
            }
            stack.extend(t.children.iter());
        }
        None
    }
}

/// Text node shorthand used throughout the built-in templates.
fn text(value: &str) -> ComponentTemplate {
    ComponentTemplate::new("Text").prop("value", value)
}

/// Templates keyed by the requested component type.
pub fn builtin_templates() -> Vec<(&'static str, ComponentTemplate)> {
    let select = ComponentTemplate::new("FormControl")
        .child(ComponentTemplate::new("InputLabel").child(text("Item")))
        .child(
            (1..=3).fold(
                ComponentTemplate::new("Select").prop("value", "Item 1"),
                |select, n| {
                    let label = format!("Item {n}");
                    select.child(
                        ComponentTemplate::new("MenuItem")
                            .prop("value", label.as_str())
                            .child(text(&label)),
                    )
                },
            ),
        );

    let cell = |label: &str| ComponentTemplate::new("TableCell").child(text(label));
    let row = |labels: [&str; 3]| {
        labels
            .into_iter()
            .fold(ComponentTemplate::new("TableRow"), |row, l| row.child(cell(l)))
    };
    let table = ComponentTemplate::new("Table")
        .child(ComponentTemplate::new("TableHead").child(row(["Column 1", "Column 2", "Column 3"])))
        .child(
            ComponentTemplate::new("TableBody")
                .child(row(["A1", "A2", "A3"]))
                .child(row(["B1", "B2", "B3"]))
                .child(row(["C1", "C2", "C3"])),
        );

    vec![("Select", select), ("Table", table)]
}

/// Insert a whole template under `parent` at `index`, giving every node a
/// fresh id. Returns the id of the template's root node.
///
/// Either the whole subtree is inserted or nothing is: the parent and the
/// template's own structure are checked before the first insert.
pub fn instantiate_template(
    tree: &mut Tree,
    registry: &dyn ComponentRegistry,
    template: &ComponentTemplate,
    parent: NodeId,
    index: Option<usize>,
) -> Result<NodeId, TreeError> {
    if !tree.can_hold_children(parent) {
        return Err(if parent.is_root() || tree.contains(parent) {
            TreeError::InvalidParent(parent)
        } else {
            TreeError::NotFound(parent)
        });
    }
    if let Some(bad) = template.first_incapable(registry) {
        log::error!("template node `{bad}` declares children it cannot hold");
        return Err(TreeError::InvalidParent(NodeId::intern(bad)));
    }

    let root_id = insert_one(tree, registry, template, parent, index)?;

    // Breadth-first over the template, inserting each child list in order.
    let mut queue = std::collections::VecDeque::from([(template, root_id)]);
    while let Some((t, id)) = queue.pop_front() {
        for child in &t.children {
            let child_id = insert_one(tree, registry, child, id, None)?;
            queue.push_back((child, child_id));
        }
    }

    log::debug!(
        "instantiated `{}` template as {root_id} ({} nodes)",
        template.component_type,
        template.node_count()
    );
    Ok(root_id)
}

fn insert_one(
    tree: &mut Tree,
    registry: &dyn ComponentRegistry,
    template: &ComponentTemplate,
    parent: NodeId,
    index: Option<usize>,
) -> Result<NodeId, TreeError> {
    let id = tree.fresh_id(&template.component_type);
    let node = ComponentNode::new(
        id,
        template.component_type.as_str(),
        registry.supports_children(&template.component_type),
    )
    .with_props(template.props.clone());
    tree.insert_child(parent, node, index)
}
