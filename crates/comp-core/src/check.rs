//! Structural checks for composition trees.
//!
//! Reports invariant violations without modifying the tree. Decoding a
//! snapshot rejects any tree with findings; tests run it after every edit.

use crate::id::NodeId;
use crate::registry::ComponentRegistry;
use crate::tree::Tree;
use std::collections::{HashMap, HashSet};

/// A single finding against one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDiagnostic {
    /// The node the finding refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Short rule identifier (e.g. "orphan", "parent-mismatch").
    pub rule: &'static str,
}

/// Run every structural rule. With a registry, also check that each
/// node's children capability matches its component type.
#[must_use]
pub fn check_tree(tree: &Tree, registry: Option<&dyn ComponentRegistry>) -> Vec<TreeDiagnostic> {
    let mut diags = Vec::new();
    check_root(tree, &mut diags);
    check_child_links(tree, &mut diags);
    check_parent_links(tree, &mut diags);
    check_reachability(tree, &mut diags);
    if let Some(registry) = registry {
        check_capability(tree, registry, &mut diags);
    }
    diags
}

fn check_root(tree: &Tree, diags: &mut Vec<TreeDiagnostic>) {
    if !tree.has_root() && !tree.is_empty() {
        diags.push(TreeDiagnostic {
            node_id: NodeId::root(),
            message: format!("{} nodes but no root record", tree.len()),
            rule: "missing-root",
        });
    }
}

/// Every listed child exists, points back at the list's owner, and is
/// listed exactly once across the whole tree.
fn check_child_links(tree: &Tree, diags: &mut Vec<TreeDiagnostic>) {
    let owners = std::iter::once((NodeId::root(), tree.root_children()))
        .chain(tree.nodes().map(|n| (n.id, n.child_ids())));

    let mut seen: HashMap<NodeId, NodeId> = HashMap::new();
    for (owner, children) in owners {
        for &child in children {
            if let Some(first) = seen.insert(child, owner) {
                diags.push(TreeDiagnostic {
                    node_id: child,
                    message: format!("`{child}` listed under both `{first}` and `{owner}`"),
                    rule: "duplicate-child",
                });
            }
            match tree.get_node(child) {
                None => diags.push(TreeDiagnostic {
                    node_id: owner,
                    message: format!("`{owner}` lists missing child `{child}`"),
                    rule: "dangling-child",
                }),
                Some(node) if node.parent != owner => diags.push(TreeDiagnostic {
                    node_id: child,
                    message: format!(
                        "`{child}` is listed under `{owner}` but its parent is `{}`",
                        node.parent
                    ),
                    rule: "parent-mismatch",
                }),
                Some(_) => {}
            }
        }
    }
}

/// Every parent pointer names the root or a live container.
fn check_parent_links(tree: &Tree, diags: &mut Vec<TreeDiagnostic>) {
    for node in tree.nodes() {
        if !tree.can_hold_children(node.parent) {
            diags.push(TreeDiagnostic {
                node_id: node.id,
                message: format!(
                    "`{}` points at `{}`, which cannot hold children",
                    node.id, node.parent
                ),
                rule: "dangling-parent",
            });
        }
    }
}

/// Every node is reachable from the root. Nodes that are not are either
/// orphans or part of a parent cycle.
fn check_reachability(tree: &Tree, diags: &mut Vec<TreeDiagnostic>) {
    let reachable: HashSet<NodeId> = tree.descendants(NodeId::root()).into_iter().collect();
    for node in tree.nodes() {
        if reachable.contains(&node.id) {
            continue;
        }
        let (rule, message) = if on_parent_cycle(tree, node.id) {
            ("cycle", format!("`{}` is its own ancestor", node.id))
        } else {
            ("orphan", format!("`{}` is not reachable from root", node.id))
        };
        diags.push(TreeDiagnostic {
            node_id: node.id,
            message,
            rule,
        });
    }
}

fn on_parent_cycle(tree: &Tree, start: NodeId) -> bool {
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(parent) = tree.parent_of(current) {
        if !visited.insert(current) {
            return true;
        }
        current = parent;
    }
    false
}

fn check_capability(tree: &Tree, registry: &dyn ComponentRegistry, diags: &mut Vec<TreeDiagnostic>) {
    for node in tree.nodes() {
        let expected = registry.supports_children(&node.component_type);
        if node.is_container() != expected {
            diags.push(TreeDiagnostic {
                node_id: node.id,
                message: if expected {
                    format!("`{}` ({}) should hold children", node.id, node.component_type)
                } else {
                    format!(
                        "`{}` ({}) cannot hold children",
                        node.id, node.component_type
                    )
                },
                rule: "capability",
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Children, ComponentNode, RootNode};
    use crate::registry::builtin_registry;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn rules(diags: &[TreeDiagnostic]) -> Vec<&'static str> {
        let mut r: Vec<_> = diags.iter().map(|d| d.rule).collect();
        r.sort();
        r.dedup();
        r
    }

    #[test]
    fn well_formed_tree_is_clean() {
        let mut tree = Tree::new();
        tree.insert_child(NodeId::root(), ComponentNode::container(id("chk_f"), "LayoutFlex"), None)
            .unwrap();
        tree.insert_child(id("chk_f"), ComponentNode::leaf(id("chk_t"), "Text"), None)
            .unwrap();
        let reg = builtin_registry();
        assert!(check_tree(&tree, Some(&reg)).is_empty());
        assert!(check_tree(&Tree::new(), None).is_empty());
    }

    #[test]
    fn detects_orphan_and_mismatch() {
        let mut nodes = HashMap::new();
        let mut lost = ComponentNode::leaf(id("chk_lost"), "Text");
        lost.parent = NodeId::root();
        nodes.insert(lost.id, lost);
        let tree = Tree::from_parts(Some(RootNode::default()), nodes);
        assert_eq!(rules(&check_tree(&tree, None)), vec!["orphan"]);

        let mut nodes = HashMap::new();
        let mut a = ComponentNode::container(id("chk_a"), "LayoutFlex");
        a.children = Children::Container(vec![id("chk_b")]);
        let b = ComponentNode::leaf(id("chk_b"), "Text"); // parent says root
        nodes.insert(a.id, a);
        nodes.insert(b.id, b);
        let root = RootNode {
            children: vec![id("chk_a")],
        };
        let tree = Tree::from_parts(Some(root), nodes);
        assert_eq!(rules(&check_tree(&tree, None)), vec!["parent-mismatch"]);
    }

    #[test]
    fn detects_cycle_and_dangling() {
        let mut nodes = HashMap::new();
        let mut x = ComponentNode::container(id("chk_x"), "LayoutFlex");
        let mut y = ComponentNode::container(id("chk_y"), "LayoutFlex");
        x.parent = id("chk_y");
        y.parent = id("chk_x");
        x.children = Children::Container(vec![id("chk_y"), id("chk_ghost")]);
        y.children = Children::Container(vec![id("chk_x")]);
        nodes.insert(x.id, x);
        nodes.insert(y.id, y);
        let tree = Tree::from_parts(Some(RootNode::default()), nodes);
        assert_eq!(
            rules(&check_tree(&tree, None)),
            vec!["cycle", "dangling-child"]
        );
    }

    #[test]
    fn detects_capability_mismatch() {
        let mut tree = Tree::new();
        // A Button stored as a container.
        tree.insert_child(NodeId::root(), ComponentNode::container(id("chk_btn"), "Button"), None)
            .unwrap();
        let reg = builtin_registry();
        assert_eq!(rules(&check_tree(&tree, Some(&reg))), vec!["capability"]);
        assert!(check_tree(&tree, None).is_empty());
    }

    #[test]
    fn detects_missing_root() {
        let mut nodes = HashMap::new();
        let n = ComponentNode::leaf(id("chk_solo"), "Text");
        nodes.insert(n.id, n);
        let tree = Tree::from_parts(None, nodes);
        let found = rules(&check_tree(&tree, None));
        assert!(found.contains(&"missing-root"));
        assert!(found.contains(&"orphan"));
    }
}
