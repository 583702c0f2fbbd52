//! Property helpers for the editing form: presentation defaults and
//! schema checks on writes.

use crate::error::PropError;
use crate::model::{ComponentNode, PropValue, Props};
use crate::registry::{ComponentRegistry, PropKind};

/// Props as they should be presented: stored values, plus registry
/// defaults for required props that were never set. Never persisted.
pub fn resolve_props(registry: &dyn ComponentRegistry, node: &ComponentNode) -> Props {
    let mut resolved = node.props.clone();
    if let Some(schema) = registry.schema(&node.component_type) {
        for name in schema.props.keys() {
            if resolved.contains_key(name) {
                continue;
            }
            if let Some(default) = registry.default_value(&node.component_type, name) {
                resolved.insert(name.clone(), default);
            }
        }
    }
    resolved
}

/// Check that `value` may be stored under `prop` for `component_type`.
pub fn validate_prop(
    registry: &dyn ComponentRegistry,
    component_type: &str,
    prop: &str,
    value: &PropValue,
) -> Result<(), PropError> {
    let schema = registry
        .schema(component_type)
        .ok_or_else(|| PropError::UnknownComponent(component_type.to_string()))?;
    let spec = schema
        .props
        .get(prop)
        .ok_or_else(|| PropError::UnknownProp {
            component: component_type.to_string(),
            prop: prop.to_string(),
        })?;

    let kind_matches = matches!(
        (&spec.kind, value),
        (PropKind::Bool, PropValue::Bool(_))
            | (PropKind::Number, PropValue::Number(_))
            | (PropKind::String, PropValue::String(_))
            | (PropKind::Enum { .. }, PropValue::String(_))
            | (PropKind::Array, PropValue::StringArray(_))
    );
    if !kind_matches {
        return Err(PropError::WrongKind {
            prop: prop.to_string(),
            expected: spec.kind.name(),
            found: value.kind_name(),
        });
    }

    if let PropValue::Number(n) = value
        && !n.is_finite()
    {
        return Err(PropError::NotFinite {
            prop: prop.to_string(),
        });
    }

    if let (PropKind::Enum { values }, PropValue::String(s)) = (&spec.kind, value)
        && !values.iter().any(|v| v == s)
    {
        return Err(PropError::NotAllowed {
            prop: prop.to_string(),
            value: s.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::registry::builtin_registry;

    #[test]
    fn resolve_fills_required_only() {
        let reg = builtin_registry();
        let mut alert = ComponentNode::leaf(NodeId::intern("alert"), "Alert");
        alert.props.insert("content".into(), "Saved".into());

        let props = resolve_props(&reg, &alert);
        assert_eq!(props.get("content"), Some(&PropValue::from("Saved")));
        assert_eq!(props.get("severity"), Some(&PropValue::from("success")));
        // Stored props are untouched.
        assert_eq!(alert.props.len(), 1);

        let button = ComponentNode::leaf(NodeId::intern("btn"), "Button");
        let props = resolve_props(&reg, &button);
        assert!(props.contains_key("content"));
        assert!(!props.contains_key("disabled"));
    }

    #[test]
    fn resolve_unknown_type_keeps_stored() {
        let reg = builtin_registry();
        let mut node = ComponentNode::leaf(NodeId::intern("odd"), "Mystery");
        node.props.insert("x".into(), PropValue::Number(1.0));
        assert_eq!(resolve_props(&reg, &node), node.props);
    }

    #[test]
    fn validate_checks_kind_and_enum() {
        let reg = builtin_registry();
        assert!(validate_prop(&reg, "LayoutFlex", "gap", &PropValue::Number(8.0)).is_ok());
        assert!(validate_prop(&reg, "LayoutFlex", "flexDirection", &"column".into()).is_ok());
        assert_eq!(
            validate_prop(&reg, "LayoutFlex", "flexDirection", &"diagonal".into()),
            Err(PropError::NotAllowed {
                prop: "flexDirection".into(),
                value: "diagonal".into()
            })
        );
        assert_eq!(
            validate_prop(&reg, "LayoutFlex", "gap", &"8px".into()),
            Err(PropError::WrongKind {
                prop: "gap".into(),
                expected: "number",
                found: "string"
            })
        );
        assert!(matches!(
            validate_prop(&reg, "LayoutFlex", "color", &"red".into()),
            Err(PropError::UnknownProp { .. })
        ));
        assert!(matches!(
            validate_prop(&reg, "Nope", "x", &PropValue::Bool(true)),
            Err(PropError::UnknownComponent(_))
        ));
    }

    #[test]
    fn validate_rejects_non_finite_numbers() {
        let reg = builtin_registry();
        for n in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(
                validate_prop(&reg, "LayoutFlex", "gap", &PropValue::Number(n)),
                Err(PropError::NotFinite { prop: "gap".into() })
            );
        }
        assert!(validate_prop(&reg, "LayoutFlex", "gap", &PropValue::Number(-0.5)).is_ok());
    }
}
