//! Component registry: what each component type accepts.
//!
//! The editor never reaches for a global table of component types. It is
//! handed something implementing [`ComponentRegistry`], usually the
//! [`StaticRegistry`] returned by [`builtin_registry`].

use crate::model::PropValue;
use crate::template::{ComponentTemplate, builtin_templates};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

// ─── Schema types ────────────────────────────────────────────────────────

/// Declared kind of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropKind {
    Bool,
    Number,
    String,
    /// One of a fixed list of strings.
    Enum { values: SmallVec<[String; 6]> },
    /// List of strings.
    Array,
}

impl PropKind {
    pub fn one_of(values: &[&str]) -> Self {
        PropKind::Enum {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropKind::Bool => "bool",
            PropKind::Number => "number",
            PropKind::String => "string",
            PropKind::Enum { .. } => "enum",
            PropKind::Array => "array",
        }
    }
}

/// One declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSpec {
    #[serde(flatten)]
    pub kind: PropKind,
    pub required: bool,
}

impl PropSpec {
    pub fn required(kind: PropKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    pub fn optional(kind: PropKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }
}

/// Where a component type comes from. Drives the add-component menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentCategory {
    /// Built-in primitives (`Text`).
    Primitive,
    /// Built-in layout containers (`LayoutFlex`, `LayoutGrid`).
    Layout,
    /// Third-party component library.
    Library,
}

/// Everything the registry knows about one component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    pub category: ComponentCategory,
    pub accepts_children: bool,
    pub props: BTreeMap<String, PropSpec>,
}

impl ComponentSchema {
    pub fn new(category: ComponentCategory) -> Self {
        Self {
            category,
            accepts_children: false,
            props: BTreeMap::new(),
        }
    }

    /// Mark the type as able to hold children.
    pub fn with_children(mut self) -> Self {
        self.accepts_children = true;
        self
    }

    pub fn prop(mut self, name: &str, spec: PropSpec) -> Self {
        self.props.insert(name.to_string(), spec);
        self
    }
}

// ─── Registry contract ───────────────────────────────────────────────────

/// Read-only lookup of component types.
pub trait ComponentRegistry {
    fn schema(&self, component_type: &str) -> Option<&ComponentSchema>;

    /// All registered type names, sorted.
    fn component_types(&self) -> Vec<&str>;

    fn supports_children(&self, component_type: &str) -> bool {
        self.schema(component_type)
            .is_some_and(|schema| schema.accepts_children)
    }

    /// Value shown for a required property that has not been set.
    /// Optional properties have no default.
    fn default_value(&self, component_type: &str, prop: &str) -> Option<PropValue> {
        let spec = self.schema(component_type)?.props.get(prop)?;
        if !spec.required {
            return None;
        }
        Some(match &spec.kind {
            PropKind::Bool => PropValue::Bool(false),
            PropKind::Number => PropValue::Number(0.0),
            PropKind::String => PropValue::String("<text>".to_string()),
            PropKind::Enum { values } => PropValue::String(values.first()?.clone()),
            PropKind::Array => PropValue::StringArray(
                ["Item 1", "Item 2", "Item 3"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        })
    }

    /// Multi-node template that replaces a bare node of this type.
    fn template(&self, _component_type: &str) -> Option<&ComponentTemplate> {
        None
    }

    fn is_layout(&self, component_type: &str) -> bool {
        self.schema(component_type)
            .is_some_and(|schema| schema.category == ComponentCategory::Layout)
    }
}

// ─── Static registry ─────────────────────────────────────────────────────

/// A registry built up front and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    schemas: BTreeMap<String, ComponentSchema>,
    templates: HashMap<String, ComponentTemplate>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, component_type: &str, schema: ComponentSchema) -> &mut Self {
        self.schemas.insert(component_type.to_string(), schema);
        self
    }

    pub fn register_template(
        &mut self,
        component_type: &str,
        template: ComponentTemplate,
    ) -> &mut Self {
        self.templates.insert(component_type.to_string(), template);
        self
    }

    /// Type names of one category, sorted.
    pub fn types_in(&self, category: ComponentCategory) -> Vec<&str> {
        self.schemas
            .iter()
            .filter(|(_, schema)| schema.category == category)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl ComponentRegistry for StaticRegistry {
    fn schema(&self, component_type: &str) -> Option<&ComponentSchema> {
        self.schemas.get(component_type)
    }

    fn component_types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    fn template(&self, component_type: &str) -> Option<&ComponentTemplate> {
        self.templates.get(component_type)
    }
}

// ─── Built-in component set ──────────────────────────────────────────────

const FLEX_DIRECTIONS: &[&str] = &["row", "row-reverse", "column", "column-reverse"];
const FLEX_ALIGN: &[&str] = &["flex-start", "center", "flex-end", "stretch", "baseline"];
const FLEX_JUSTIFY: &[&str] = &[
    "flex-start",
    "center",
    "flex-end",
    "space-between",
    "space-around",
    "space-evenly",
];

/// The primitives, layouts, and library components the editor ships with,
/// plus the `Select` and `Table` templates.
pub fn builtin_registry() -> StaticRegistry {
    use ComponentCategory::{Layout, Library, Primitive};
    use PropSpec as P;

    let mut reg = StaticRegistry::new();

    reg.register(
        "Text",
        ComponentSchema::new(Primitive).prop("value", P::required(PropKind::String)),
    );

    reg.register(
        "LayoutFlex",
        ComponentSchema::new(Layout)
            .with_children()
            .prop("flexDirection", P::optional(PropKind::one_of(FLEX_DIRECTIONS)))
            .prop("alignItems", P::optional(PropKind::one_of(FLEX_ALIGN)))
            .prop("justifyContent", P::optional(PropKind::one_of(FLEX_JUSTIFY)))
            .prop("gap", P::optional(PropKind::Number)),
    )
    .register(
        "LayoutGrid",
        ComponentSchema::new(Layout)
            .with_children()
            .prop("gridTemplateRows", P::optional(PropKind::String))
            .prop("gridTemplateColumns", P::optional(PropKind::String))
            .prop("gridTemplateAreas", P::optional(PropKind::String))
            .prop(
                "alignItems",
                P::optional(PropKind::one_of(&[
                    "stretch", "start", "end", "center", "baseline",
                ])),
            )
            .prop(
                "justifyItems",
                P::optional(PropKind::one_of(&["start", "end", "center", "stretch"])),
            )
            .prop("gap", P::optional(PropKind::Number)),
    );

    reg.register(
        "Alert",
        ComponentSchema::new(Library)
            .prop(
                "severity",
                P::required(PropKind::one_of(&["success", "info", "warning", "error"])),
            )
            .prop("content", P::required(PropKind::String)),
    )
    .register(
        "Button",
        ComponentSchema::new(Library)
            .prop("content", P::required(PropKind::String))
            .prop(
                "variant",
                P::optional(PropKind::one_of(&["text", "outlined", "contained"])),
            )
            .prop("disabled", P::optional(PropKind::Bool)),
    )
    .register(
        "Checkbox",
        ComponentSchema::new(Library).prop("defaultChecked", P::optional(PropKind::Bool)),
    )
    .register(
        "List",
        ComponentSchema::new(Library)
            .prop("dense", P::optional(PropKind::Bool))
            .prop("items", P::required(PropKind::Array)),
    )
    .register(
        "Stack",
        ComponentSchema::new(Library)
            .with_children()
            .prop("direction", P::optional(PropKind::one_of(FLEX_DIRECTIONS)))
            .prop("alignItems", P::optional(PropKind::one_of(FLEX_ALIGN)))
            .prop("justifyContent", P::optional(PropKind::one_of(FLEX_JUSTIFY)))
            .prop("spacing", P::optional(PropKind::Number)),
    )
    .register(
        "FormControl",
        ComponentSchema::new(Library)
            .with_children()
            .prop("fullWidth", P::optional(PropKind::Bool)),
    )
    .register("InputLabel", ComponentSchema::new(Library).with_children())
    .register(
        "Select",
        ComponentSchema::new(Library)
            .with_children()
            .prop("value", P::required(PropKind::String)),
    )
    .register(
        "MenuItem",
        ComponentSchema::new(Library)
            .with_children()
            .prop("value", P::optional(PropKind::String)),
    )
    .register(
        "Table",
        ComponentSchema::new(Library)
            .with_children()
            .prop("size", P::optional(PropKind::one_of(&["small", "medium"]))),
    )
    .register("TableHead", ComponentSchema::new(Library).with_children())
    .register("TableBody", ComponentSchema::new(Library).with_children())
    .register("TableRow", ComponentSchema::new(Library).with_children())
    .register(
        "TableCell",
        ComponentSchema::new(Library)
            .with_children()
            .prop(
                "align",
                P::optional(PropKind::one_of(&["left", "center", "right"])),
            ),
    );

    for (name, template) in builtin_templates() {
        reg.register_template(name, template);
    }

    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_capability() {
        let reg = builtin_registry();
        assert!(reg.supports_children("LayoutFlex"));
        assert!(reg.supports_children("TableCell"));
        assert!(!reg.supports_children("Button"));
        assert!(!reg.supports_children("Text"));
        assert!(!reg.supports_children("NoSuchThing"));
    }

    #[test]
    fn required_defaults() {
        let reg = builtin_registry();
        assert_eq!(
            reg.default_value("Text", "value"),
            Some(PropValue::String("<text>".into()))
        );
        assert_eq!(
            reg.default_value("Alert", "severity"),
            Some(PropValue::String("success".into()))
        );
        assert_eq!(
            reg.default_value("List", "items"),
            Some(PropValue::StringArray(vec![
                "Item 1".into(),
                "Item 2".into(),
                "Item 3".into()
            ]))
        );
        // Optional props have no default.
        assert_eq!(reg.default_value("Button", "disabled"), None);
        assert_eq!(reg.default_value("Button", "missing"), None);
    }

    #[test]
    fn categories_and_layouts() {
        let reg = builtin_registry();
        assert_eq!(reg.types_in(ComponentCategory::Primitive), vec!["Text"]);
        assert_eq!(
            reg.types_in(ComponentCategory::Layout),
            vec!["LayoutFlex", "LayoutGrid"]
        );
        assert!(reg.is_layout("LayoutGrid"));
        assert!(!reg.is_layout("Stack"));
    }

    #[test]
    fn templates_are_registered() {
        let reg = builtin_registry();
        assert_eq!(
            reg.template("Select").map(|t| t.component_type.as_str()),
            Some("FormControl")
        );
        assert!(reg.template("Table").is_some());
        assert!(reg.template("Button").is_none());
    }

    #[test]
    fn schema_serializes_with_flattened_kind() {
        let reg = builtin_registry();
        let json = serde_json::to_value(reg.schema("Text").unwrap()).unwrap();
        assert_eq!(json["props"]["value"]["kind"], "string");
        assert_eq!(json["props"]["value"]["required"], true);
        assert_eq!(json["acceptsChildren"], false);
    }
}
