//! Configuration schema: field types, plugin fragments and the composite schema.
//!
//! The composite schema is built once at startup from the base application
//! fields and one fragment per registered backend. Backend fragments live under
//! the reserved [`SEARCH_BACKEND_SETTINGS_KEY`] object, keyed by backend name,
//! so the set of legal paths is fixed and enumerable after composition.

use crate::plugins::{BackendDescriptor, PluginRegistry};
use serde_json::{Map, Value, json};
use std::fmt;

/// Selected backend names.
pub const SEARCH_BACKENDS_KEY: &str = "search_backends";

/// Object holding one settings block per registered backend.
pub const SEARCH_BACKEND_SETTINGS_KEY: &str = "search_backend_settings";

/// Page size handed to backends that page their results.
pub const RESULTS_PER_PAGE_KEY: &str = "results_per_page";

pub const DEFAULT_RESULTS_PER_PAGE: i64 = 10;

/// Declared type of a configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// Integer with an optional inclusive lower bound.
    Integer { min: Option<i64> },
    Boolean,
    /// A string restricted to a fixed set of values.
    Choice(Vec<String>),
    StringList,
    /// A list of registered backend names.
    BackendList,
    Object(SchemaFragment),
}

impl FieldType {
    /// Whether text input for this field is split into several elements.
    pub fn is_sequence(&self) -> bool {
        matches!(self, FieldType::StringList | FieldType::BackendList)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldType::Object(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer { .. } => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Choice(values) => write!(f, "one of {}", values.join("|")),
            FieldType::StringList => write!(f, "list of strings"),
            FieldType::BackendList => write!(f, "list of backend names"),
            FieldType::Object(_) => write!(f, "object"),
        }
    }
}

/// One named field with its type and default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub default: Value,
    pub description: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, FieldType::String, Value::String(default.to_string()))
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, FieldType::Integer { min: None }, json!(default))
    }

    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FieldType::Boolean, Value::Bool(default))
    }

    pub fn choice(name: impl Into<String>, permitted: &[&str], default: &str) -> Self {
        let permitted = permitted.iter().map(|p| p.to_string()).collect();
        Self::new(
            name,
            FieldType::Choice(permitted),
            Value::String(default.to_string()),
        )
    }

    pub fn string_list(name: impl Into<String>, default: &[&str]) -> Self {
        Self::new(name, FieldType::StringList, json!(default))
    }

    /// A nested object whose default is the fragment's own defaults.
    pub fn object(name: impl Into<String>, fragment: SchemaFragment) -> Self {
        let default = fragment.defaults();
        Self::new(name, FieldType::Object(fragment), default)
    }

    pub fn with_min(mut self, min: i64) -> Self {
        if let FieldType::Integer { min: ref mut bound } = self.ty {
            *bound = Some(min);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An ordered set of fields. Backends describe their settings with one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaFragment {
    fields: Vec<FieldSpec>,
}

impl SchemaFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier field with the same name.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The all-defaults object for this fragment.
    pub fn defaults(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        Value::Object(map)
    }
}

/// A dotted path did not resolve to a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNotFound(pub String);

impl fmt::Display for FieldNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field not found: {}", self.0)
    }
}

impl std::error::Error for FieldNotFound {}

/// Base fields plus every backend's settings fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSchema {
    root: SchemaFragment,
}

impl CompositeSchema {
    /// Compose `base` with the settings fragment of each descriptor.
    pub fn compose<'a>(
        base: SchemaFragment,
        descriptors: impl IntoIterator<Item = &'a BackendDescriptor>,
    ) -> Self {
        let settings = descriptors
            .into_iter()
            .fold(SchemaFragment::new(), |fragment, descriptor| {
                fragment.with_field(FieldSpec::object(
                    descriptor.name(),
                    descriptor.config_fields().clone(),
                ))
            });

        let root = base.with_field(
            FieldSpec::object(SEARCH_BACKEND_SETTINGS_KEY, settings)
                .with_description("Settings for each registered search backend"),
        );
        Self { root }
    }

    /// Compose the application's base fields with every registered backend.
    pub fn from_registry(registry: &PluginRegistry) -> Self {
        Self::compose(base_fields(registry), registry.descriptors())
    }

    pub fn root(&self) -> &SchemaFragment {
        &self.root
    }

    /// The all-defaults configuration document.
    pub fn defaults(&self) -> Value {
        self.root.defaults()
    }

    /// Resolve a dotted path such as `search_backend_settings.placeholder.type`.
    pub fn resolve(&self, path: &str) -> Result<&FieldSpec, FieldNotFound> {
        let not_found = || FieldNotFound(path.to_string());

        let mut fragment = &self.root;
        let mut parts = path.split('.').peekable();
        while let Some(part) = parts.next() {
            let field = fragment.field(part).ok_or_else(not_found)?;
            if parts.peek().is_none() {
                return Ok(field);
            }
            match &field.ty {
                FieldType::Object(inner) => fragment = inner,
                _ => return Err(not_found()),
            }
        }
        Err(not_found())
    }

    /// Every settable leaf path with its type, in declaration order.
    pub fn leaf_paths(&self) -> Vec<(String, &FieldType)> {
        fn walk<'a>(
            prefix: &str,
            fragment: &'a SchemaFragment,
            out: &mut Vec<(String, &'a FieldType)>,
        ) {
            for field in fragment.fields() {
                let path = if prefix.is_empty() {
                    field.name.clone()
                } else {
                    format!("{prefix}.{}", field.name)
                };
                match &field.ty {
                    FieldType::Object(inner) => walk(&path, inner, out),
                    ty => out.push((path, ty)),
                }
            }
        }

        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }
}

/// Application fields that exist regardless of which backends are registered.
///
/// The default selection is the first registered backend.
pub fn base_fields(registry: &PluginRegistry) -> SchemaFragment {
    let default_backends: Vec<&str> = registry.names().into_iter().take(1).collect();

    SchemaFragment::new()
        .with_field(
            FieldSpec::new(
                SEARCH_BACKENDS_KEY,
                FieldType::BackendList,
                json!(default_backends),
            )
            .with_description("Image search backends to use for retrieving images"),
        )
        .with_field(
            FieldSpec::integer(RESULTS_PER_PAGE_KEY, DEFAULT_RESULTS_PER_PAGE)
                .with_min(1)
                .with_description("Number of results requested from each backend"),
        )
}
