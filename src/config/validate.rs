//! Validation of raw configuration documents against the composite schema.
//!
//! Validation both checks and normalizes: text is coerced to the declared
//! scalar type, a bare string becomes a one-element list, and duplicate list
//! entries are dropped. The output contains only the keys present in the
//! input; defaults are applied separately.

use super::schema::{CompositeSchema, FieldSpec, FieldType, SchemaFragment};
use super::types::Configuration;
use super::merge::deep_merge;
use crate::error::{FieldError, ValidationError};
use crate::plugins::PluginRegistry;
use serde_json::{Map, Value};

impl CompositeSchema {
    /// Check a raw document and return its normalized explicit fields.
    pub fn normalize(
        &self,
        raw: &Value,
        registry: &PluginRegistry,
    ) -> Result<Map<String, Value>, ValidationError> {
        let mut errors = Vec::new();
        let normalized = match raw {
            Value::Object(map) => check_object(self.root(), map, "", registry, &mut errors),
            other => {
                errors.push(
                    FieldError::new("", "value is not a valid object").with_given(describe(other)),
                );
                Map::new()
            }
        };

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError::new(errors))
        }
    }

    /// Validate a raw document and build a [`Configuration`] with defaults applied.
    pub fn validate(
        &self,
        raw: &Value,
        registry: &PluginRegistry,
    ) -> Result<Configuration, ValidationError> {
        let explicit = self.normalize(raw, registry)?;
        let values = deep_merge(self.defaults(), Value::Object(explicit.clone()));
        match values {
            Value::Object(values) => Ok(Configuration::new(values, explicit)),
            other => Err(ValidationError::new(vec![
                FieldError::new("", "value is not a valid object").with_given(describe(&other)),
            ])),
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_object(
    fragment: &SchemaFragment,
    map: &Map<String, Value>,
    prefix: &str,
    registry: &PluginRegistry,
    errors: &mut Vec<FieldError>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        let path = join_path(prefix, key);
        let Some(field) = fragment.field(key) else {
            errors.push(FieldError::new(path, "extra fields not permitted"));
            continue;
        };
        if let Some(checked) = check_field(field, value, &path, registry, errors) {
            out.insert(key.clone(), checked);
        }
    }
    out
}

fn check_field(
    field: &FieldSpec,
    value: &Value,
    path: &str,
    registry: &PluginRegistry,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    if value.is_null() {
        errors.push(FieldError::new(path, "none is not an allowed value"));
        return None;
    }

    let result = match &field.ty {
        FieldType::String => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(FieldError::new(path, "str type expected").with_given(describe(other))),
        },
        FieldType::Integer { min } => coerce_integer(value, path).and_then(|n| match min {
            Some(min) if n < *min => Err(FieldError::new(
                path,
                format!("ensure this value is greater than or equal to {min}"),
            )
            .with_given(n.to_string())),
            _ => Ok(Value::from(n)),
        }),
        FieldType::Boolean => coerce_bool(value, path).map(Value::Bool),
        FieldType::Choice(permitted) => check_choice(value, permitted, path),
        FieldType::StringList => coerce_string_list(value, path).map(Value::from),
        FieldType::BackendList => coerce_string_list(value, path).and_then(|names| {
            match registry.validate_selection(names.as_slice()) {
                Ok(()) => Ok(Value::from(names)),
                Err(err) => Err(FieldError::new(path, err.to_string())
                    .with_given(err.invalid.join(", "))
                    .with_permitted(err.permitted)),
            }
        }),
        FieldType::Object(inner) => match value {
            Value::Object(map) => {
                return Some(Value::Object(check_object(inner, map, path, registry, errors)));
            }
            other => {
                Err(FieldError::new(path, "value is not a valid dict").with_given(describe(other)))
            }
        },
    };

    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}

fn coerce_integer(value: &Value, path: &str) -> Result<i64, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        FieldError::new(path, "value is not a valid integer").with_given(describe(value))
    })
}

fn coerce_bool(value: &Value, path: &str) -> Result<bool, FieldError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| {
        FieldError::new(path, "value could not be parsed to a boolean").with_given(describe(value))
    })
}

fn check_choice(value: &Value, permitted: &[String], path: &str) -> Result<Value, FieldError> {
    let quoted: Vec<String> = permitted.iter().map(|p| format!("'{p}'")).collect();
    match value {
        Value::String(s) if permitted.iter().any(|p| p == s) => Ok(value.clone()),
        other => Err(FieldError::new(
            path,
            format!("unexpected value; permitted: {}", quoted.join(", ")),
        )
        .with_given(describe(other))
        .with_permitted(permitted.to_vec())),
    }
}

fn coerce_string_list(value: &Value, path: &str) -> Result<Vec<String>, FieldError> {
    let items: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        return Err(FieldError::new(format!("{path}.{i}"), "str type expected")
                            .with_given(describe(other)));
                    }
                }
            }
            out
        }
        other => {
            return Err(
                FieldError::new(path, "value is not a valid list").with_given(describe(other))
            );
        }
    };

    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    Ok(unique)
}

/// Short human rendering of a JSON value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins;
    use serde_json::json;

    fn fixture() -> (PluginRegistry, CompositeSchema) {
        let registry = PluginRegistry::from_descriptors(plugins::builtin()).unwrap();
        let schema = CompositeSchema::from_registry(&registry);
        (registry, schema)
    }

    #[test]
    fn normalize_keeps_only_explicit_keys() {
        let (registry, schema) = fixture();
        let explicit = schema
            .normalize(&json!({"search_backends": ["placeholder"]}), &registry)
            .unwrap();
        assert_eq!(Value::Object(explicit), json!({"search_backends": ["placeholder"]}));
    }

    #[test]
    fn validate_applies_defaults() {
        let (registry, schema) = fixture();
        let config = schema
            .validate(
                &json!({"search_backend_settings": {"placeholder": {"type": "bear"}}}),
                &registry,
            )
            .unwrap();
        assert_eq!(config.search_backends(), vec!["unsplash"]);
        assert_eq!(config.results_per_page(), 10);
        assert_eq!(
            config.get("search_backend_settings.placeholder.type"),
            Some(&json!("bear"))
        );
        assert_eq!(
            config.get("search_backend_settings.unsplash.access_key"),
            Some(&json!(""))
        );
    }

    #[test]
    fn unknown_backend_names_the_field_and_choices() {
        let (registry, schema) = fixture();
        let err = schema
            .validate(&json!({"search_backends": ["does_not_exist"]}), &registry)
            .unwrap_err();

        assert_eq!(err.paths(), vec!["search_backends"]);
        let field = &err.errors[0];
        assert!(field
            .message
            .contains("'does_not_exist' is not a valid choice for a search backend"));
        assert_eq!(field.given.as_deref(), Some("does_not_exist"));
        assert_eq!(
            field.permitted.as_deref(),
            Some(&["unsplash".to_string(), "placeholder".to_string()][..])
        );
    }

    #[test]
    fn extra_fields_are_rejected_at_every_level() {
        let (registry, schema) = fixture();
        let err = schema
            .validate(
                &json!({
                    "does_not_exist": 1,
                    "search_backend_settings": {
                        "flickr": {},
                        "placeholder": {"size": 3}
                    }
                }),
                &registry,
            )
            .unwrap_err();

        let mut paths = err.paths();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "does_not_exist",
                "search_backend_settings.flickr",
                "search_backend_settings.placeholder.size",
            ]
        );
        assert!(err.errors.iter().all(|e| e.message == "extra fields not permitted"));
    }

    #[test]
    fn text_is_coerced_to_declared_types() {
        let (registry, schema) = fixture();
        let explicit = schema
            .normalize(
                &json!({"results_per_page": "25", "search_backends": "placeholder"}),
                &registry,
            )
            .unwrap();
        assert_eq!(explicit["results_per_page"], json!(25));
        assert_eq!(explicit["search_backends"], json!(["placeholder"]));
    }

    #[test]
    fn type_mismatches_are_reported() {
        let (registry, schema) = fixture();
        let err = schema
            .validate(
                &json!({
                    "results_per_page": "many",
                    "search_backend_settings": {"placeholder": {"type": "cat"}}
                }),
                &registry,
            )
            .unwrap_err();

        let mut paths = err.paths();
        paths.sort();
        assert_eq!(
            paths,
            vec!["results_per_page", "search_backend_settings.placeholder.type"]
        );
    }

    #[test]
    fn results_per_page_lower_bound() {
        let (registry, schema) = fixture();
        let err = schema
            .validate(&json!({"results_per_page": 0}), &registry)
            .unwrap_err();
        assert!(err.errors[0].message.contains("greater than or equal to 1"));
    }

    #[test]
    fn large_results_per_page_saturates() {
        let (registry, schema) = fixture();
        let config = schema
            .validate(&json!({"results_per_page": 5_000_000_000_i64}), &registry)
            .unwrap();
        assert_eq!(config.results_per_page(), u32::MAX);
    }

    #[test]
    fn null_and_non_object_documents_fail() {
        let (registry, schema) = fixture();
        assert!(schema.validate(&json!({"results_per_page": null}), &registry).is_err());
        assert!(schema.validate(&json!([]), &registry).is_err());
        assert!(schema
            .validate(&json!({"search_backend_settings": "x"}), &registry)
            .is_err());
    }

    #[test]
    fn duplicate_selection_is_collapsed() {
        let (registry, schema) = fixture();
        let config = schema
            .validate(
                &json!({"search_backends": ["placeholder", "unsplash", "placeholder"]}),
                &registry,
            )
            .unwrap();
        assert_eq!(config.search_backends(), vec!["placeholder", "unsplash"]);
    }

    #[test]
    fn non_string_list_items_are_located() {
        let (registry, schema) = fixture();
        let err = schema
            .validate(&json!({"search_backends": ["placeholder", 3]}), &registry)
            .unwrap_err();
        assert_eq!(err.paths(), vec!["search_backends.1"]);
    }

    #[test]
    fn boolean_coercion() {
        assert_eq!(coerce_bool(&json!("Yes"), "f").unwrap(), true);
        assert_eq!(coerce_bool(&json!(0), "f").unwrap(), false);
        assert!(coerce_bool(&json!("maybe"), "f").is_err());
    }
}
