//! The validated configuration value.

use super::schema::{
    DEFAULT_RESULTS_PER_PAGE, RESULTS_PER_PAGE_KEY, SEARCH_BACKEND_SETTINGS_KEY,
    SEARCH_BACKENDS_KEY,
};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A configuration document that passed validation against the composite schema.
///
/// Instances are only produced by [`CompositeSchema::validate`] and are never
/// mutated; every change yields a new instance.
///
/// [`CompositeSchema::validate`]: super::CompositeSchema::validate
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Every field, with defaults applied.
    values: Map<String, Value>,
    /// Only the fields the source actually set (normalized).
    explicit: Map<String, Value>,
}

impl Configuration {
    pub(crate) fn new(values: Map<String, Value>, explicit: Map<String, Value>) -> Self {
        Self { values, explicit }
    }

    /// Selected backend names, in configured order.
    pub fn search_backends(&self) -> Vec<&str> {
        self.values
            .get(SEARCH_BACKENDS_KEY)
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Page size; values beyond `u32::MAX` saturate.
    pub fn results_per_page(&self) -> u32 {
        self.values
            .get(RESULTS_PER_PAGE_KEY)
            .and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(DEFAULT_RESULTS_PER_PAGE as u32)
    }

    /// Raw settings block for one backend.
    pub fn backend_settings(&self, backend: &str) -> Option<&Value> {
        self.values
            .get(SEARCH_BACKEND_SETTINGS_KEY)
            .and_then(|settings| settings.get(backend))
    }

    /// Deserialize one backend's settings block into its typed form.
    pub fn backend_settings_as<T: DeserializeOwned>(
        &self,
        backend: &str,
    ) -> Result<T, serde_json::Error> {
        let block = self
            .backend_settings(backend)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        serde_json::from_value(block)
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.values.get(first)?, |value, part| value.get(part))
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The fields explicitly set by the source layers.
    pub fn explicit(&self) -> &Map<String, Value> {
        &self.explicit
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Indented JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> String {
        let mut out = serde_json::to_string_pretty(&self.values).unwrap_or_else(|_| "{}".into());
        out.push('\n');
        out
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
