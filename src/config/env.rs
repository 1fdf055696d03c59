//! Environment variable overrides (`LATZ_*`), the last configuration layer.
//!
//! `LATZ_RESULTS_PER_PAGE=20` sets `results_per_page`. A double underscore
//! descends into nested objects, so
//! `LATZ_SEARCH_BACKEND_SETTINGS__UNSPLASH__ACCESS_KEY` sets
//! `search_backend_settings.unsplash.access_key`. Names are matched
//! case-insensitively and variables naming no settable field (`LATZ_HOME`,
//! `LATZ_LOG`) are ignored.

use super::editor::{ConfigEdit, NestedPatch, split_list};
use super::schema::CompositeSchema;
use serde_json::Value;
use tracing::{debug, trace};

pub const ENV_PREFIX: &str = "LATZ_";

/// Separates nesting levels inside one variable name.
pub const ENV_NESTED_DELIMITER: &str = "__";

/// Source name used when rendering errors of the environment layer.
pub const ENV_SOURCE: &str = "environment";

/// Dotted configuration path named by an environment variable, if it has the prefix.
pub fn env_var_path(name: &str) -> Option<String> {
    let prefix = name.get(..ENV_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
        return None;
    }
    let rest = &name[ENV_PREFIX.len()..];
    if rest.is_empty() {
        return None;
    }
    let parts: Vec<String> = rest
        .split(ENV_NESTED_DELIMITER)
        .map(str::to_ascii_lowercase)
        .collect();
    Some(parts.join("."))
}

/// `LATZ_*` variables of the running process.
pub fn env_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(name, _)| env_var_path(name).is_some())
        .collect()
}

/// Collect the overrides in `vars` into one nested patch.
///
/// Values are raw text; list fields are split on the list separator and the
/// rest is left for validation to coerce.
pub fn env_patch<K, V>(schema: &CompositeSchema, vars: &[(K, V)]) -> NestedPatch
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    vars.iter().fold(NestedPatch::empty(), |patch, (name, raw)| {
        let name = name.as_ref();
        let Some(path) = env_var_path(name) else {
            return patch;
        };
        let field = match schema.resolve(&path) {
            Ok(field) if !field.ty.is_object() => field,
            _ => {
                trace!(var = name, "Ignoring environment variable");
                return patch;
            }
        };

        let value = if field.ty.is_sequence() {
            split_list(raw.as_ref())
        } else {
            Value::String(raw.as_ref().to_string())
        };
        debug!(var = name, path = %path, "Configuration override from environment");
        patch.merge(ConfigEdit { path, value }.to_patch())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{self, PluginRegistry};
    use serde_json::json;

    fn schema() -> CompositeSchema {
        let registry = PluginRegistry::from_descriptors(plugins::builtin()).unwrap();
        CompositeSchema::from_registry(&registry)
    }

    #[test]
    fn var_names_map_to_paths() {
        assert_eq!(
            env_var_path("LATZ_RESULTS_PER_PAGE").as_deref(),
            Some("results_per_page")
        );
        assert_eq!(
            env_var_path("LATZ_SEARCH_BACKEND_SETTINGS__UNSPLASH__ACCESS_KEY").as_deref(),
            Some("search_backend_settings.unsplash.access_key")
        );
        assert_eq!(
            env_var_path("latz_search_backends").as_deref(),
            Some("search_backends")
        );
        assert_eq!(env_var_path("LATZ_"), None);
        assert_eq!(env_var_path("PATH"), None);
        assert_eq!(env_var_path("LAT"), None);
    }

    #[test]
    fn patch_splits_lists_and_nests_settings() {
        let patch = env_patch(
            &schema(),
            &[
                ("LATZ_SEARCH_BACKENDS", "placeholder, unsplash"),
                ("LATZ_SEARCH_BACKEND_SETTINGS__PLACEHOLDER__TYPE", "bear"),
                ("LATZ_RESULTS_PER_PAGE", "4"),
            ],
        );
        assert_eq!(
            patch.into_value(),
            json!({
                "search_backends": ["placeholder", "unsplash"],
                "search_backend_settings": {"placeholder": {"type": "bear"}},
                "results_per_page": "4"
            })
        );
    }

    #[test]
    fn unrelated_and_object_vars_are_ignored() {
        let patch = env_patch(
            &schema(),
            &[
                ("LATZ_HOME", "/tmp"),
                ("LATZ_LOG", "debug"),
                ("LATZ_SEARCH_BACKEND_SETTINGS__UNSPLASH", "x"),
                ("HOME", "/root"),
            ],
        );
        assert!(patch.is_empty());
    }
}
