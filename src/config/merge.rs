//! Deep merge of configuration layers.
//!
//! Later layers override earlier ones field by field. Arrays are replaced
//! entirely, not concatenated, so a layer that sets `search_backends` replaces
//! the whole selection.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use latz::config::deep_merge;
///
/// let home = json!({
///     "search_backends": ["unsplash"],
///     "search_backend_settings": { "placeholder": { "type": "bear" } }
/// });
/// let cwd = json!({ "search_backends": ["placeholder"] });
///
/// assert_eq!(
///     deep_merge(home, cwd),
///     json!({
///         "search_backends": ["placeholder"],
///         "search_backend_settings": { "placeholder": { "type": "bear" } }
///     })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge layers in order, later layers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
