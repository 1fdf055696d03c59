//! Dotted-path editing of configuration (`config set a.b.c=value`).
//!
//! Tokens are parsed and resolved against the composite schema into a single
//! nested patch. The patch is merged into the current configuration's raw data
//! and the result revalidated as a whole; if anything fails, nothing applies.

use super::merge::deep_merge;
use super::schema::{CompositeSchema, FieldType};
use super::types::Configuration;
use crate::error::{BadInputError, LatzError, ValidationError};
use crate::plugins::PluginRegistry;
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Separator for list-typed fields given as text.
pub const LIST_SEPARATOR: char = ',';

/// Split list text on [`LIST_SEPARATOR`], trimming items and dropping empty ones.
pub fn split_list(raw: &str) -> Value {
    Value::Array(
        raw.split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?s)^([A-Za-z._]+)=(.*)$").ok())
        .as_ref()
}

/// One parsed `path=value` token.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEdit {
    pub path: String,
    pub value: Value,
}

impl ConfigEdit {
    /// Expand into a nested patch: `a.b.c` + `v` becomes `{a: {b: {c: v}}}`.
    pub fn to_patch(&self) -> NestedPatch {
        let value = self
            .path
            .rsplit('.')
            .fold(self.value.clone(), |inner, key| {
                let mut map = Map::new();
                map.insert(key.to_string(), inner);
                Value::Object(map)
            });
        NestedPatch(value)
    }
}

/// A nested object produced from one or more edits.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedPatch(Value);

impl NestedPatch {
    pub fn empty() -> Self {
        NestedPatch(Value::Object(Map::new()))
    }

    /// Merge `other` into this patch; `other` wins on conflict.
    pub fn merge(self, other: NestedPatch) -> Self {
        NestedPatch(deep_merge(self.0, other.0))
    }

    /// Apply this patch on top of `data`, returning the patched copy.
    pub fn apply_to(&self, data: &Map<String, Value>) -> Value {
        deep_merge(Value::Object(data.clone()), self.0.clone())
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Value::Object(map) if map.is_empty())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Why an edit was refused.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    BadInput(#[from] BadInputError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<EditError> for LatzError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::BadInput(err) => LatzError::BadInput(err),
            EditError::Validation(err) => LatzError::from(err),
        }
    }
}

/// Applies `path=value` tokens to a configuration.
#[derive(Debug, Clone, Copy)]
pub struct DottedPathEditor<'a> {
    schema: &'a CompositeSchema,
    registry: &'a PluginRegistry,
}

impl<'a> DottedPathEditor<'a> {
    pub fn new(schema: &'a CompositeSchema, registry: &'a PluginRegistry) -> Self {
        Self { schema, registry }
    }

    /// Parse a single token and coerce its value by the field's declared type.
    pub fn parse_token(&self, token: &str) -> Result<ConfigEdit, BadInputError> {
        let captures = token_pattern()
            .and_then(|re| re.captures(token))
            .ok_or_else(|| BadInputError::MalformedToken(token.to_string()))?;
        let path = &captures[1];
        let raw = &captures[2];

        let field = self
            .schema
            .resolve(path)
            .map_err(|_| BadInputError::UnknownParameter(path.to_string()))?;

        let value = match &field.ty {
            FieldType::Object(_) => return Err(BadInputError::UnknownParameter(path.to_string())),
            ty if ty.is_sequence() => split_list(raw),
            _ => Value::String(raw.to_string()),
        };

        Ok(ConfigEdit {
            path: path.to_string(),
            value,
        })
    }

    /// Parse every token into one patch. Later tokens win on conflict.
    pub fn build_patch<S: AsRef<str>>(&self, tokens: &[S]) -> Result<NestedPatch, BadInputError> {
        if tokens.is_empty() {
            return Err(BadInputError::NoValues);
        }
        tokens.iter().try_fold(NestedPatch::empty(), |patch, token| {
            let edit = self.parse_token(token.as_ref())?;
            Ok(patch.merge(edit.to_patch()))
        })
    }

    /// Merge `patch` into `current` and revalidate.
    ///
    /// On failure `current` is untouched and the validation error is returned.
    pub fn apply_patch(
        &self,
        current: &Configuration,
        patch: &NestedPatch,
    ) -> Result<Configuration, ValidationError> {
        let patched = patch.apply_to(current.explicit());
        self.schema.validate(&patched, self.registry)
    }

    /// Parse `tokens` and apply them to `current` all-or-nothing.
    pub fn apply<S: AsRef<str>>(
        &self,
        current: &Configuration,
        tokens: &[S],
    ) -> Result<Configuration, EditError> {
        let patch = self.build_patch(tokens)?;
        Ok(self.apply_patch(current, &patch)?)
    }
}
