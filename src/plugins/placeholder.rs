//! Offline backend returning fixed placeholder image links.
//!
//! Useful for trying the tool without API credentials and for tests.

use super::{BackendDescriptor, BackendError, SearchBackend};
use crate::config::{Configuration, FieldSpec, SchemaFragment};
use crate::image::{SearchResult, SearchResultSet};
use async_trait::async_trait;
use serde::Deserialize;

pub const PLUGIN_NAME: &str = "placeholder";

/// Image sizes returned for every query.
const SIZES: [(u32, u32); 3] = [(200, 300), (600, 500), (1000, 800)];

#[derive(Debug, Clone, Deserialize)]
struct PlaceholderSettings {
    #[serde(rename = "type", default = "default_type")]
    kind: String,
}

fn default_type() -> String {
    "kitten".to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

impl PlaceholderBackend {
    fn results(kind: &str) -> Vec<SearchResult> {
        let base_url = format!("https://place{}.com", kind.to_lowercase());
        SIZES
            .iter()
            .map(|&(width, height)| SearchResult {
                url: format!("{base_url}/{width}/{height}"),
                width: Some(width),
                height: Some(height),
                backend_name: PLUGIN_NAME.to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchBackend for PlaceholderBackend {
    async fn search(
        &self,
        _client: &reqwest::Client,
        config: &Configuration,
        _query: &str,
    ) -> Result<SearchResultSet, BackendError> {
        let settings: PlaceholderSettings = config
            .backend_settings_as(PLUGIN_NAME)
            .map_err(|err| BackendError::Settings(err.to_string()))?;

        let results = Self::results(&settings.kind);
        let total = results.len() as u64;
        Ok(SearchResultSet::new(PLUGIN_NAME, results).with_total(Some(total)))
    }
}

pub fn config_fields() -> SchemaFragment {
    SchemaFragment::new().with_field(
        FieldSpec::choice("type", &["bear", "kitten"], "kitten")
            .with_description("The type of placeholder image links to use"),
    )
}

pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor::new(PLUGIN_NAME, PlaceholderBackend, config_fields())
}
