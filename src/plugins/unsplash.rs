//! Unsplash photo search backend (<https://unsplash.com/documentation>).

use super::{BackendDescriptor, BackendError, SearchBackend};
use crate::config::{Configuration, FieldSpec, SchemaFragment};
use crate::image::{SearchResult, SearchResultSet};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

pub const PLUGIN_NAME: &str = "unsplash";

pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";
const SEARCH_PATH: &str = "/search/photos";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct UnsplashSettings {
    access_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total: Option<u64>,
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    links: PhotoLinks,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoLinks {
    download: Option<String>,
}

/// Searches photos through the Unsplash REST API.
#[derive(Debug, Clone)]
pub struct UnsplashBackend {
    base_url: String,
}

impl Default for UnsplashBackend {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl UnsplashBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the backend at another API host (used against mock servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{SEARCH_PATH}", self.base_url)
    }
}

#[async_trait]
impl SearchBackend for UnsplashBackend {
    async fn search(
        &self,
        client: &reqwest::Client,
        config: &Configuration,
        query: &str,
    ) -> Result<SearchResultSet, BackendError> {
        let settings: UnsplashSettings = config
            .backend_settings_as(PLUGIN_NAME)
            .map_err(|err| BackendError::Settings(err.to_string()))?;
        if settings.access_key.is_empty() {
            return Err(BackendError::Settings(
                "search_backend_settings.unsplash.access_key is not set".to_string(),
            ));
        }

        let per_page = config.results_per_page().to_string();
        debug!(endpoint = %self.endpoint(), query, "Querying Unsplash");

        let response = client
            .get(self.endpoint())
            .header(AUTHORIZATION, format!("Client-ID {}", settings.access_key))
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = response.json().await?;
        let received = payload.results.len();
        let results: Vec<SearchResult> = payload
            .results
            .into_iter()
            .filter_map(|photo| {
                photo.links.download.map(|url| SearchResult {
                    url,
                    width: photo.width,
                    height: photo.height,
                    backend_name: PLUGIN_NAME.to_string(),
                })
            })
            .collect();
        if results.len() < received {
            debug!(
                skipped = received - results.len(),
                "Skipping Unsplash photos without a download link"
            );
        }

        Ok(SearchResultSet::new(PLUGIN_NAME, results).with_total(payload.total))
    }
}

pub fn config_fields() -> SchemaFragment {
    SchemaFragment::new()
        .with_field(
            FieldSpec::string("access_key", "").with_description("Access key for the Unsplash API"),
        )
        .with_field(
            FieldSpec::string("secret_key", "").with_description("Secret key for the Unsplash API"),
        )
}

pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor::new(PLUGIN_NAME, UnsplashBackend::new(), config_fields())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            UnsplashBackend::with_base_url("http://localhost:1234/").endpoint(),
            "http://localhost:1234/search/photos"
        );
        assert_eq!(
            UnsplashBackend::new().endpoint(),
            "https://api.unsplash.com/search/photos"
        );
    }

    #[test]
    fn parses_search_payload() {
        let payload: SearchResponse = serde_json::from_str(
            r#"{
                "total": 133,
                "results": [
                    {"width": 4000, "height": 3000, "links": {"download": "https://unsplash.com/photos/a/download"}},
                    {"width": 10, "height": 10, "links": {}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.total, Some(133));
        assert_eq!(payload.results.len(), 2);
        assert!(payload.results[1].links.download.is_none());
    }
}
