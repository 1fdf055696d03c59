//! Image search result types shared by all backends.

use serde::{Deserialize, Serialize};

/// A single image found by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Name of the backend that produced this result.
    pub backend_name: String,
}

/// Everything one backend returned for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub results: Vec<SearchResult>,
    /// Total matches reported by the backend, when it reports one.
    pub total_number_results: Option<u64>,
    pub search_backend: String,
}

impl SearchResultSet {
    pub fn new(search_backend: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            results,
            total_number_results: None,
            search_backend: search_backend.into(),
        }
    }

    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total_number_results = total;
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
