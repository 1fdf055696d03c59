//! Search backend plugins.
//!
//! A plugin contributes a [`BackendDescriptor`]: a unique name, a
//! [`SearchBackend`] capability and the [`SchemaFragment`] describing its
//! settings. Descriptors are collected by the [`PluginRegistry`], which drives
//! both configuration composition and search dispatch.
//!
//! How plugins are discovered is not this module's concern; callers pass
//! descriptors to [`PluginRegistry::from_descriptors`] (see [`builtin`]).

pub mod placeholder;
mod registry;
pub mod unsplash;

pub use registry::PluginRegistry;

use crate::config::{Configuration, SchemaFragment};
use crate::image::SearchResultSet;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure inside a single backend's search call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

/// The search capability a backend exposes.
///
/// Implementations must not mutate shared client state; per-call headers go
/// on the request builder.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        client: &reqwest::Client,
        config: &Configuration,
        query: &str,
    ) -> Result<SearchResultSet, BackendError>;
}

/// Registered metadata for one backend. Immutable once built.
#[derive(Clone)]
pub struct BackendDescriptor {
    name: String,
    search: Arc<dyn SearchBackend>,
    config_fields: SchemaFragment,
}

impl BackendDescriptor {
    pub fn new(
        name: impl Into<String>,
        search: impl SearchBackend + 'static,
        config_fields: SchemaFragment,
    ) -> Self {
        Self {
            name: name.into(),
            search: Arc::new(search),
            config_fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the search capability.
    pub fn search(&self) -> Arc<dyn SearchBackend> {
        Arc::clone(&self.search)
    }

    pub fn config_fields(&self) -> &SchemaFragment {
        &self.config_fields
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("name", &self.name)
            .field("config_fields", &self.config_fields)
            .finish_non_exhaustive()
    }
}

/// Descriptors for the backends shipped with the binary, in registration order.
pub fn builtin() -> Vec<BackendDescriptor> {
    vec![unsplash::descriptor(), placeholder::descriptor()]
}
