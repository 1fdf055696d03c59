//! Application wiring: registry, composed schema, and the services built on them.

use crate::config::{CompositeSchema, ConfigLoader, DottedPathEditor};
use crate::error::StartupError;
use crate::orchestrator::BackendOrchestrator;
use crate::plugins::{BackendDescriptor, PluginRegistry};
use std::sync::Arc;
use tracing::debug;

/// The registry and schema, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct App {
    registry: Arc<PluginRegistry>,
    schema: Arc<CompositeSchema>,
}

impl App {
    /// Register `descriptors` and compose the configuration schema.
    ///
    /// Fails if any backend name is registered twice.
    pub fn bootstrap(
        descriptors: impl IntoIterator<Item = BackendDescriptor>,
    ) -> Result<Self, StartupError> {
        let registry = PluginRegistry::from_descriptors(descriptors)?;
        let schema = CompositeSchema::from_registry(&registry);
        debug!(backends = ?registry.names(), "Registered search backends");
        Ok(Self {
            registry: Arc::new(registry),
            schema: Arc::new(schema),
        })
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &CompositeSchema {
        &self.schema
    }

    pub fn loader(&self) -> ConfigLoader<'_> {
        ConfigLoader::new(&self.schema, &self.registry)
    }

    pub fn editor(&self) -> DottedPathEditor<'_> {
        DottedPathEditor::new(&self.schema, &self.registry)
    }

    pub fn orchestrator(&self) -> BackendOrchestrator {
        BackendOrchestrator::new(Arc::clone(&self.registry))
    }
}
