//! Registry of search backend descriptors.

use super::BackendDescriptor;
use crate::error::{BackendSelectionError, StartupError};
use std::collections::HashMap;
use tracing::debug;

/// Collects descriptors from all plugins.
///
/// Registration order is preserved and drives default selection and display
/// order. Names are unique.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    descriptors: Vec<BackendDescriptor>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a batch of descriptors.
    ///
    /// Unlike repeated [`register`](Self::register) calls, every duplicated
    /// name is reported in a single error.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = BackendDescriptor>,
    ) -> Result<Self, StartupError> {
        let descriptors: Vec<BackendDescriptor> = descriptors.into_iter().collect();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates: Vec<String> = Vec::new();
        for descriptor in &descriptors {
            let count = seen.entry(descriptor.name()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(descriptor.name().to_string());
            }
        }
        if !duplicates.is_empty() {
            return Err(StartupError::DuplicateBackends(duplicates));
        }

        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Add a descriptor. Fails if the name is empty or already registered.
    pub fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), StartupError> {
        if descriptor.name().is_empty() {
            return Err(StartupError::EmptyBackendName);
        }
        if self.index.contains_key(descriptor.name()) {
            return Err(StartupError::DuplicateBackends(vec![
                descriptor.name().to_string(),
            ]));
        }

        debug!(backend = descriptor.name(), "Registered search backend");
        self.index
            .insert(descriptor.name().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name()).collect()
    }

    pub fn describe(&self, name: &str) -> Option<&BackendDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Check that every candidate is a registered name.
    pub fn validate_selection<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<(), BackendSelectionError> {
        let invalid: Vec<String> = candidates
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(BackendSelectionError {
                invalid,
                permitted: self.names().into_iter().map(str::to_string).collect(),
            })
        }
    }
}
