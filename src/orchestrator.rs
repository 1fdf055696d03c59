//! Concurrent dispatch of one query to every selected backend.
//!
//! Backends run in parallel, bounded by a semaphore. Each one's outcome is
//! recorded independently: an error or panic in one backend never cancels or
//! hides the results of the others.

use crate::config::Configuration;
use crate::error::BackendCallError;
use crate::image::SearchResultSet;
use crate::plugins::PluginRegistry;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info_span, warn};

/// Default bound on concurrently running backend calls.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// What one backend produced for one query.
#[derive(Debug)]
pub struct BackendOutcome {
    pub backend: String,
    pub result: Result<SearchResultSet, BackendCallError>,
}

impl BackendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-backend outcomes of a dispatch, in selection order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: Vec<BackendOutcome>,
}

impl DispatchReport {
    pub fn outcomes(&self) -> &[BackendOutcome] {
        &self.outcomes
    }

    pub fn successes(&self) -> impl Iterator<Item = &SearchResultSet> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BackendCallError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Split into successful result sets and errors, both in selection order.
    pub fn into_parts(self) -> (Vec<SearchResultSet>, Vec<BackendCallError>) {
        let mut sets = Vec::new();
        let mut errors = Vec::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(set) => sets.push(set),
                Err(err) => errors.push(err),
            }
        }
        (sets, errors)
    }
}

/// Runs searches against the backends a configuration selects.
#[derive(Debug, Clone)]
pub struct BackendOrchestrator {
    registry: Arc<PluginRegistry>,
    max_in_flight: usize,
}

impl BackendOrchestrator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Bound the number of backend calls running at once (at least 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Search every backend in `config.search_backends()` with `query`.
    ///
    /// Always returns one outcome per selected backend. The shared client is
    /// only read; backends attach their own headers per request.
    pub async fn dispatch(
        &self,
        client: &reqwest::Client,
        config: &Configuration,
        query: &str,
    ) -> DispatchReport {
        let selected: Vec<String> = config
            .search_backends()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut slots: Vec<Option<Result<SearchResultSet, BackendCallError>>> =
            selected.iter().map(|_| None).collect();

        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let config = Arc::new(config.clone());
        let query: Arc<str> = Arc::from(query);
        let mut tasks = JoinSet::new();

        for (idx, name) in selected.iter().enumerate() {
            let Some(descriptor) = self.registry.describe(name) else {
                slots[idx] = Some(Err(BackendCallError::NotRegistered(name.clone())));
                continue;
            };

            let backend = descriptor.search();
            let semaphore = Arc::clone(&semaphore);
            let client = client.clone();
            let config = Arc::clone(&config);
            let query = Arc::clone(&query);
            let name = name.clone();
            let span = info_span!("backend_search", backend = %name);

            tasks.spawn(
                async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return (idx, Err(BackendCallError::Aborted(name)));
                    };
                    debug!("Starting backend search");

                    let call = backend.search(&client, &config, &query);
                    let result = match AssertUnwindSafe(call).catch_unwind().await {
                        Ok(Ok(set)) => {
                            debug!(results = set.len(), "Backend search finished");
                            Ok(set)
                        }
                        Ok(Err(source)) => {
                            warn!(error = %source, "Backend search failed");
                            Err(BackendCallError::Failed {
                                backend: name,
                                source,
                            })
                        }
                        Err(panic) => {
                            warn!(panic = panic_message(panic.as_ref()), "Backend search panicked");
                            Err(BackendCallError::Panicked(name))
                        }
                    };
                    (idx, result)
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(err) => warn!(error = %err, "Backend task did not complete"),
            }
        }

        let outcomes = selected
            .into_iter()
            .zip(slots)
            .map(|(backend, slot)| {
                let result =
                    slot.unwrap_or_else(|| Err(BackendCallError::Aborted(backend.clone())));
                BackendOutcome { backend, result }
            })
            .collect();

        DispatchReport { outcomes }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_in_flight_is_at_least_one() {
        let orchestrator =
            BackendOrchestrator::new(Arc::new(PluginRegistry::new())).with_max_in_flight(0);
        assert_eq!(orchestrator.max_in_flight(), 1);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
