use crate::collection::CollectionRunner;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Wraps the shared `Arc<dyn TextExtractor>` and pipeline settings.
    pub runner: CollectionRunner,
}

impl AppState {
    pub fn new(config: Config, runner: CollectionRunner) -> Self {
        Self { config, runner }
    }
}
