use std::sync::Arc;

use crate::artifact::ArtifactPublisher;
use crate::generator::BracketGenerator;

/// Per-process handles shared by every request. Nothing in here is mutated
/// after startup; the only cross-request state is the artifact on disk.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn BracketGenerator>,
    publisher: Arc<dyn ArtifactPublisher>,
    bracket_url: Arc<str>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn BracketGenerator>,
        publisher: Arc<dyn ArtifactPublisher>,
        bracket_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            generator,
            publisher,
            bracket_url: bracket_url.into(),
        }
    }

    pub fn generator(&self) -> Arc<dyn BracketGenerator> {
        Arc::clone(&self.generator)
    }

    pub fn publisher(&self) -> Arc<dyn ArtifactPublisher> {
        Arc::clone(&self.publisher)
    }

    /// Path clients fetch the published artifact from.
    pub fn bracket_url(&self) -> &str {
        &self.bracket_url
    }
}
