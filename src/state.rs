//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::facts::AmbientFacts;
use crate::probe::DatabaseProbe;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds nothing mutable: each request builds its own database configuration
/// and connection, so handlers never coordinate with one another.
#[derive(Clone)]
pub struct AppState {
    pub tera: Arc<Tera>,
    pub probe: Arc<dyn DatabaseProbe>,
    pub facts: Arc<AmbientFacts>,
}

impl AppState {
    /// Creates a new application state from the given templates, probe, and runtime facts.
    pub fn new(
        tera: Tera,
        probe: Arc<dyn DatabaseProbe>,
        facts: AmbientFacts,
    ) -> Self {
        Self {
            tera: Arc::new(tera),
            probe,
            facts: Arc::new(facts),
        }
    }
}
