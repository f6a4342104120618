//! Data preparation for the status page.
//!
//! `StatusReport::collect` runs the probe and gathers everything the page
//! shows. Rendering lives in `templates` and only ever sees the finished report.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::DatabaseConfig;
use crate::facts::AmbientFacts;
use crate::probe::{ConnectionResult, DatabaseProbe};

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub database: ConnectionResult,
    /// "Connected" or "Connection error"
    pub database_status: &'static str,
    pub facts: AmbientFacts,
    pub checked_at: DateTime<Utc>,
    pub probe_ms: u64,
}

impl StatusReport {
    pub fn new(database: ConnectionResult, facts: AmbientFacts, probe_ms: u64) -> Self {
        Self {
            database_status: database.status_text(),
            database,
            facts,
            checked_at: Utc::now(),
            probe_ms,
        }
    }

    /// Probe the database with `config` and assemble the report.
    pub async fn collect(
        config: DatabaseConfig,
        probe: &dyn DatabaseProbe,
        facts: &AmbientFacts,
    ) -> Self {
        let start = Instant::now();
        let database = probe.probe(&config).await;
        let probe_ms = start.elapsed().as_millis() as u64;

        Self::new(database, facts.clone(), probe_ms)
    }
}
