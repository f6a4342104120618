//! Status page handler.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::status::StatusReport;
use crate::templates::render_status_page;

/// Status page handler.
///
/// Database credentials are read from the environment on every request. A
/// database failure is reported in the page body; the response is 200 either way.
#[instrument(name = "status::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let config = DatabaseConfig::from_env();
    let report = StatusReport::collect(config, state.probe.as_ref(), &state.facts).await;

    tracing::debug!(
        database_status = report.database_status,
        probe_ms = report.probe_ms,
        "Collected status report"
    );

    let html = render_status_page(&state.tera, &report)?;
    Ok(Html(html))
}
