//! Health check endpoint for container orchestration.
//!
//! Provides a simple liveness probe that returns 200 OK when the process is running.
//! Unlike the status page it never touches the database, so a database outage
//! does not get the container restarted.

/// Health check handler.
pub async fn health() -> &'static str {
    "ok"
}
