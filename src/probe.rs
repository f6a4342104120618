//! Database connectivity probe.
//!
//! A probe opens one MariaDB/MySQL connection, asks the server for its version
//! and closes the connection again. There is no pool and no retry: every status
//! page request pays for exactly one connect + query round trip, bounded by the
//! configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::{DatabaseConfig, ProbeConfig, UNKNOWN_VERSION, VERSION_QUERY};

/// Outcome of a single connectivity attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionResult {
    /// Connected and read the server version
    Connected { version: String },
    /// Could not connect or the version query failed
    Failed { error: String },
}

impl ConnectionResult {
    /// Status line shown on the page.
    pub fn status_text(&self) -> &'static str {
        match self {
            ConnectionResult::Connected { .. } => "Connected",
            ConnectionResult::Failed { .. } => "Connection error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionResult::Connected { .. })
    }
}

impl From<DatabaseConnectionError> for ConnectionResult {
    fn from(err: DatabaseConnectionError) -> Self {
        ConnectionResult::Failed {
            error: err.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseConnectionError {
    #[error("{0}")]
    Driver(#[from] sqlx::Error),

    #[error("timed out after {}ms waiting for the database", .0.as_millis())]
    TimedOut(Duration),
}

/// Something that can report database reachability.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn probe(&self, config: &DatabaseConfig) -> ConnectionResult;
}

/// Probe backed by a single sqlx `MySqlConnection`.
#[derive(Debug, Clone)]
pub struct MariaDbProbe {
    port: u16,
    timeout: Duration,
}

impl MariaDbProbe {
    pub fn new(settings: &ProbeConfig) -> Self {
        Self::with_timeout(
            settings.port,
            Duration::from_secs(settings.connect_timeout_seconds),
        )
    }

    pub fn with_timeout(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connect_options(&self, config: &DatabaseConfig) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&config.host)
            .port(self.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
    }

    /// Connect, read the version, close. The connection is closed before the
    /// query result is inspected so both paths release it.
    async fn fetch_version(
        &self,
        config: &DatabaseConfig,
    ) -> Result<Option<String>, DatabaseConnectionError> {
        let mut conn: MySqlConnection = self.connect_options(config).connect().await?;

        let version = sqlx::query_scalar::<_, String>(VERSION_QUERY)
            .fetch_optional(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Error while closing database connection");
        }

        Ok(version?)
    }
}

/// Map the version query's first row to a result. No row means the server
/// answered but reported nothing, which still counts as connected.
fn version_result(version: Option<String>) -> ConnectionResult {
    ConnectionResult::Connected {
        version: version.unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
    }
}

#[async_trait]
impl DatabaseProbe for MariaDbProbe {
    async fn probe(&self, config: &DatabaseConfig) -> ConnectionResult {
        let outcome = match tokio::time::timeout(self.timeout, self.fetch_version(config)).await
        {
            Ok(result) => result,
            Err(_) => Err(DatabaseConnectionError::TimedOut(self.timeout)),
        };

        match outcome {
            Ok(version) => {
                if version.is_none() {
                    tracing::warn!(host = %config.host, "Version query returned no rows");
                }
                let result = version_result(version);
                tracing::debug!(
                    host = %config.host,
                    port = self.port,
                    database = %config.database,
                    "Database probe succeeded"
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    host = %config.host,
                    port = self.port,
                    user = %config.user,
                    database = %config.database,
                    error = %err,
                    "Database probe failed"
                );
                err.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn local_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_status_text() {
        let ok = ConnectionResult::Connected {
            version: "10.11.6-MariaDB".to_string(),
        };
        let failed = ConnectionResult::Failed {
            error: "refused".to_string(),
        };
        assert_eq!(ok.status_text(), "Connected");
        assert!(ok.is_connected());
        assert_eq!(failed.status_text(), "Connection error");
        assert!(!failed.is_connected());
    }

    #[test]
    fn test_timeout_error_becomes_failed() {
        let result: ConnectionResult =
            DatabaseConnectionError::TimedOut(Duration::from_millis(250)).into();
        assert_eq!(
            result,
            ConnectionResult::Failed {
                error: "timed out after 250ms waiting for the database".to_string()
            }
        );
    }

    #[test]
    fn test_missing_version_row_falls_back() {
        assert_eq!(
            version_result(None),
            ConnectionResult::Connected {
                version: "unknown version".to_string()
            }
        );
    }

    #[test]
    fn test_version_row_passes_through() {
        assert_eq!(
            version_result(Some("10.11.6-MariaDB".to_string())),
            ConnectionResult::Connected {
                version: "10.11.6-MariaDB".to_string()
            }
        );
    }

    #[test]
    fn test_new_uses_configured_timeout() {
        let probe = MariaDbProbe::new(&ProbeConfig {
            port: 3307,
            connect_timeout_seconds: 3,
        });
        assert_eq!(probe.timeout(), Duration::from_secs(3));
        assert_eq!(probe.port, 3307);
    }

    #[tokio::test]
    async fn test_closed_port_reports_failure() {
        // Reserve a port, then free it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = MariaDbProbe::with_timeout(port, Duration::from_secs(5));
        let start = Instant::now();
        let result = probe.probe(&local_config()).await;

        match result {
            ConnectionResult::Failed { error } => assert!(!error.is_empty()),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_silent_server_hits_timeout() {
        // Accepts TCP connections but never sends the MySQL handshake.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let probe = MariaDbProbe::with_timeout(port, Duration::from_millis(300));
        let start = Instant::now();
        let result = probe.probe(&local_config()).await;

        assert_eq!(
            result,
            ConnectionResult::Failed {
                error: "timed out after 300ms waiting for the database".to_string()
            }
        );
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
