//! stack-status: a status page for a web server + MariaDB stack.
//!
//! This is the application entry point. It parses arguments, loads the optional
//! TOML configuration, initializes tracing, compiles templates, sets up the Axum
//! router and starts the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stack_status::config::{AppConfig, DEFAULT_LOG_FILTER};
use stack_status::facts::AmbientFacts;
use stack_status::http::start_server;
use stack_status::probe::MariaDbProbe;
use stack_status::routes::create_router;
use stack_status::state::AppState;
use stack_status::templates::init_templates;

/// stack-status: web server, runtime and MariaDB status page
#[derive(Parser, Debug)]
#[command(name = "stack-status", version, about)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "stack_status=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration comes first so the log format is known before tracing starts
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let json = config.logging.is_json();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    match &args.config {
        Some(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let probe = MariaDbProbe::new(&config.database);
    tracing::info!(
        port = config.database.port,
        timeout_secs = config.database.connect_timeout_seconds,
        "Database probe configured"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let facts = AmbientFacts::collect();
    tracing::info!(
        runtime = %facts.runtime_version,
        os = %facts.os_release,
        "Collected runtime facts"
    );

    let state = AppState::new(tera, Arc::new(probe), facts);
    let app = create_router(state);

    start_server(app, &config.http).await?;

    Ok(())
}
