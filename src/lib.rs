//! stack-status: a status page for a web server + MariaDB stack.
//!
//! Each page load resolves database credentials from the environment, probes
//! the database once, and renders the result together with runtime and host
//! details. Database trouble is shown in the page, never as an HTTP error.

pub mod config;
pub mod error;
pub mod facts;
pub mod http;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod state;
pub mod status;
pub mod templates;

pub use error::AppError;
