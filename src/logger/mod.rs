//! Logger module
//!
//! Thin layer over `tracing` providing:
//! - Subscriber setup from configuration
//! - Server lifecycle logging
//! - Access logging with multiple formats (emitted on the `access` target)
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::ApiError;
use crate::config::Config;

/// Target used for access log lines, filterable with `RUST_LOG=access=off`
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`; debug mode raises this crate to `debug`.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(config)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    }
}

fn default_directives(config: &Config) -> String {
    if config.server.debug {
        format!("{},{}=debug", config.logging.level, env!("CARGO_CRATE_NAME"))
    } else {
        config.logging.level.clone()
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    info!("Starting AgriSense backend");
    info!("Listening on: http://{addr}");
    info!(
        debug = config.server.debug,
        cors = config.http.enable_cors,
        max_body_size = config.http.max_body_size,
        "Server configuration"
    );
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    info!(
        delay_ms = config.analyzer.simulated_delay_ms,
        model_version = %config.analyzer.model_version,
        "AI model integration: placeholder analyzer"
    );
    info!(
        delay_ms = config.sprayer.simulated_delay_ms,
        "IoT sprayer integration: placeholder device"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    warn!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}

/// Server-side faults at error level, client mistakes at warn
pub fn log_api_error(method: &str, path: &str, err: &ApiError) {
    let status = err.status_code().as_u16();
    if err.status_code().is_server_error() {
        error!(%method, %path, status, "Request failed: {err}");
    } else {
        warn!(%method, %path, status, "Request rejected: {err}");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    info!("{signal} received, shutting down gracefully");
}

pub fn log_shutdown_complete(pending: usize) {
    if pending == 0 {
        info!("All connections closed, server stopped");
    } else {
        warn!("Shutdown timed out with {pending} connection(s) still open");
    }
}
