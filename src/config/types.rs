// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub service: ServiceConfig,
    pub analyzer: AnalyzerConfig,
    pub sprayer: SprayerConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Development mode: verbose logging and pretty-printed JSON
    pub debug: bool,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Output format for all log lines (text or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_log_format() -> String {
    "text".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds a single request may take; also the shutdown grace period
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Service metadata reported by `/health`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    pub version: String,
}

/// Crop image analyzer settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalyzerConfig {
    pub simulated_delay_ms: u64,
    pub model_version: String,
    pub last_updated: String,
}

/// IoT sprayer settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SprayerConfig {
    pub simulated_delay_ms: u64,
    pub battery_level: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                debug: true,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: true,
                access_log_format: default_access_log_format(),
                format: default_log_format(),
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                request_timeout: 30,
                max_connections: None,
            },
            http: HttpConfig {
                server_name: "AgriSense/1.0".to_string(),
                enable_cors: true,
                max_body_size: 10_485_760,
            },
            service: ServiceConfig {
                version: "1.0.0".to_string(),
            },
            analyzer: AnalyzerConfig {
                simulated_delay_ms: 2000,
                model_version: "v1.0.0".to_string(),
                last_updated: "2025-01-15T10:30:00Z".to_string(),
            },
            sprayer: SprayerConfig {
                simulated_delay_ms: 1000,
                battery_level: 85,
            },
        }
    }
}
