// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Deployment profile, selects the default listening port
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Development,
    #[default]
    Production,
}

impl Profile {
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Development => 5000,
            Self::Production => 3000,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub profile: Profile,
    pub host: String,
    /// Listening port; falls back to the profile's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl ServerConfig {
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.profile.default_port())
    }
}

/// Site layout: where the bundle lives and how it is addressed
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Root directory; `dist` next to the executable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    pub index_file: String,
    /// Reserved prefix for content-hashed build output, never SPA-fallback
    pub assets_prefix: String,
}

/// HTTP behavior flags
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub enable_cache: bool,
    pub security_headers: bool,
    pub enable_cors: bool,
    pub server_name: String,
}

/// Optional `/test` and `/logs` endpoints
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
    pub history_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<String>,
}

impl LoggingConfig {
    pub fn is_debug(&self) -> bool {
        self.level.eq_ignore_ascii_case("debug") || self.level.eq_ignore_ascii_case("trace")
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u64>,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_grace: u64,
}
