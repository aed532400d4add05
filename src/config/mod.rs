// Configuration module entry point
// Loads layered configuration and holds the runtime state built from it

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DiagnosticsConfig, HttpConfig, LoggingConfig, PerformanceConfig, Profile,
    ServerConfig, SiteConfig,
};

/// Default config file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "parkmaster";

/// Environment variable prefix, e.g. `PARKMASTER_SERVER__HOST`
const ENV_PREFIX: &str = "PARKMASTER";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence: defaults < config file < `PARKMASTER_*` env < `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder(config_path)?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }

    /// Load with no file and no environment, for tests and `--dump-config`
    pub fn defaults() -> Result<Self, config::ConfigError> {
        defaults(config::Config::builder())?.build()?.try_deserialize()
    }

    fn builder(
        config_path: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        Ok(defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ))
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let ip: IpAddr = self.server.host.parse().map_err(|e| {
            StartupError::InvalidAddress(format!("{}: {e}", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.effective_port()))
    }

    /// Root directory as configured, before canonicalization
    ///
    /// Defaults to `dist` next to the running executable.
    pub fn root_dir(&self) -> Result<PathBuf, StartupError> {
        if let Some(root) = &self.site.root {
            return Ok(PathBuf::from(root));
        }
        let exe = std::env::current_exe().map_err(StartupError::Io)?;
        let dir = exe.parent().map(PathBuf::from).unwrap_or_default();
        Ok(dir.join("dist"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.profile", "production")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("site.index_file", "index.html")?
        .set_default("site.assets_prefix", "/assets/")?
        .set_default("http.enable_cache", true)?
        .set_default("http.security_headers", true)?
        .set_default("http.enable_cors", false)?
        .set_default("http.server_name", "parkmaster-server")?
        .set_default("diagnostics.enabled", false)?
        .set_default("diagnostics.history_size", 100)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_grace", 5)
}
