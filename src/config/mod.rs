// Configuration module entry point
// Layers built-in defaults, an optional config file, SERVER_* environment
// variables and command-line overrides into one `Config`

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::StartupError;

pub use state::AppState;
pub use types::{
    Config, LoggingConfig, PerformanceConfig, ServerConfig, ServingConfig, DEFAULT_PORT,
    DEFAULT_ROOT,
};

/// Values given on the command line; they win over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Config {
    /// Load configuration from the given file path (extension optional).
    /// A missing file is not an error; defaults apply.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, ::config::ConfigError> {
        let defaults = Self::default();
        let settings = ::config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("serving.root", DEFAULT_ROOT)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default("performance.keep_alive", defaults.performance.keep_alive)?
            .set_default("performance.read_timeout", defaults.performance.read_timeout)?
            .set_default("performance.write_timeout", defaults.performance.write_timeout)?
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option(
                "serving.root",
                overrides
                    .root
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option(
                "server.workers",
                overrides.workers.and_then(|w| u64::try_from(w).ok()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::Address { addr, source })
    }
}
