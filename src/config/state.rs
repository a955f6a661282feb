// Application state module
// Shared, read-only state handed to every connection

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Cached so the request path does not dig through the config
    pub access_log: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let access_log = config.logging.access_log;
        Self { config, access_log }
    }
}
