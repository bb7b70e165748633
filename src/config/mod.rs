// Configuration module entry point
// Loads application configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::page::Title;

// Re-export public types
pub use state::{AppState, StartupError};
#[cfg(test)]
pub use state::{test_state, test_state_with};
pub use types::{Config, PerformanceConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the optional file,
    /// then `WIKI_`-prefixed environment variables (`WIKI_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", types::DEFAULT_HOST)?
            .set_default("server.port", types::DEFAULT_PORT)?
            .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", types::DEFAULT_ACCESS_LOG_FORMAT)?
            .set_default("performance.keep_alive_timeout", types::DEFAULT_KEEP_ALIVE_TIMEOUT)?
            .set_default("performance.read_timeout", types::DEFAULT_IO_TIMEOUT)?
            .set_default("performance.write_timeout", types::DEFAULT_IO_TIMEOUT)?
            .set_default("http.server_name", types::DEFAULT_SERVER_NAME)?
            .set_default("http.max_body_size", types::DEFAULT_MAX_BODY_SIZE)?
            .set_default("wiki.data_dir", types::DEFAULT_DATA_DIR)?
            .set_default("wiki.front_page", types::DEFAULT_FRONT_PAGE)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WIKI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Front page as a validated title
    pub fn front_page(&self) -> Result<Title, String> {
        Title::parse(&self.wiki.front_page)
            .ok_or_else(|| format!("Invalid front page title: '{}'", self.wiki.front_page))
    }
}
