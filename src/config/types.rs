// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ACCESS_LOG_FORMAT: &str = "combined";
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: u64 = 75;
pub const DEFAULT_IO_TIMEOUT: u64 = 30;
pub const DEFAULT_SERVER_NAME: &str = "wiki-server";
/// Largest accepted request body (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1_048_576;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_FRONT_PAGE: &str = "FrontPage";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub wiki: WikiConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            access_log: true,
            access_log_format: DEFAULT_ACCESS_LOG_FORMAT.to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: DEFAULT_KEEP_ALIVE_TIMEOUT,
            read_timeout: DEFAULT_IO_TIMEOUT,
            write_timeout: DEFAULT_IO_TIMEOUT,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    pub server_name: String,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Wiki storage configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WikiConfig {
    /// Directory holding one `<title>.txt` file per page
    pub data_dir: String,
    /// Page the root path redirects to
    pub front_page: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            front_page: DEFAULT_FRONT_PAGE.to_string(),
        }
    }
}
