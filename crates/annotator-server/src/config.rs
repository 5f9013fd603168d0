//! Server configuration
//!
//! Resolved once at startup, in order of increasing precedence: built-in
//! defaults, an optional TOML file, `ANNOTATOR_*` environment variables, and
//! finally command-line flags applied by `main`.
//!
//! | Key                         | Env var                              | Default                 |
//! |-----------------------------|--------------------------------------|-------------------------|
//! | `bind_address`              | `ANNOTATOR_BIND_ADDRESS`             | `0.0.0.0:8475`          |
//! | `index_path`                | `ANNOTATOR_INDEX_PATH`               | `static/index.html`     |
//! | `bulk_upload`               | `ANNOTATOR_BULK_UPLOAD`              | `atomic`                |
//! | `max_body_bytes`            | `ANNOTATOR_MAX_BODY_BYTES`           | `16777216`              |
//! | `database.path`             | `ANNOTATOR_DATABASE__PATH`           | `sqlite/annotations.db` |
//! | `database.max_connections`  | `ANNOTATOR_DATABASE__MAX_CONNECTIONS`| `5`                     |
//! | `log.filter`                | `ANNOTATOR_LOG__FILTER`              | `info`                  |
//! | `log.format`                | `ANNOTATOR_LOG__FORMAT`              | `pretty`                |

use annotator_core::{AnnotatorError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "ANNOTATOR";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8475";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Static document served at `/`
    pub index_path: PathBuf,
    pub bulk_upload: BulkUploadMode,
    pub max_body_bytes: usize,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            index_path: PathBuf::from("static/index.html"),
            bulk_upload: BulkUploadMode::default(),
            max_body_bytes: 16 * 1024 * 1024,
            database: DatabaseConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; its parent directory is created on startup
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sqlite/annotations.db"),
            max_connections: 5,
        }
    }
}

/// How `/upload-json` commits its items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkUploadMode {
    /// One transaction for the whole list
    #[default]
    Atomic,
    /// One commit per item; items before a failure stay committed
    BestEffort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl ServerConfig {
    /// Load from the optional file and the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_file, None)
    }

    /// Like [`ServerConfig::load`], but reads variables from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: ServerConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AnnotatorError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.database.max_connections == 0 {
            return Err(AnnotatorError::InvalidConfig(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(AnnotatorError::InvalidConfig(
                "database.path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            AnnotatorError::InvalidConfig(format!(
                "bind_address '{}' is not a socket address: {}",
                self.bind_address, e
            ))
        })
    }
}
