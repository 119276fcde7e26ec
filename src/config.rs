//! Configuration loading and management.
//!
//! Values are resolved in tiers, later tiers winning:
//! 1. Built-in defaults
//! 2. YAML file (`taskboard.yaml` in the working directory, or `--config`)
//! 3. Environment variables
//! 4. CLI flags (applied by `main`)
//!
//! ## Environment Variables
//! - `HOST` - Listen address
//! - `PORT` - Listen port
//! - `DB_NAME` - Database name; the SQLite file is `<DB_DIR>/<DB_NAME>.db`
//! - `DB_DIR` - Directory holding the database file
//! - `DB_POOL_SIZE` - Number of pooled connections
//!
//! `DB_HOST`, `DB_USER` and `DB_PASSWORD` are not read: the SQLite store is a
//! local file with no server to reach or credentials to present. Setting any
//! of them logs a warning at startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskboard.yaml";

/// Connection variables of a networked database that have no SQLite meaning.
pub const IGNORED_DB_ENV_VARS: [&str; 3] = ["DB_HOST", "DB_USER", "DB_PASSWORD"];

/// The members of [`IGNORED_DB_ENV_VARS`] that `lookup` finds set.
pub fn ignored_env_vars<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    IGNORED_DB_ENV_VARS
        .into_iter()
        .filter(|key| lookup(key).is_some())
        .collect()
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database name; becomes the file stem.
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Directory for the database file.
    #[serde(default = "default_db_dir")]
    pub dir: PathBuf,

    /// Maximum simultaneously checked-out connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            dir: default_db_dir(),
            pool_size: default_pool_size(),
        }
    }
}

impl DatabaseConfig {
    /// Full path of the SQLite file.
    pub fn db_path(&self) -> PathBuf {
        self.dir.join(format!("{}.db", self.name))
    }
}

fn default_db_name() -> String {
    "todoapp".to_string()
}

fn default_db_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_pool_size() -> usize {
    10
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve file and environment tiers.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        let lookup = |key: &str| std::env::var(key).ok();
        for key in ignored_env_vars(lookup) {
            warn!(variable = key, "Ignored: the SQLite store has no host or credentials");
        }
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(dir) = lookup("DB_DIR") {
            self.database.dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("DB_POOL_SIZE") {
            self.database.pool_size = size
                .parse()
                .with_context(|| format!("DB_POOL_SIZE must be a number, got {size:?}"))?;
        }
        Ok(())
    }
}
