use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::bind_addr`].
pub const BIND_ENV: &str = "ITEMCMP_BIND";
/// Environment variable overriding [`ServerConfig::storage_dir`].
pub const STORAGE_ENV: &str = "STORAGE_PATH";
/// Dotenv file read before the environment is consulted.
pub const DEFAULT_ENV_FILE: &str = "config.env";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORAGE_DIR: &str = "data";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding one `<id>.json` file per product.
    pub storage_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load `KEY=value` lines from a dotenv file into the process
    /// environment. Variables already set are left alone. Returns `false`
    /// when the file does not exist.
    pub fn load_env_file(path: &Path) -> ServerResult<bool> {
        match dotenvy::from_path(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "loaded env file");
                Ok(true)
            }
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(ServerError::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// Apply `ITEMCMP_BIND` and `STORAGE_PATH` from the process environment.
    pub fn apply_env(&mut self) -> ServerResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Empty values are ignored, so an empty
    /// `STORAGE_PATH` leaves the storage directory unchanged.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ServerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = non_empty(BIND_ENV) {
            self.bind_addr = bind
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("{BIND_ENV}={bind}: {e}")))?;
        }
        if let Some(dir) = non_empty(STORAGE_ENV) {
            self.storage_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}
