//! Application configuration.
//!
//! Read from `dashboard.json` in the working directory, or from the file named
//! by `PO_DASHBOARD_CONFIG`. Every field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "PO_DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

pub const DEFAULT_ORDER_PATH: &str = "List_PO_EXTRACT.csv";
pub const DEFAULT_UNIT_PATH: &str = "DimPTJ.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// List PO extract CSV.
    pub order_path: PathBuf,
    /// DimPTJ CSV.
    pub unit_path: PathBuf,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            order_path: PathBuf::from(DEFAULT_ORDER_PATH),
            unit_path: PathBuf::from(DEFAULT_UNIT_PATH),
            log_level: "info".to_string(),
            window_title: "Laporan Pengeluaran Pesanan Tempatan".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve the config from the environment.
    ///
    /// A missing `dashboard.json` falls back to defaults; a file named
    /// explicitly through the environment must exist.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
