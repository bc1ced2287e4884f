//! Bridge configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::types::{BridgeError, Result};

/// Class names always reported as `SYSTEM TABLE`.
pub const DEFAULT_SYSTEM_TABLES: [&str; 8] = [
    "OUser",
    "ORole",
    "OIdentity",
    "ORIDs",
    "ORestricted",
    "OFunction",
    "OTriggered",
    "OSchedule",
];

/// Configuration shared by connections, statements and catalog queries.
///
/// Loadable from TOML; missing keys keep their defaults:
///
/// ```toml
/// case_insensitive_names = true
/// system_tables = ["OUser", "ORole"]
/// driver_name = "Acme Bridge"
/// log_filter = "sombra_bridge=debug"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    /// Class names reported as `SYSTEM TABLE` by table listings.
    pub system_tables: Vec<String>,
    /// Whether catalog name patterns ignore case.
    pub case_insensitive_names: bool,
    /// Driver name reported by [`crate::catalog::DatabaseMetadata::driver_name`].
    pub driver_name: String,
    /// `tracing` filter directive used by [`crate::logging::init_logging`].
    pub log_filter: String,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            system_tables: DEFAULT_SYSTEM_TABLES.iter().map(|s| (*s).to_owned()).collect(),
            case_insensitive_names: false,
            driver_name: "Sombra Bridge Driver".to_owned(),
            log_filter: "info".to_owned(),
        }
    }
}

impl BridgeOptions {
    /// Options for engines whose class names are case-insensitive.
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive_names: true,
            ..Self::default()
        }
    }

    /// Parses options from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| BridgeError::Config {
            origin: "<inline>".to_owned(),
            source,
        })
    }

    /// Reads options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| BridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| BridgeError::Config {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Returns true when `class` is one of the reserved system tables.
    pub fn is_system_table(&self, class: &str) -> bool {
        self.system_tables.iter().any(|name| {
            if self.case_insensitive_names {
                name.eq_ignore_ascii_case(class)
            } else {
                name == class
            }
        })
    }
}
