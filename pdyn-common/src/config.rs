//! Configuration loading and database path resolution
//!
//! Database path priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not fatal: defaults are used and a warning is
//! logged. A TOML file that exists but cannot be parsed is an error.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::{ProgressTag, TagCatalog, STANDARD_CATALOG_VERSION};
use crate::time::reporting_offset;
use crate::timeline::{ReservedMarkers, DEFAULT_AVERAGE_LABEL, DEFAULT_RESERVED_MARKERS};
use crate::{Error, Result};

/// Environment variable naming the snapshot database
pub const DATABASE_ENV_VAR: &str = "PDYN_DATABASE";

/// Default listen address of the HTTP service
pub const DEFAULT_BIND: &str = "127.0.0.1:5790";

/// Default log level when neither config nor `RUST_LOG` set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub database: Option<PathBuf>,
    pub bind: Option<String>,
    pub log_level: Option<String>,
    pub timeline: TimelineConfig,
    pub catalog: Option<CatalogConfig>,
}

/// `[timeline]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    /// Reporting timezone as minutes east of UTC
    pub utc_offset_minutes: i32,
    /// Section names containing any of these are left out of timelines
    pub reserved_markers: Vec<String>,
    /// Name shown for the average series
    pub average_label: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            reserved_markers: DEFAULT_RESERVED_MARKERS.iter().map(|m| m.to_string()).collect(),
            average_label: DEFAULT_AVERAGE_LABEL.to_string(),
        }
    }
}

/// `[catalog]` section replacing the built-in progress tags
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_version")]
    pub version: u32,
    pub tags: Vec<ProgressTag>,
}

fn default_catalog_version() -> u32 {
    STANDARD_CATALOG_VERSION
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load `explicit` or the platform config file, falling back to defaults when absent
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => {
                    info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Tag catalog: the configured override or the built-in table
    pub fn tag_catalog(&self) -> Result<TagCatalog> {
        match &self.catalog {
            Some(catalog) => TagCatalog::new(catalog.version, catalog.tags.clone()),
            None => Ok(TagCatalog::standard()),
        }
    }

    pub fn reporting_offset(&self) -> Result<FixedOffset> {
        reporting_offset(self.timeline.utc_offset_minutes).ok_or_else(|| {
            Error::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.timeline.utc_offset_minutes
            ))
        })
    }

    pub fn average_label(&self) -> &str {
        &self.timeline.average_label
    }

    pub fn section_filter(&self) -> ReservedMarkers {
        ReservedMarkers::new(self.timeline.reserved_markers.iter().cloned())
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// Resolve the snapshot database path
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.database {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// Platform config file location, if one exists
///
/// Linux checks `~/.config/pdyn/config.toml` then `/etc/pdyn/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pdyn").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/pdyn/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pdyn").join("pdyn.db"))
        .unwrap_or_else(|| PathBuf::from("./pdyn_data/pdyn.db"))
}
