//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orbment/orbment.toml`
//! 3. Environment variables: `ORBMENT_*` prefix

use std::collections::BTreeSet;
use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::OrderingPolicy;

/// Which canonical ordering the solver uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingKind {
    /// Prioritized quartz first, then alphabetical
    Priority,
    /// Descending total element contribution, then alphabetical
    Weight,
}

impl OrderingKind {
    /// Materialize the configured policy for one search.
    pub fn to_policy(self, prioritized: BTreeSet<String>) -> OrderingPolicy {
        match self {
            OrderingKind::Priority => OrderingPolicy::Priority { prioritized },
            OrderingKind::Weight => OrderingPolicy::ElementWeight,
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding quartz.json, arts.json, characters.json
    pub data_dir: PathBuf,
    /// Directory for saved sessions
    pub sessions_dir: PathBuf,
    /// Directory for cached search results
    pub cache_dir: PathBuf,
    /// Default result cap when a session or flag does not override it
    pub max_builds: usize,
    pub ordering: OrderingKind,
    /// Run searches with the parallel engine by default
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let dirs = ProjectDirs::from("", "", "orbment");
        let (sessions_dir, cache_dir) = match &dirs {
            Some(d) => (d.data_dir().join("sessions"), d.cache_dir().to_path_buf()),
            None => (
                PathBuf::from("saved_sessions"),
                PathBuf::from(".orbment-cache"),
            ),
        };
        Self {
            data_dir: PathBuf::from("data"),
            sessions_dir,
            cache_dir,
            max_builds: 50,
            ordering: OrderingKind::Priority,
            parallel: false,
        }
    }
}

/// Raw settings for intermediate parsing (all fields optional so a partial
/// config file inherits defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    data_dir: Option<PathBuf>,
    sessions_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    max_builds: Option<usize>,
    ordering: Option<OrderingKind>,
    parallel: Option<bool>,
}

impl Settings {
    /// Load settings with layered precedence.
    pub fn load() -> ApplicationResult<Self> {
        Self::load_from(Self::global_config_path())
    }

    /// Load with an explicit config file path (tests and `--config`).
    pub fn load_from(config_path: Option<PathBuf>) -> ApplicationResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = &config_path {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
        builder = builder.add_source(Environment::with_prefix("ORBMENT"));

        let raw: RawSettings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })?;

        let defaults = Settings::default();
        Ok(Settings {
            data_dir: raw.data_dir.unwrap_or(defaults.data_dir),
            sessions_dir: raw.sessions_dir.unwrap_or(defaults.sessions_dir),
            cache_dir: raw.cache_dir.unwrap_or(defaults.cache_dir),
            max_builds: raw.max_builds.unwrap_or(defaults.max_builds),
            ordering: raw.ordering.unwrap_or(defaults.ordering),
            parallel: raw.parallel.unwrap_or(defaults.parallel),
        })
    }

    /// `$XDG_CONFIG_HOME/orbment/orbment.toml` (platform equivalent).
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "orbment").map(|d| d.config_dir().join("orbment.toml"))
    }

    /// Write the compiled defaults as a starting config file.
    pub fn write_default(path: &PathBuf) -> ApplicationResult<()> {
        let content =
            toml::to_string_pretty(&Settings::default()).map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApplicationError::Io {
                context: "create config directory".to_string(),
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ApplicationError::Io {
            context: "write config file".to_string(),
            path: path.clone(),
            source: e,
        })
    }
}
