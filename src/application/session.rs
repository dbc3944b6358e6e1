//! Saved search sessions
//!
//! A session is one named JSON document capturing everything needed to
//! re-run a search: character, quartz pool, required quartz, desired arts
//! and the result cap. Sessions live as `<name>.json` under the sessions
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::application::error::{ApplicationError, ApplicationResult};

/// One saved search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub character: String,
    #[serde(default)]
    pub selected_quartz: Vec<String>,
    /// Quartz that must appear in every build
    #[serde(default)]
    pub desired_quartz: Vec<String>,
    #[serde(default)]
    pub selected_arts: Vec<String>,
    #[serde(default = "default_max_builds")]
    pub max_builds: usize,
}

fn default_max_builds() -> usize {
    50
}

/// Load/save/list sessions in one directory.
#[derive(Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> ApplicationResult<PathBuf> {
        // Session names become file names; keep them flat.
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ApplicationError::InvalidSessionName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    #[instrument(level = "debug", skip(self, session))]
    pub fn save(&self, name: &str, session: &Session) -> ApplicationResult<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).map_err(|e| ApplicationError::Io {
            context: "create sessions directory".to_string(),
            path: self.dir.clone(),
            source: e,
        })?;
        let content = serde_json::to_string_pretty(session).map_err(|e| {
            ApplicationError::InvalidJson {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        fs::write(&path, content).map_err(|e| ApplicationError::Io {
            context: "write session".to_string(),
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, name: &str) -> ApplicationResult<Session> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(ApplicationError::SessionNotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path).map_err(|e| ApplicationError::Io {
            context: "read session".to_string(),
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::InvalidJson {
            path,
            reason: e.to_string(),
        })
    }

    pub fn delete(&self, name: &str) -> ApplicationResult<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(ApplicationError::SessionNotFound(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| ApplicationError::Io {
            context: "delete session".to_string(),
            path,
            source: e,
        })
    }

    /// Sorted names of all saved sessions.
    pub fn list(&self) -> Vec<String> {
        if !self.dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| session_name(e.path()))
            .collect();
        names.sort();
        names
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn session_name(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}
