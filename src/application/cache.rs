//! Result cache keyed by a hash of the search configuration
//!
//! A completed search is expensive; its inputs fully determine its output.
//! The cache key is the hex SHA-256 of the canonicalized configuration
//! (character, sorted pool, sorted required set, sorted arts, cap), and the
//! value is the ranked build list as JSON. A corrupt or unreadable entry is
//! a miss, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::Build;

/// Canonical form of one search configuration, hashed for the cache key.
#[derive(Debug, Serialize)]
struct CacheKeyInput<'a> {
    character: &'a str,
    quartz: Vec<&'a str>,
    required_quartz: Vec<&'a str>,
    arts: Vec<&'a str>,
    max_builds: usize,
}

/// Compute the cache key for a search configuration.
///
/// Input collections are sorted before hashing, so the key is independent
/// of the caller's iteration order.
pub fn cache_key(
    character: &str,
    quartz: &[String],
    required_quartz: &[String],
    arts: &[String],
    max_builds: usize,
) -> String {
    fn sorted(items: &[String]) -> Vec<&str> {
        let mut v: Vec<&str> = items.iter().map(String::as_str).collect();
        v.sort_unstable();
        v
    }
    let input = CacheKeyInput {
        character,
        quartz: sorted(quartz),
        required_quartz: sorted(required_quartz),
        arts: sorted(arts),
        max_builds,
    };
    // Serialization of this struct cannot fail: strings and integers only.
    let canonical = serde_json::to_string(&input).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// On-disk cache of ranked build lists.
#[derive(Debug)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up cached builds; any read or parse failure is a miss.
    #[instrument(level = "debug", skip(self))]
    pub fn lookup(&self, key: &str) -> Option<Vec<Build>> {
        let path = self.path_for(key);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(builds) => {
                debug!(path = %path.display(), "cache hit");
                Some(builds)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache entry ignored");
                None
            }
        }
    }

    #[instrument(level = "debug", skip(self, builds))]
    pub fn store(&self, key: &str, builds: &[Build]) -> ApplicationResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ApplicationError::Io {
            context: "create cache directory".to_string(),
            path: self.dir.clone(),
            source: e,
        })?;
        let path = self.path_for(key);
        let content =
            serde_json::to_string(builds).map_err(|e| ApplicationError::InvalidJson {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        fs::write(&path, content).map_err(|e| ApplicationError::Io {
            context: "write cache entry".to_string(),
            path,
            source: e,
        })
    }

    /// Number of cached result sets.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Remove every cache entry; returns how many were deleted.
    pub fn clear(&self) -> ApplicationResult<usize> {
        let entries = self.entries();
        let count = entries.len();
        for path in entries {
            fs::remove_file(&path).map_err(|e| ApplicationError::Io {
                context: "delete cache entry".to_string(),
                path,
                source: e,
            })?;
        }
        Ok(count)
    }

    fn entries(&self) -> Vec<PathBuf> {
        let Ok(read) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read.filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
