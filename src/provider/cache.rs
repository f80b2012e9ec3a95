use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::types::SessionKind;

/// Configuration for provider response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
}

/// Get the platform-appropriate cache directory for paddock
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("paddock/http-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/paddock/http-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remove a cache directory. A directory that does not exist is not an error.
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

pub fn calendar_key(season: u16) -> String {
    format!("calendar:{}", season)
}

pub fn results_key(season: u16, round: u32, session: SessionKind) -> String {
    format!("results:{}:{}:{}", season, round, session)
}

/// Read-through store for raw provider response bodies.
///
/// Uses cacache for disk persistence and an in-memory HashMap for repeat hits
/// within a process. Entries never expire; `paddock cache clear` is the only
/// invalidation.
#[derive(Clone)]
pub struct ResponseCache {
    memory: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    cache_path: PathBuf,
}

impl ResponseCache {
    /// Open (and create if absent) the cache directory.
    pub fn open(cache_path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_path).with_context(|| {
            format!("Failed to create cache directory at {}", cache_path.display())
        })?;

        Ok(Self {
            memory: Arc::new(Mutex::new(HashMap::new())),
            cache_path,
        })
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.cache_path
    }

    /// Look up a body, memory first, then disk.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(body) = memory.get(key) {
                tracing::debug!("cache hit (memory): {}", key);
                return Some(body.clone());
            }
        }

        let body = cacache::read_sync(&self.cache_path, key).ok()?;
        tracing::debug!("cache hit (disk): {}", key);

        // Populate in-memory cache for subsequent hits
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), body.clone());

        Some(body)
    }

    /// Store a body in memory and on disk. Disk failures are logged, not returned.
    pub fn put(&self, key: &str, body: &[u8]) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), body.to_vec());

        if let Err(e) = cacache::write_sync(&self.cache_path, key, body) {
            tracing::warn!("failed to write cache entry {}: {}", key, e);
        }
    }

    /// Clear the in-memory layer; disk entries stay.
    #[cfg(test)]
    pub(crate) fn clear_memory(&self) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
