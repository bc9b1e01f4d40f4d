//! Caching of loaded profile sets
//!
//! Entries are keyed by canonical path and dropped when the file on disk is
//! newer than the cached copy or the entry outlives the configured age.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::set::ProfileSet;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::trace;

/// Cached profile set and the file state it was built from
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub profiles: Arc<ProfileSet>,
    pub cached_at: SystemTime,
    pub file_mtime: SystemTime,
    pub file_path: PathBuf,
}

impl CacheEntry {
    pub fn new(profiles: Arc<ProfileSet>, file_path: PathBuf, file_mtime: SystemTime) -> Self {
        Self {
            profiles,
            cached_at: SystemTime::now(),
            file_mtime,
            file_path,
        }
    }

    /// Check if this cache entry is still valid
    pub fn is_valid(&self, current_mtime: SystemTime, max_age: Option<Duration>) -> bool {
        if current_mtime > self.file_mtime {
            return false;
        }

        match (max_age, self.cached_at.elapsed()) {
            (Some(max_age), Ok(elapsed)) => elapsed <= max_age,
            _ => true,
        }
    }

    pub fn age(&self) -> Option<Duration> {
        self.cached_at.elapsed().ok()
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached files
    pub max_entries: usize,
    /// Maximum age for cache entries
    pub max_age: Option<Duration>,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 64,
            max_age: Some(Duration::from_secs(3600)),
            enabled: true,
        }
    }
}

/// In-memory cache of profile sets with LRU eviction
#[derive(Debug)]
pub struct ProfileCache {
    entries: HashMap<PathBuf, CacheEntry>,
    config: CacheConfig,
    access_order: Vec<PathBuf>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            access_order: Vec::new(),
        }
    }

    /// Get a cached set if it exists and is still valid
    pub fn get(&mut self, path: &Path) -> LoaderResult<Option<Arc<ProfileSet>>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let canonical_path = canonicalize(path)?;
        let Some(entry) = self.entries.get(&canonical_path) else {
            return Ok(None);
        };

        let current_mtime = modified(path)?;
        if entry.is_valid(current_mtime, self.config.max_age) {
            let profiles = Arc::clone(&entry.profiles);
            self.touch(&canonical_path);
            Ok(Some(profiles))
        } else {
            trace!(path = %canonical_path.display(), "cache entry stale");
            self.remove_path(&canonical_path);
            Ok(None)
        }
    }

    /// Cache a profile set for `path`
    pub fn put(&mut self, path: &Path, profiles: Arc<ProfileSet>) -> LoaderResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let canonical_path = canonicalize(path)?;
        let file_mtime = modified(path)?;

        if !self.entries.contains_key(&canonical_path) && self.entries.len() >= self.config.max_entries {
            self.evict_lru();
        }

        let entry = CacheEntry::new(profiles, canonical_path.clone(), file_mtime);
        self.entries.insert(canonical_path.clone(), entry);
        self.touch(&canonical_path);

        Ok(())
    }

    /// Remove a specific entry from cache
    pub fn remove(&mut self, path: &Path) -> LoaderResult<bool> {
        let canonical_path = canonicalize(path)?;
        let removed = self.entries.remove(&canonical_path).is_some();
        self.access_order.retain(|p| p != &canonical_path);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    pub fn contains(&self, path: &Path) -> LoaderResult<bool> {
        let canonical_path = canonicalize(path)?;
        Ok(self.entries.contains_key(&canonical_path))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let ages: Vec<Duration> = self.entries.values().filter_map(CacheEntry::age).collect();
        let average_age = match u32::try_from(ages.len()) {
            Ok(count) if count > 0 => Some(ages.iter().sum::<Duration>() / count),
            _ => None,
        };

        CacheStats {
            total_entries: self.entries.len(),
            max_entries: self.config.max_entries,
            average_age,
            enabled: self.config.enabled,
        }
    }

    /// Drop entries whose file changed, disappeared or aged out
    pub fn cleanup_expired(&mut self) -> usize {
        if !self.config.enabled {
            return 0;
        }

        let expired: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|(_, entry)| match modified(&entry.file_path) {
                Ok(mtime) => !entry.is_valid(mtime, self.config.max_age),
                Err(_) => true,
            })
            .map(|(path, _)| path.clone())
            .collect();

        for path in &expired {
            self.remove_path(path);
        }
        expired.len()
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.access_order.first().cloned() {
            trace!(path = %oldest.display(), "evicting least recently used profile file");
            self.remove_path(&oldest);
        }
    }

    fn touch(&mut self, path: &Path) {
        self.access_order.retain(|p| p != path);
        self.access_order.push(path.to_path_buf());
    }

    fn remove_path(&mut self, path: &Path) {
        self.entries.remove(path);
        self.access_order.retain(|p| p != path);
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new()
    }
}

fn canonicalize(path: &Path) -> LoaderResult<PathBuf> {
    path.canonicalize()
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

fn modified(path: &Path) -> LoaderResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub average_age: Option<Duration>,
    pub enabled: bool,
}

impl CacheStats {
    /// Cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.total_entries as f64 / self.max_entries as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn empty_set() -> Arc<ProfileSet> {
        Arc::new(ProfileSet::default())
    }

    #[test]
    fn test_cache_entry_validity() {
        let mtime = SystemTime::now();
        let entry = CacheEntry::new(empty_set(), PathBuf::from("profiles.yaml"), mtime);

        assert!(entry.is_valid(mtime, None));
        assert!(!entry.is_valid(mtime + Duration::from_secs(1), None));

        std::thread::sleep(Duration::from_millis(2));
        assert!(!entry.is_valid(mtime, Some(Duration::from_millis(1))));
    }

    #[test]
    fn test_cache_operations() -> LoaderResult<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("profiles.yaml");
        fs::write(&file_path, "signup: {}")?;

        let mut cache = ProfileCache::new();
        assert!(cache.get(&file_path)?.is_none());

        cache.put(&file_path, empty_set())?;
        assert!(cache.get(&file_path)?.is_some());
        assert!(cache.contains(&file_path)?);

        assert!(cache.remove(&file_path)?);
        assert!(cache.get(&file_path)?.is_none());
        Ok(())
    }

    #[test]
    fn test_cache_lru_eviction() -> LoaderResult<()> {
        let dir = tempdir()?;
        let mut cache = ProfileCache::with_config(CacheConfig {
            max_entries: 2,
            max_age: None,
            enabled: true,
        });

        let files: Vec<PathBuf> = (1..=3)
            .map(|i| dir.path().join(format!("profiles{}.yaml", i)))
            .collect();
        for file in &files {
            fs::write(file, "signup: {}")?;
        }

        cache.put(&files[0], empty_set())?;
        cache.put(&files[1], empty_set())?;
        // touch the first so the second becomes least recently used
        cache.get(&files[0])?;
        cache.put(&files[2], empty_set())?;

        assert!(cache.contains(&files[0])?);
        assert!(!cache.contains(&files[1])?);
        assert!(cache.contains(&files[2])?);
        Ok(())
    }

    #[test]
    fn test_cleanup_removes_deleted_files() -> LoaderResult<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("profiles.json");
        fs::write(&file_path, "{}")?;

        let mut cache = ProfileCache::new();
        cache.put(&file_path, empty_set())?;
        fs::remove_file(&file_path)?;

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.stats().total_entries, 0);
        Ok(())
    }

    #[test]
    fn test_disabled_cache() -> LoaderResult<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("profiles.yaml");
        fs::write(&file_path, "signup: {}")?;

        let mut cache = ProfileCache::with_config(CacheConfig {
            max_entries: 10,
            max_age: None,
            enabled: false,
        });

        cache.put(&file_path, empty_set())?;
        assert!(cache.get(&file_path)?.is_none());
        assert!(!cache.contains(&file_path)?);
        assert!(!cache.stats().enabled);
        Ok(())
    }

    #[test]
    fn test_cache_stats() {
        let stats = ProfileCache::new().stats();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.max_entries, 64);
        assert_eq!(stats.utilization(), 0.0);
        assert!(stats.average_age.is_none());
    }
}
