//! Profile loader with caching
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::{
    cache::{CacheConfig, CacheStats, ProfileCache},
    error::LoaderResult,
    parser::ProfileParser,
};
use crate::set::ProfileSet;
use formcheck_core::Profile;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Configuration for loader behavior
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    pub cache: CacheConfig,
}

/// Loads profile files into [`ProfileSet`]s, caching by path
#[derive(Debug)]
pub struct ProfileLoader {
    config: LoaderConfig,
    cache: ProfileCache,
    parser: ProfileParser,
}

impl ProfileLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            cache: ProfileCache::with_config(config.cache.clone()),
            parser: ProfileParser::new(),
            config,
        }
    }

    /// Load every profile in a file, reusing the cached set when the file is unchanged
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn load(&mut self, path: &Path) -> LoaderResult<Arc<ProfileSet>> {
        if let Some(cached) = self.cache.get(path)? {
            debug!("profile set served from cache");
            return Ok(cached);
        }

        let definitions = self.parser.parse_file(path)?;
        let profiles = Arc::new(ProfileSet::from_map(&definitions, path)?);
        debug!(profiles = profiles.len(), "profile file loaded");

        self.cache.put(path, Arc::clone(&profiles))?;
        Ok(profiles)
    }

    /// Load one named profile from a file
    pub fn load_profile(&mut self, path: &Path, name: &str) -> LoaderResult<Profile> {
        let profiles = self.load(path)?;
        profiles.get(name).cloned()
    }

    /// Reload a file, bypassing the cache
    pub fn reload(&mut self, path: &Path) -> LoaderResult<Arc<ProfileSet>> {
        self.cache.remove(path)?;
        self.load(path)
    }

    pub fn is_cached(&self, path: &Path) -> LoaderResult<bool> {
        self.cache.contains(path)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop stale cache entries, returning how many were removed
    pub fn cleanup_cache(&mut self) -> usize {
        self.cache.cleanup_expired()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::error::LoaderError;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_loader_creation() {
        let loader = ProfileLoader::new();
        assert!(loader.config().cache.enabled);

        let loader = ProfileLoader::with_config(LoaderConfig {
            cache: CacheConfig {
                enabled: false,
                ..Default::default()
            },
        });
        assert!(!loader.cache_stats().enabled);
    }

    #[test]
    fn test_load_caches_set() -> LoaderResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profiles.yaml");
        fs::write(&path, "signup:\n  required: [email]\n")?;

        let mut loader = ProfileLoader::new();
        let first = loader.load(&path)?;
        assert!(loader.is_cached(&path)?);

        let second = loader.load(&path)?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn test_reload_picks_up_changes() -> LoaderResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"{"signup": {"required": ["email"]}}"#)?;

        let mut loader = ProfileLoader::new();
        assert_eq!(loader.load(&path)?.len(), 1);

        fs::write(&path, r#"{"signup": {}, "contact": {}}"#)?;
        assert_eq!(loader.reload(&path)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_modified_file_invalidates_cache() -> LoaderResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profiles.yaml");
        fs::write(&path, "signup: {}\n")?;

        let mut loader = ProfileLoader::new();
        let first = loader.load(&path)?;

        // coarse mtime resolution on some filesystems
        std::thread::sleep(Duration::from_millis(1100));
        fs::write(&path, "signup: {}\ncontact: {}\n")?;

        let second = loader.load(&path)?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.contains("contact"));
        Ok(())
    }

    #[test]
    fn test_load_profile_by_name() -> LoaderResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profiles.yaml");
        fs::write(&path, "signup:\n  optional: [name]\n")?;

        let mut loader = ProfileLoader::new();
        let profile = loader.load_profile(&path, "signup")?;
        assert_eq!(profile.optional, vec!["name"]);

        let err = loader.load_profile(&path, "checkout").unwrap_err();
        assert!(matches!(err, LoaderError::ProfileNotFound { .. }));
        Ok(())
    }

    #[test]
    fn test_invalid_file_not_cached() -> LoaderResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profiles.yaml");
        fs::write(&path, "signup:\n  requird: [email]\n")?;

        let mut loader = ProfileLoader::new();
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidProfile { .. }));
        assert!(!loader.is_cached(&path)?);

        loader.clear_cache();
        assert_eq!(loader.cache_stats().total_entries, 0);
        Ok(())
    }
}
