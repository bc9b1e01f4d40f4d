//! Named profile collections
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use formcheck_core::Profile;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Profiles from one file, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    source: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    /// Build every profile in a parsed profile file.
    ///
    /// The first definition the engine rejects fails the whole set.
    pub fn from_map(definitions: &Map<String, Value>, source: &Path) -> LoaderResult<Self> {
        let profiles = definitions
            .iter()
            .map(|(name, definition)| {
                Profile::from_value(definition)
                    .map(|profile| (name.clone(), profile))
                    .map_err(|e| LoaderError::invalid_profile(name, source.to_path_buf(), e))
            })
            .collect::<LoaderResult<BTreeMap<_, _>>>()?;

        Ok(Self {
            source: source.to_path_buf(),
            profiles,
        })
    }

    /// Add or replace a profile
    pub fn insert(&mut self, name: impl Into<String>, profile: Profile) -> Option<Profile> {
        self.profiles.insert(name.into(), profile)
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> LoaderResult<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| LoaderError::profile_not_found(name, self.source.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The file this set was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// One summary per profile, for listings
    pub fn summaries(&self) -> Vec<ProfileSummary> {
        self.iter()
            .map(|(name, profile)| ProfileSummary::new(name, profile))
            .collect()
    }
}

/// Counts describing one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub required: usize,
    pub optional: usize,
    pub require_some: usize,
    pub dependencies: usize,
    pub constrained_fields: usize,
    pub has_regexp_rules: bool,
}

impl ProfileSummary {
    pub fn new(name: &str, profile: &Profile) -> Self {
        let has_regexp_rules = profile.required_regexp.is_some()
            || profile.optional_regexp.is_some()
            || !profile.constraint_regexp_map.is_empty()
            || !profile.field_filter_regexp_map.is_empty();

        Self {
            name: name.to_string(),
            required: profile.required.len(),
            optional: profile.optional.len(),
            require_some: profile.require_some.len(),
            dependencies: profile.dependencies.len() + profile.dependency_groups.len(),
            constrained_fields: profile.constraints.len(),
            has_regexp_rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definitions(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_builds_every_profile() -> LoaderResult<()> {
        let map = definitions(json!({
            "signup": {"required": ["email", "name"], "constraints": {"email": "email"}},
            "contact": {"require_some": {"reach": ["phone", "email"]}}
        }));
        let set = ProfileSet::from_map(&map, Path::new("profiles.yaml"))?;

        assert_eq!(set.len(), 2);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["contact", "signup"]);
        assert_eq!(set.get("signup")?.required, vec!["email", "name"]);
        assert_eq!(set.source(), Path::new("profiles.yaml"));
        Ok(())
    }

    #[test]
    fn test_unknown_profile_name() {
        let set = ProfileSet::default();
        let err = set.get("missing").unwrap_err();
        assert!(matches!(err, LoaderError::ProfileNotFound { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_invalid_definition_names_profile() {
        let map = definitions(json!({
            "good": {"required": ["a"]},
            "bad": {"requird": ["a"]}
        }));
        let err = ProfileSet::from_map(&map, Path::new("profiles.json")).unwrap_err();
        match err {
            LoaderError::InvalidProfile { name, source, .. } => {
                assert_eq!(name, "bad");
                assert!(matches!(
                    source,
                    formcheck_core::Error::UnknownProfileKey { ref key } if key == "requird"
                ));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_summaries() -> LoaderResult<()> {
        let map = definitions(json!({
            "order": {
                "required": ["item"],
                "optional": ["note", "gift"],
                "optional_regexp": "/^extra_/",
                "dependencies": {"gift": ["recipient"]},
                "constraints": {"item": "/^[A-Z]+$/"}
            }
        }));
        let set = ProfileSet::from_map(&map, Path::new("profiles.json"))?;
        let summary = &set.summaries()[0];

        assert_eq!(summary.name, "order");
        assert_eq!(summary.required, 1);
        assert_eq!(summary.optional, 2);
        assert_eq!(summary.dependencies, 1);
        assert_eq!(summary.constrained_fields, 1);
        assert!(summary.has_regexp_rules);
        Ok(())
    }
}
