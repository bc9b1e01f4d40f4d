//! Named filter and constraint registry
//!
//! Profiles refer to filters and constraints by name. The registry maps those
//! names to functions. It is owned by the caller and shared with validators
//! through an `Arc`; registration is append-only and lock-guarded so it may
//! happen while other threads evaluate.
//!
//! # Module Organization
//!
//! - [`filters`] - Built-in filters
//! - [`constraints`] - Built-in constraints and constraint methods
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

pub mod constraints;
pub mod filters;

use crate::callable::{ConstraintFn, FilterFn};
use crate::context::ConstraintContext;
use crate::{Error, ParamValue, Result, Verdict};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

const FILTER_PREFIX: &str = "filter_";
const CONSTRAINT_PREFIXES: &[&str] = &["match_", "valid_"];

/// A function exported by a validator package
#[derive(Clone)]
pub enum Export {
    Filter(FilterFn),
    Constraint(ConstraintFn),
}

/// A named bundle of filters and constraints merged on demand.
///
/// Exports follow a naming convention: `filter_*` exports become filters and
/// `match_*` or `valid_*` exports become constraints, registered under the
/// name with the prefix removed. Other exports are not imported.
#[derive(Clone)]
pub struct ValidatorPackage {
    name: String,
    exports: Vec<(String, Export)>,
}

impl ValidatorPackage {
    /// Create an empty package
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: Vec::new(),
        }
    }

    /// Package name, as listed in a profile's `validator_packages`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Export a function under its full (prefixed) name
    pub fn export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.exports.push((name.into(), export));
        self
    }

    /// Export a filter
    pub fn export_filter<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.export(name, Export::Filter(Arc::new(f)))
    }

    /// Export a constraint
    pub fn export_constraint(self, name: impl Into<String>, constraint: ConstraintFn) -> Self {
        self.export(name, Export::Constraint(constraint))
    }
}

impl fmt::Debug for ValidatorPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorPackage")
            .field("name", &self.name)
            .field(
                "exports",
                &self.exports.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Registry of named filters, constraints and validator packages
#[derive(Default)]
pub struct Registry {
    filters: RwLock<HashMap<String, FilterFn>>,
    constraints: RwLock<HashMap<String, ConstraintFn>>,
    packages: RwLock<HashMap<String, ValidatorPackage>>,
    merged: Mutex<BTreeSet<String>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in filters and constraints
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        filters::register_builtins(&registry);
        constraints::register_builtins(&registry);
        registry
    }

    /// Register or replace a filter
    pub fn register_filter<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.insert_filter(name.into(), Arc::new(f));
    }

    /// Register or replace a constraint
    pub fn register_constraint(&self, name: impl Into<String>, constraint: ConstraintFn) {
        let name = name.into();
        tracing::trace!(constraint = %name, method = constraint.is_method(), "registering constraint");
        self.constraints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, constraint);
    }

    /// Register a boolean predicate over the checked value
    pub fn register_predicate<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.register_constraint(name, ConstraintFn::predicate(f));
    }

    /// Register a constraint method
    pub fn register_method<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut ConstraintContext<'_>, &[ParamValue]) -> Result<Verdict> + Send + Sync + 'static,
    {
        self.register_constraint(name, ConstraintFn::method(f));
    }

    /// Make a package available to `validator_packages`
    pub fn register_package(&self, package: ValidatorPackage) {
        self.packages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(package.name.clone(), package);
    }

    /// Look up a filter
    pub fn filter(&self, name: &str) -> Result<FilterFn> {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFilter {
                name: name.to_string(),
            })
    }

    /// Look up a constraint
    pub fn constraint(&self, name: &str) -> Result<ConstraintFn> {
        self.constraints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownConstraint {
                name: name.to_string(),
            })
    }

    /// Import a registered package's exports; merging twice is a no-op
    pub fn merge_package(&self, name: &str) -> Result<()> {
        let mut merged = self.merged.lock().unwrap_or_else(PoisonError::into_inner);
        if merged.contains(name) {
            return Ok(());
        }

        let package = self
            .packages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownPackage {
                name: name.to_string(),
            })?;

        let mut imported = 0usize;
        for (export_name, export) in &package.exports {
            match (import_name(export_name), export) {
                (Some(ImportAs::Filter(short)), Export::Filter(f)) => {
                    self.insert_filter(short.to_string(), f.clone());
                    imported += 1;
                }
                (Some(ImportAs::Constraint(short)), Export::Constraint(c)) => {
                    self.register_constraint(short, c.clone());
                    imported += 1;
                }
                _ => log::warn!(
                    "Skipping export '{}' of validator package '{}': name does not match its kind",
                    export_name,
                    name
                ),
            }
        }

        log::debug!("Merged validator package '{}' ({} exports)", name, imported);
        merged.insert(name.to_string());
        Ok(())
    }

    /// Whether a package has been merged
    pub fn is_merged(&self, name: &str) -> bool {
        self.merged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Sorted names of all registered filters
    pub fn filter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Sorted names of all registered constraints
    pub fn constraint_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .constraints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn insert_filter(&self, name: String, f: FilterFn) {
        tracing::trace!(filter = %name, "registering filter");
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, f);
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("filters", &self.filter_names())
            .field("constraints", &self.constraint_names())
            .finish()
    }
}

enum ImportAs<'a> {
    Filter(&'a str),
    Constraint(&'a str),
}

fn import_name(export_name: &str) -> Option<ImportAs<'_>> {
    if let Some(short) = export_name.strip_prefix(FILTER_PREFIX) {
        return Some(ImportAs::Filter(short));
    }
    CONSTRAINT_PREFIXES
        .iter()
        .find_map(|prefix| export_name.strip_prefix(*prefix))
        .map(ImportAs::Constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown_names() {
        let registry = Registry::new();
        assert!(matches!(
            registry.filter("nope"),
            Err(Error::UnknownFilter { name }) if name == "nope"
        ));
        assert!(matches!(
            registry.constraint("nope"),
            Err(Error::UnknownConstraint { .. })
        ));
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        registry.register_filter("shout", |v| v.to_uppercase());
        registry.register_predicate("short", |v| v.len() < 4);

        let shout = registry.filter("shout").unwrap();
        assert_eq!(shout("hi"), "HI");
        assert!(!registry.constraint("short").unwrap().is_method());
        assert_eq!(registry.filter_names(), vec!["shout"]);
    }

    #[test]
    fn test_merge_package_by_convention() {
        let registry = Registry::new();
        registry.register_package(
            ValidatorPackage::new("shop")
                .export_filter("filter_sku", |v| v.trim().to_uppercase())
                .export_constraint("match_sku", ConstraintFn::predicate(|v| v.starts_with("SKU")))
                .export_constraint("valid_coupon", ConstraintFn::predicate(|v| v.len() == 8))
                .export_constraint("helper", ConstraintFn::predicate(|_| true)),
        );

        registry.merge_package("shop").unwrap();
        assert!(registry.is_merged("shop"));
        assert!(registry.filter("sku").is_ok());
        assert!(registry.constraint("sku").is_ok());
        assert!(registry.constraint("coupon").is_ok());
        assert!(registry.constraint("helper").is_err());

        // second merge is a no-op
        registry.merge_package("shop").unwrap();
        assert_eq!(registry.constraint_names(), vec!["coupon", "sku"]);
    }

    #[test]
    fn test_merge_unknown_package() {
        let registry = Registry::new();
        assert!(matches!(
            registry.merge_package("missing"),
            Err(Error::UnknownPackage { .. })
        ));
        assert!(!registry.is_merged("missing"));
    }

    #[test]
    fn test_builtins_present() {
        let registry = Registry::with_builtins();
        assert!(registry.filter("trim").is_ok());
        assert!(registry.filter("ucfirst").is_ok());
        assert!(registry.constraint("email").is_ok());
        assert!(registry.constraint("length_between").unwrap().is_method());
    }
}
