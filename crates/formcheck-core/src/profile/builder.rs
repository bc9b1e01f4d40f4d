//! Builder for creating validation profiles
//!
//! This module provides a fluent builder API for constructing profiles in
//! code, including the parts that have no data form (inline filter closures,
//! predicate and method constraints, computed dependencies).
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use super::constraint::ConstraintSpec;
use super::{Dependency, FilterSpec, Profile, RequireSome};
use crate::messages::MessageConfig;
use crate::pattern::FieldPattern;
use crate::FieldValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builder for creating validation profiles
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    /// Create an empty profile builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add required fields
    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile.required.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add optional fields
    pub fn optional<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile.optional.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Require every input field matching `pattern`
    pub fn required_regexp(mut self, pattern: impl Into<FieldPattern>) -> Self {
        self.profile.required_regexp = Some(pattern.into());
        self
    }

    /// Accept every input field matching `pattern` as optional
    pub fn optional_regexp(mut self, pattern: impl Into<FieldPattern>) -> Self {
        self.profile.optional_regexp = Some(pattern.into());
        self
    }

    /// Require at least `minimum` of `members`
    pub fn require_some<I, S>(mut self, group: impl Into<String>, minimum: usize, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .require_some
            .insert(group.into(), RequireSome::new(minimum, members));
        self
    }

    /// Require `fields` whenever `trigger` is present
    pub fn dependency<I, S>(mut self, trigger: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile.dependencies.insert(
            trigger.into(),
            Dependency::Fields(fields.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Require `fields` when `trigger` carries `value`
    pub fn dependency_on_value<I, S>(
        mut self,
        trigger: impl Into<String>,
        value: impl Into<String>,
        fields: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .profile
            .dependencies
            .entry(trigger.into())
            .or_insert_with(|| Dependency::ByValue(BTreeMap::new()));
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        match entry {
            Dependency::ByValue(map) => {
                map.entry(value.into()).or_default().extend(fields);
            }
            other => {
                let mut map = BTreeMap::new();
                map.insert(value.into(), fields);
                *other = Dependency::ByValue(map);
            }
        }
        self
    }

    /// Require the fields computed from the trigger's value
    pub fn computed_dependency<F>(mut self, trigger: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FieldValue) -> Vec<String> + Send + Sync + 'static,
    {
        self.profile
            .dependencies
            .insert(trigger.into(), Dependency::Computed(Arc::new(f)));
        self
    }

    /// When any member of the group is present, all members are required
    pub fn dependency_group<I, S>(mut self, group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .dependency_groups
            .insert(group.into(), members.into_iter().map(Into::into).collect());
        self
    }

    /// Value used when `field` is absent after filtering
    pub fn default_value(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.profile.defaults.insert(field.into(), value.into());
        self
    }

    /// Add a filter applied to every field
    pub fn filter(mut self, filter: impl Into<FilterSpec>) -> Self {
        self.profile.filters.push(filter.into());
        self
    }

    /// Add a filter for one field
    pub fn field_filter(mut self, field: impl Into<String>, filter: impl Into<FilterSpec>) -> Self {
        self.profile
            .field_filters
            .entry(field.into())
            .or_default()
            .push(filter.into());
        self
    }

    /// Add a filter for every field matching `pattern`
    pub fn field_filter_regexp(
        mut self,
        pattern: impl Into<FieldPattern>,
        filter: impl Into<FilterSpec>,
    ) -> Self {
        self.profile
            .field_filter_regexp_map
            .push((pattern.into(), vec![filter.into()]));
        self
    }

    /// Append a constraint to a field
    pub fn constraint(mut self, field: impl Into<String>, constraint: impl Into<ConstraintSpec>) -> Self {
        self.profile
            .constraints
            .entry(field.into())
            .or_default()
            .push(constraint.into());
        self
    }

    /// Append a constraint invoked as a method
    pub fn constraint_method(
        self,
        field: impl Into<String>,
        constraint: impl Into<ConstraintSpec>,
    ) -> Self {
        let constraint = constraint.into().as_method();
        self.constraint(field, constraint)
    }

    /// Attach a constraint to every field matching `pattern`
    pub fn constraint_regexp(
        mut self,
        pattern: impl Into<FieldPattern>,
        constraint: impl Into<ConstraintSpec>,
    ) -> Self {
        self.profile
            .constraint_regexp_map
            .push((pattern.into(), vec![constraint.into()]));
        self
    }

    /// Untaint every constrained field
    pub fn untaint_all_constraints(mut self) -> Self {
        self.profile.untaint_all_constraints = true;
        self
    }

    /// Untaint the listed fields
    pub fn untaint_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .untaint_constraint_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Untaint every field matching `pattern`
    pub fn untaint_regexp(mut self, pattern: impl Into<FieldPattern>) -> Self {
        self.profile.untaint_regexp_map.push(pattern.into());
        self
    }

    /// Report absent optional fields that were submitted empty as valid
    pub fn missing_optional_valid(mut self) -> Self {
        self.profile.missing_optional_valid = true;
        self
    }

    /// Merge a registered validator package before evaluation
    pub fn validator_package(mut self, name: impl Into<String>) -> Self {
        self.profile.validator_packages.push(name.into());
        self
    }

    /// Set the message configuration
    pub fn messages(mut self, msgs: MessageConfig) -> Self {
        self.profile.msgs = msgs;
        self
    }

    /// Build the profile
    pub fn build(self) -> Profile {
        self.profile
    }
}
