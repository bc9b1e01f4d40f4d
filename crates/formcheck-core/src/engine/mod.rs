//! Profile evaluation engine
//!
//! [`Validator::evaluate`] runs one input record through a profile:
//!
//! 1. normalise the input into a working set
//! 2. merge the profile's validator packages into the registry
//! 3. apply unconditional, per-field and pattern-mapped filters
//! 4. resolve required and optional sets, including regexp matches and
//!    require_some membership
//! 5. strip empty values
//! 6. add fields required through dependencies and dependency groups
//! 7. remove unknown fields
//! 8. apply defaults
//! 9. compute missing fields and unsatisfied require_some groups
//! 10. attach pattern-mapped constraints and evaluate every constraint,
//!     untainting where configured
//! 11. backfill submitted-but-empty optional fields when
//!     `missing_optional_valid` is set
//!
//! The order is part of the contract: for example regexp-driven required-ness
//! sees the filtered key set, and unknown fields never reach a constraint.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

mod constraints;
mod filtering;
mod requirements;


use crate::input::InputSource;
use crate::messages::Messages;
use crate::profile::Profile;
use crate::registry::Registry;
use crate::{FieldValue, Result, ValidationResults};
use constraints::{evaluate_constraints, ConstraintPlan, UntaintPolicy};
use requirements::Requirements;
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

/// Evaluates records against profiles using a shared registry
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<Registry>,
}

impl Validator {
    /// Create a validator over a caller-owned registry
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Create a validator with a fresh registry holding the built-ins
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(Registry::with_builtins()))
    }

    /// The registry used for name lookups
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Classify every field of `input` according to `profile`.
    ///
    /// Fails only on structural errors in the profile; missing, invalid and
    /// unknown fields are reported in the returned results.
    #[instrument(level = "debug", skip_all, fields(input_fields = tracing::field::Empty))]
    pub fn evaluate(&self, profile: &Profile, input: &dyn InputSource) -> Result<ValidationResults> {
        let original = input.to_record();
        tracing::Span::current().record("input_fields", original.len());

        for package in &profile.validator_packages {
            self.registry.merge_package(package)?;
        }

        // structural checks before any data is touched
        Messages::new(profile.msgs.clone())?;
        let plan = ConstraintPlan::compile(profile, &self.registry)?;
        let untaint = UntaintPolicy::from_profile(profile)?;

        let mut working = original.clone();
        filtering::apply_filters(&self.registry, profile, &mut working)?;

        let mut declared = Requirements::resolve(profile, &working)?;
        requirements::strip_empty(&mut working);
        declared.add_dependencies(profile, &working);

        let unknown = requirements::partition_unknown(&declared, &mut working);
        requirements::apply_defaults(profile, &unknown, &mut working);
        let missing = requirements::missing_fields(profile, &declared, &working);
        debug!(
            required = declared.required.len(),
            missing = missing.len(),
            unknown = unknown.len(),
            "requirements resolved"
        );

        let attached = plan.expand(&working);
        let classified: BTreeSet<String> = missing.union(&unknown).cloned().collect();
        let invalid = evaluate_constraints(&attached, &untaint, &classified, input, &mut working)?;

        if profile.missing_optional_valid {
            for field in original.keys() {
                let unclassified = !working.contains_key(field)
                    && !invalid.contains_key(field)
                    && !missing.contains(field)
                    && !unknown.contains(field);
                if unclassified && declared.optional.contains(field) {
                    working.insert(field.clone(), FieldValue::scalar(""));
                }
            }
        }

        debug!(
            valid = working.len(),
            invalid = invalid.len(),
            "evaluation complete"
        );
        Ok(ValidationResults::new(
            working,
            missing,
            invalid,
            unknown,
            profile.msgs.clone(),
        ))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn default_validator() -> &'static Validator {
    static DEFAULT: OnceLock<Validator> = OnceLock::new();
    DEFAULT.get_or_init(Validator::with_builtins)
}

/// Evaluate with a process-wide registry holding only the built-ins.
///
/// Use a [`Validator`] with its own [`Registry`] to add filters, constraints
/// or validator packages.
pub fn evaluate(profile: &Profile, input: &dyn InputSource) -> Result<ValidationResults> {
    default_validator().evaluate(profile, input)
}
