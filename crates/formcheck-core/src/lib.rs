//! Formcheck Core - Profile evaluation engine for form-like records
//!
//! This crate classifies every field of an input record as valid, missing,
//! invalid or unknown according to a declarative validation profile, applying
//! filters, dynamic required-ness rules and ordered constraint chains on the
//! way.
//!
//! # Main Components
//!
//! - **Profiles**: required/optional sets, regexp rules, dependencies,
//!   filters, constraints and untainting options
//! - **Registry**: named filters, constraints and validator packages
//! - **Engine**: the evaluation pipeline behind [`Validator::evaluate`]
//! - **Results**: classification queries and message formatting
//!
//! # Example
//!
//! ```
//! use formcheck_core::{evaluate, FieldValue, Profile, Record};
//!
//! fn example() -> formcheck_core::Result<()> {
//!     let profile = Profile::builder()
//!         .required(["email"])
//!         .optional(["name"])
//!         .constraint("email", "email")
//!         .field_filter("name", "ucfirst")
//!         .build();
//!
//!     let mut input = Record::new();
//!     input.insert("email".into(), FieldValue::scalar("not-an-email"));
//!     input.insert("name".into(), FieldValue::scalar("mark"));
//!
//!     let results = evaluate(&profile, &input)?;
//!     assert!(results.invalid_constraints("email").is_some());
//!     assert_eq!(results.valid_value("name"), Some(&FieldValue::scalar("Mark")));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod callable;
pub mod context;
pub mod engine;
pub mod error;
pub mod input;
pub mod messages;
pub mod pattern;
pub mod profile;
pub mod registry;
pub mod results;
pub mod value;

// Re-export main types for convenience
pub use callable::{filter_fn, param_int, param_str, ConstraintFn, FilterFn, ParamValue, Verdict};
pub use context::ConstraintContext;
pub use engine::{evaluate, Validator};
pub use error::{Error, Result};
pub use input::{record_from_json, FormParams, InputSource, Record};
pub use messages::{FieldFailure, MessageConfig, MessageFormatter, Messages};
pub use pattern::FieldPattern;
pub use profile::{
    ConstraintSpec, Dependency, FilterSpec, Param, Profile, ProfileBuilder, RequireSome,
};
pub use registry::{Export, Registry, ValidatorPackage};
pub use results::ValidationResults;
pub use value::FieldValue;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
