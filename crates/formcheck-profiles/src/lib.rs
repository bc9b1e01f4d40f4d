//! Formcheck Profiles - named validation profiles loaded from files
//!
//! A profile file is a YAML or JSON mapping of profile name to profile
//! definition. Each definition uses the same option keys as
//! [`formcheck_core::Profile::from_value`].
//!
//! ```yaml
//! signup:
//!   required: [email, name]
//!   constraints:
//!     email: email
//! contact:
//!   require_some:
//!     reach: [phone, email]
//! ```
//!
//! [`ProfileLoader`] parses such files into a [`ProfileSet`] and caches the
//! result by canonical path, reloading when the file changes on disk.
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod set;

pub use loader::{
    CacheConfig, CacheStats, Format, LoaderConfig, LoaderError, LoaderResult, ProfileCache,
    ProfileLoader, ProfileParser,
};
pub use set::{ProfileSet, ProfileSummary};
