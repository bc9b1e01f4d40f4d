//! Profile-file loading
//!
//! - YAML and JSON parsing, chosen by file extension
//! - Profile construction with per-profile error context
//! - In-memory caching keyed by canonical path with modification-time checks
//!
//! # Example Usage
//!
//! ```no_run
//! use formcheck_profiles::ProfileLoader;
//! use std::path::Path;
//!
//! let mut loader = ProfileLoader::new();
//! let profiles = loader.load(Path::new("profiles.yaml"))?;
//! for name in profiles.names() {
//!     println!("{}", name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod parser;
pub mod profile_loader;

pub use cache::{CacheConfig, CacheEntry, CacheStats, ProfileCache};
pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, ProfileParser};
pub use profile_loader::{LoaderConfig, ProfileLoader};
