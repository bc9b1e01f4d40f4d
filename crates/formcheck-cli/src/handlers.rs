//! Command handlers for CLI subcommands
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

mod check;
mod completions;
mod profiles;

pub use check::handle_check;
pub use completions::handle_completions;
pub use profiles::handle_profiles;
