//! Profile listing command handler
//!
//! Copyright (c) 2025 Formcheck Team
//! Licensed under the Apache-2.0 license

use crate::cli::{OutputFormat, ProfilesArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use formcheck_profiles::ProfileLoader;
use tracing::{info, instrument};

/// Handle the profiles command
#[instrument(skip_all)]
pub fn handle_profiles(args: ProfilesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let path = config.profiles_file(args.file.as_deref())?;
    let profiles = ProfileLoader::new().load(&path)?;
    info!(path = %path.display(), profiles = profiles.len(), "profile file loaded");

    let summaries = profiles.summaries();
    if output.format() != OutputFormat::Human {
        return output.data(&summaries);
    }

    output.info(&format!("{} profile(s) in {}", profiles.len(), path.display()))?;
    let rows = summaries
        .iter()
        .map(|summary| {
            vec![
                summary.name.clone(),
                summary.required.to_string(),
                summary.optional.to_string(),
                summary.require_some.to_string(),
                summary.dependencies.to_string(),
                summary.constrained_fields.to_string(),
                if summary.has_regexp_rules { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output.table(
        &["NAME", "REQUIRED", "OPTIONAL", "REQUIRE_SOME", "DEPENDENCIES", "CONSTRAINED", "REGEXP"],
        rows,
    )
}
