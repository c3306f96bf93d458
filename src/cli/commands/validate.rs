//! `validate` command handler.

use crate::cli::args::ValidateArgs;
use crate::config::ConfigLoader;
use crate::error::SimError;

/// Load and validate each configuration file, stopping at the first
/// failure.
///
/// # Errors
///
/// Returns the config error of the first file that fails to load.
pub fn run(args: &ValidateArgs) -> Result<(), SimError> {
    let loader = ConfigLoader::default();
    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let load_result = loader.load(path)?;

        for warning in &load_result.warnings {
            tracing::warn!(
                location = warning.location.as_deref().unwrap_or("<unknown>"),
                "{}",
                warning.message
            );
        }

        println!("{}: ok", path.display());
    }
    Ok(())
}
