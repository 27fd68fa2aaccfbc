use crate::cli::ValidateConfigArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::{CliError, Result};
use tracing::info;

/// Loads, merges and validates a configuration file, then prints the effective settings.
pub fn run(args: ValidateConfigArgs) -> Result<()> {
    let rendered = effective_config(&args)?;
    println!("✓ Configuration '{}' is valid.\n", args.config.display());
    print!("{}", rendered);
    Ok(())
}

fn effective_config(args: &ValidateConfigArgs) -> Result<String> {
    let mut partial = PartialAnalysisConfig::from_file(&args.config)?;
    partial.apply_set_values(&args.set_values)?;
    let config = partial.build()?;
    info!("Configuration validated.");
    toml::to_string(&config).map_err(|e| CliError::Other(e.into()))
}
