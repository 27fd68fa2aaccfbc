use crate::cli::AnalyzeArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use nucleoscan::{
    core::io::{snapshot::SnapshotFile, traits::StructureFile},
    engine::progress::ProgressReporter,
    workflows::{analyze, report},
};
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    run_with_progress(args, CliProgressHandler::new())
}

pub(crate) fn run_with_progress(args: AnalyzeArgs, progress_handler: CliProgressHandler) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = PartialAnalysisConfig::from_optional_file(args.config.as_deref())?.merge_with_cli(&args)?;

    info!("Loading input structure from {:?}", &args.input);
    let structure =
        SnapshotFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Analyzing {} residue(s)...", structure.len());
    info!("Invoking the core analysis workflow...");
    let result = analyze::run(&structure, &config, &reporter)?;

    let summary = result.summary;
    if summary.pairs == 0 {
        warn!("Workflow completed but found no base pairs.");
        println!("Warning: no base pairs were found.");
    }

    let paths = report::write_reports(&args.output, &structure, &result)?;

    println!(
        "✓ {} pair(s) in {} helix(es), {} circular; {} step(s).",
        summary.pairs, summary.helices, summary.circular_helices, summary.steps
    );
    for helix in result.organization.helices() {
        if helix.has_mixed_direction {
            println!(
                "  Note: a helix of {} pair(s) has an undetermined strand direction.",
                helix.len()
            );
        }
    }
    println!("  Reports written to: {}", args.output.display());
    info!(
        pairs = %paths.pairs.display(),
        steps = %paths.steps.display(),
        helical = %paths.helical.display(),
        "Report files written."
    );

    Ok(())
}
