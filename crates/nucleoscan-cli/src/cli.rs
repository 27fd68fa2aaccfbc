use clap::{Args, Parser, Subcommand, ValueEnum};
use nucleoscan::engine::config::{OrderingMode, SelectionStrategyKind, TieBreak};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "NucleoScan CLI - Identify base pairs, organize helices and compute step and helical parameters for nucleic-acid structures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find base pairs, order them into helices and write parameter reports.
    Analyze(AnalyzeArgs),
    /// Load and validate a configuration file, then print the effective configuration.
    ValidateConfig(ValidateConfigArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Mutual-best-match: each residue in at most one pair
    Best,
    /// Every pair that passes validation
    All,
}

impl From<StrategyArg> for SelectionStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Best => SelectionStrategyKind::BestPair,
            StrategyArg::All => SelectionStrategyKind::AllPairs,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingArg {
    /// Backbone linkage first, chain data late
    Legacy,
    /// Chain connectivity takes precedence
    Chain,
}

impl From<OrderingArg> for OrderingMode {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Legacy => OrderingMode::LegacyFiveToThree,
            OrderingArg::Chain => OrderingMode::ChainBased,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakArg {
    Lowest,
    Highest,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Lowest => TieBreak::LowestLegacyIndex,
            TieBreakArg::Highest => TieBreak::HighestLegacyIndex,
        }
    }
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    // --- Core Arguments ---
    /// Path to the input structure snapshot (TOML with residues, frames and atoms).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory for the CSV reports (created if missing).
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format. Every section is optional.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Selection Overrides ---
    /// Pair selection strategy.
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Which partner wins when two candidates score equally.
    #[arg(long, value_enum, value_name = "RULE")]
    pub tie_break: Option<TieBreakArg>,

    // --- Helix Overrides ---
    /// Evidence priority for strand assignment.
    #[arg(long, value_enum, value_name = "MODE")]
    pub ordering: Option<OrderingArg>,

    // --- Parameter Overrides ---
    /// Offset of the first step within each helix.
    #[arg(long, value_name = "INT")]
    pub start: Option<usize>,

    /// Compute every n-th step only.
    #[arg(long, value_name = "INT")]
    pub stride: Option<usize>,

    /// Skip the closing last-to-first step of circular helices.
    #[arg(long)]
    pub no_wrap: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S helix.helix-break=8.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `validate-config` subcommand.
#[derive(Args, Debug)]
pub struct ValidateConfigArgs {
    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Set a specific configuration value before validation. Can be used multiple times.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
