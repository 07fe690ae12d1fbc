//! CLI argument definitions for `ess-prep`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ess-prep",
    version,
    about = "Prepare European Social Survey extracts for analysis",
    long_about = "Prepare European Social Survey extracts for analysis.\n\n\
                  Loads the sample design, contact-form and questionnaire files,\n\
                  keeps one country, merges them into one row per sampled unit and\n\
                  derives cigarettes and alcohol consumed per day."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and report on the prepared table.
    Prepare(PrepareArgs),

    /// Load and validate the sources without merging or writing.
    Check(CheckArgs),

    /// List the columns declared in the study codebook.
    Codebook(CodebookArgs),
}

#[derive(Parser)]
pub struct PrepareArgs {
    /// Study configuration (TOML).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory relative source paths resolve against (default: the config's directory).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output directory for generated files (default: <CONFIG_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Country to keep, by name or stored code (overrides the config).
    #[arg(long = "country", value_name = "NAME")]
    pub country: Option<String>,

    /// Rows shown in the preview of the prepared table.
    #[arg(long = "head", value_name = "N", default_value_t = ess_report::DEFAULT_HEAD_ROWS)]
    pub head: usize,

    /// Also write the prepared table as prepared.csv.
    #[arg(long = "write-data")]
    pub write_data: bool,

    /// Also write the prepared table as a SAS transport file (prepared.xpt).
    #[arg(long = "write-xpt")]
    pub write_xpt: bool,

    /// Print the summary as JSON on stdout instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Run every stage without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Study configuration (TOML).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory relative source paths resolve against.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Country to keep, by name or stored code (overrides the config).
    #[arg(long = "country", value_name = "NAME")]
    pub country: Option<String>,
}

#[derive(Parser)]
pub struct CodebookArgs {
    /// Study configuration (TOML).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
