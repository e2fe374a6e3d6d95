//! Command-line parsing for the boom/bust turning point analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the smoothing/detection code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{Cadence, ValidationPolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cycles",
    version,
    about = "Boom/bust turning point analyzer for housing time series"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Smooth one series, detect turning points, print the boom/bust report and export.
    Analyze(AnalyzeArgs),
    /// Analyze many files in parallel, one report block per file.
    Batch(BatchArgs),
    /// Plot a previously exported run summary JSON.
    Plot(PlotArgs),
    /// Download a FRED series to a loader-compatible CSV.
    Fetch(FetchArgs),
    /// Write a deterministic synthetic boom/bust series.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `cycles analyze`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Options shared by every command that runs the pipeline.
#[derive(Debug, Parser, Clone)]
pub struct PipelineArgs {
    /// Sampling interval of the input (selects smoothing and detection settings).
    #[arg(short = 'c', long, value_enum, default_value_t = Cadence::Monthly)]
    pub cadence: Cadence,

    /// How to treat rows whose date or value cannot be parsed.
    #[arg(long, value_enum, default_value_t = ValidationPolicy::Strict)]
    pub policy: ValidationPolicy,
}

/// Options for a single-file analysis.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Input CSV (date in column 1, value in column 2). Prompts when omitted.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Skip writing the annotated CSV.
    #[arg(long)]
    pub no_export: bool,

    /// Annotated CSV path (defaults to `<input>_annotated.csv`).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Write a JSON run summary.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write a smoothing-stage debug bundle into this directory.
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = "debug")]
    pub debug: Option<PathBuf>,
}

/// Options for batch analysis.
#[derive(Debug, Parser, Clone)]
pub struct BatchArgs {
    /// Input CSV files.
    #[arg(required = true, value_name = "CSV")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Skip writing the annotated CSVs.
    #[arg(long)]
    pub no_export: bool,
}

/// Options for plotting a saved run summary.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Run summary JSON produced by `cycles analyze --export-summary`.
    #[arg(long, value_name = "JSON")]
    pub summary: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for downloading a FRED series.
#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// FRED series id (e.g. PERMIT, PERMITNSA, HOUST).
    #[arg(short = 's', long, default_value = "PERMIT")]
    pub series: String,

    /// First observation date (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last observation date (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Output CSV (defaults to `<SERIES>.csv`).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for synthetic series generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    #[arg(short = 'c', long, value_enum, default_value_t = Cadence::Monthly)]
    pub cadence: Cadence,

    /// Number of observations.
    #[arg(short = 'n', long, default_value_t = 480)]
    pub periods: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First observation date (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Output CSV.
    #[arg(short = 'o', long, value_name = "CSV", default_value = "synthetic.csv")]
    pub output: PathBuf,
}

/// Options for the TUI.
#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Input CSV. Prompts when omitted.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults() {
        let cli = Cli::parse_from(["cycles", "analyze", "-f", "Monthly.csv"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.file, Some(PathBuf::from("Monthly.csv")));
        assert_eq!(args.pipeline.cadence, Cadence::Monthly);
        assert_eq!(args.pipeline.policy, ValidationPolicy::Strict);
        assert!(!args.no_export);
        assert!(args.debug.is_none());
    }

    #[test]
    fn debug_flag_without_value_uses_default_dir() {
        let cli = Cli::parse_from(["cycles", "analyze", "--cadence", "annual", "--debug", "-f", "a.csv"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.pipeline.cadence, Cadence::Annual);
        assert_eq!(args.debug, Some(PathBuf::from("debug")));
    }

    #[test]
    fn fetch_parses_dates() {
        let cli = Cli::parse_from(["cycles", "fetch", "-s", "PERMITNSA", "--start", "1990-01-01"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.series, "PERMITNSA");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(1990, 1, 1));
    }
}
