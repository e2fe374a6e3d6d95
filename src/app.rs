//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the smoothing/detection pipeline
//! - prints the boom/bust report and plots
//! - writes exports, FRED downloads and synthetic samples

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::cli::{AnalyzeArgs, BatchArgs, Command, FetchArgs, PlotArgs, SampleArgs, TuiArgs};
use crate::domain::AnalysisConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cycles` binary.
pub fn run() -> Result<(), AppError> {
    // `cycles` and `cycles -f Monthly.csv` behave like `cycles analyze ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Batch(args) => handle_batch(args),
        Command::Plot(args) => handle_plot(args),
        Command::Fetch(args) => handle_fetch(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let input = crate::cli::picker::resolve_input(args.file.as_deref())?;
    let config = analysis_config_from_args(&args, input);

    // Nothing is printed until the whole pipeline has succeeded.
    let run = pipeline::run_analysis(&config)?;
    let analysis = &run.analysis;

    println!(
        "{}",
        crate::report::format_run_summary(&run.loaded, analysis.smoothed(), &analysis.detection, &config)
    );
    println!("{}", crate::report::format_extrema(&analysis.extrema));
    print!("{}", report_body(&analysis.segments));

    if config.plot {
        println!();
        print!(
            "{}",
            crate::plot::render_ascii_plot(&analysis.rows, config.plot_width, config.plot_height)
        );
    }

    if config.export {
        let path = config
            .export_path
            .clone()
            .unwrap_or_else(|| crate::io::annotated_path(&config.input));
        crate::io::write_annotated_csv(&path, &analysis.rows)?;
        println!("Annotated series written to {}", path.display());
    }
    if let Some(path) = &config.export_summary {
        crate::io::write_summary_json(path, &run.summary())?;
        println!("Run summary written to {}", path.display());
    }
    if let Some(dir) = &config.debug_dir {
        let path = crate::debug::write_debug_bundle(dir, &run)?;
        println!("Debug bundle written to {}", path.display());
    }

    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let mut config = AnalysisConfig::for_input(PathBuf::new(), args.pipeline.cadence);
    config.policy = args.pipeline.policy;

    let results = pipeline::run_batch(&args.files, &config);
    let mut first_failure: Option<AppError> = None;
    let mut failed = 0usize;

    for (path, result) in results {
        println!("== {} ==", path.display());
        let run = match result {
            Ok(run) => run,
            Err(err) => {
                println!("error: {err}\n");
                failed += 1;
                first_failure.get_or_insert(err);
                continue;
            }
        };

        print!("{}", report_body(&run.analysis.segments));
        if !args.no_export {
            let out = crate::io::annotated_path(&path);
            if let Err(err) = crate::io::write_annotated_csv(&out, &run.analysis.rows) {
                println!("error: {err}");
                failed += 1;
                first_failure.get_or_insert(err);
            }
        }
        println!();
    }

    match first_failure {
        None => Ok(()),
        Some(err) => {
            warn!("{failed} of {} inputs failed", args.files.len());
            Err(AppError::new(
                err.exit_code(),
                format!("{failed} of {} inputs failed; first error: {err}", args.files.len()),
            ))
        }
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let summary = crate::io::read_summary_json(&args.summary)?;

    println!("{} ({}, {})", summary.source, summary.cadence, summary.tool);
    print!(
        "{}",
        crate::plot::render_ascii_plot(&summary.rows, args.width, args.height)
    );
    print!("{}", report_body(&summary.segments));
    Ok(())
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let client = crate::data::FredClient::from_env()?;
    let observations = client.fetch_series(&args.series, args.start, args.end)?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.csv", args.series)));
    crate::io::write_observations_csv(&path, &args.series, &observations)?;
    println!(
        "Wrote {} observations of {} to {}",
        observations.len(),
        args.series,
        path.display()
    );
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let mut spec = crate::data::SyntheticSpec::new(args.cadence, args.periods, args.seed);
    if let Some(start) = args.start {
        spec.start = start;
    }
    let series = crate::data::generate_synthetic(&spec)?;

    let observations: Vec<_> = series
        .points()
        .iter()
        .map(|p| (p.date, format!("{:.1}", p.raw_value)))
        .collect();
    crate::io::write_observations_csv(&args.output, "SYNTHETIC", &observations)?;
    info!("synthetic series: {} {} points, seed {}", series.len(), args.cadence, args.seed);
    println!("Wrote {} synthetic observations to {}", series.len(), args.output.display());
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let input = crate::cli::picker::resolve_input(args.file.as_deref())?;
    let mut config = AnalysisConfig::for_input(input, args.pipeline.cadence);
    config.policy = args.pipeline.policy;
    crate::tui::run(config)
}

/// Segment lines, or a note when there are fewer than two turning points.
fn report_body(segments: &[crate::domain::Segment]) -> String {
    if segments.is_empty() {
        "No boom/bust segments (fewer than two turning points).\n".to_string()
    } else {
        crate::report::format_segments(segments)
    }
}

pub fn analysis_config_from_args(args: &AnalyzeArgs, input: PathBuf) -> AnalysisConfig {
    AnalysisConfig {
        input,
        cadence: args.pipeline.cadence,
        policy: args.pipeline.policy,
        export: !args.no_export,
        export_path: args.output.clone(),
        export_summary: args.export_summary.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        debug_dir: args.debug.clone(),
    }
}

/// Rewrite argv so `cycles` defaults to `cycles analyze`.
///
/// Rules:
/// - `cycles`                      -> `cycles analyze`
/// - `cycles -f X.csv ...`         -> `cycles analyze -f X.csv ...`
/// - `cycles --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_analyze() {
        assert_eq!(rewrite_args(args(&["cycles"])), args(&["cycles", "analyze"]));
        assert_eq!(
            rewrite_args(args(&["cycles", "-f", "Annual.csv", "--cadence", "annual"])),
            args(&["cycles", "analyze", "-f", "Annual.csv", "--cadence", "annual"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(args(&["cycles", "--help"])), args(&["cycles", "--help"]));
        assert_eq!(
            rewrite_args(args(&["cycles", "batch", "a.csv"])),
            args(&["cycles", "batch", "a.csv"])
        );
    }

    #[test]
    fn analyze_flags_map_to_config() {
        let cli = crate::cli::Cli::parse_from(["cycles", "analyze", "--no-export", "--plot", "--policy", "lenient"]);
        let Command::Analyze(a) = cli.command else {
            panic!("expected analyze");
        };
        let config = analysis_config_from_args(&a, PathBuf::from("Monthly.csv"));
        assert!(!config.export);
        assert!(config.plot);
        assert_eq!(config.policy, crate::domain::ValidationPolicy::Lenient);
        assert_eq!(config.input, PathBuf::from("Monthly.csv"));
    }
}
