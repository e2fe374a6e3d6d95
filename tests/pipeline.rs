//! End-to-end tests: CSV on disk -> pipeline -> report lines and exports.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Months, NaiveDate};
use housing_cycles::app::pipeline::{run_analysis, run_batch};
use housing_cycles::domain::{AnalysisConfig, Cadence, Classification, ExtremumKind, ValidationPolicy};
use housing_cycles::io::{annotated_path, read_summary_json, write_annotated_csv, write_summary_json};
use housing_cycles::report::format_segments;

fn write_monthly(dir: &Path, name: &str, values: &[f64]) -> PathBuf {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let mut csv = String::from("DATE,PERMIT\n");
    for (i, v) in values.iter().enumerate() {
        let date = start.checked_add_months(Months::new(i as u32)).unwrap();
        csv.push_str(&format!("{date},{v}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, csv).unwrap();
    path
}

fn sine(n: usize, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 1000.0 + 100.0 * (2.0 * std::f64::consts::PI * i as f64 / period).sin())
        .collect()
}

#[test]
fn annual_dip_exports_trough_label() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Annual.csv");
    fs::write(&input, "Year,Permits\n2000,100\n2001,80\n2002,60\n2003,90\n2004,120\n").unwrap();

    let run = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Annual)).unwrap();
    let analysis = &run.analysis;
    assert_eq!(analysis.extrema.len(), 1);
    assert_eq!(analysis.extrema[0].kind, ExtremumKind::Trough);
    assert_eq!(analysis.extrema[0].index, 2);
    assert!((analysis.extrema[0].value - 77.947563).abs() < 1e-5);
    assert!(analysis.segments.is_empty());

    let out = annotated_path(&input);
    write_annotated_csv(&out, &analysis.rows).unwrap();
    assert_eq!(out.file_name().unwrap(), "Annual_annotated.csv");

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,value,smoothed,turning_point");
    assert_eq!(lines.len(), 6);
    assert!(lines[3].starts_with("2002-01-01,60.0,"));
    assert!(lines[3].ends_with(",-1"));
    assert!(lines[1].ends_with(",0"));
}

#[test]
fn monthly_sine_alternates_boom_and_bust() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_monthly(dir.path(), "Monthly.csv", &sine(240, 60.0));

    let run = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Monthly)).unwrap();
    let analysis = &run.analysis;

    let indices: Vec<usize> = analysis.extrema.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![15, 46, 76, 106, 136, 166, 196, 228]);
    assert_eq!(analysis.segments.len(), 7);
    for (i, s) in analysis.segments.iter().enumerate() {
        let expected = if i % 2 == 0 { Classification::Bust } else { Classification::Boom };
        assert_eq!(s.classification, expected);
    }

    let report = format_segments(&analysis.segments[..2]);
    assert_eq!(
        report,
        concat!(
            "Bust from 2001-04-01 to 2003-11-01: 14.38% decrease\n",
            "Boom from 2003-11-01 to 2006-05-01: 16.62% increase\n",
        )
    );
}

#[test]
fn monthly_hump_has_single_midpoint_peak() {
    let values: Vec<f64> = (0..36)
        .map(|i| if i < 18 { 100.0 + 10.0 * i as f64 } else { 100.0 + 10.0 * (35 - i) as f64 })
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let input = write_monthly(dir.path(), "hump.csv", &values);

    let run = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Monthly)).unwrap();
    let extrema = &run.analysis.extrema;
    assert_eq!(extrema.len(), 1);
    assert_eq!(extrema[0].kind, ExtremumKind::Peak);
    assert_eq!(extrema[0].index, 18);
    assert!((extrema[0].value - 221.440).abs() < 1e-2);
    assert!(run.analysis.segments.is_empty());
}

#[test]
fn missing_values_follow_validation_policy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fred.csv");
    fs::write(&input, "DATE,PERMIT\n2000-01-01,100\n2001-01-01,.\n2002-01-01,60\n2003-01-01,90\n2004-01-01,120\n")
        .unwrap();

    let mut config = AnalysisConfig::for_input(&input, Cadence::Annual);
    let err = run_analysis(&config).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("line 3"), "{err}");

    config.policy = ValidationPolicy::Lenient;
    let run = run_analysis(&config).unwrap();
    assert_eq!(run.loaded.rows_read, 5);
    assert_eq!(run.loaded.rows_used, 4);
    assert_eq!(run.loaded.row_errors[0].line, 3);
}

#[test]
fn duplicate_dates_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dup.csv");
    fs::write(&input, "2000,1\n2001,2\n2001,3\n2002,4\n").unwrap();

    let err = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Annual)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("duplicate date 2001-01-01"), "{err}");
}

#[test]
fn short_monthly_series_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_monthly(dir.path(), "short.csv", &[1.0, 2.0, 3.0, 4.0]);

    let err = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Monthly)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn batch_keeps_input_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_monthly(dir.path(), "a.csv", &sine(120, 60.0));
    let missing = dir.path().join("missing.csv");
    let other = write_monthly(dir.path(), "c.csv", &sine(120, 48.0));

    let config = AnalysisConfig::for_input(PathBuf::new(), Cadence::Monthly);
    let results = run_batch(&[good.clone(), missing.clone(), other.clone()], &config);

    let paths: Vec<&PathBuf> = results.iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec![&good, &missing, &other]);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].1.as_ref().unwrap_err().exit_code(), 2);
    assert!(results[2].1.is_ok());
}

#[test]
fn summary_json_round_trips_for_plotting() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_monthly(dir.path(), "Monthly.csv", &sine(240, 60.0));
    let run = run_analysis(&AnalysisConfig::for_input(&input, Cadence::Monthly)).unwrap();

    let path = dir.path().join("run.json");
    write_summary_json(&path, &run.summary()).unwrap();
    let summary = read_summary_json(&path).unwrap();

    assert_eq!(summary.cadence, Cadence::Monthly);
    assert_eq!(summary.rows.len(), run.analysis.rows.len());
    let labels: Vec<i8> = summary.rows.iter().map(|r| r.turning_point).collect();
    let expected: Vec<i8> = run.analysis.rows.iter().map(|r| r.turning_point).collect();
    assert_eq!(labels, expected);
    assert_eq!(summary.segments.len(), 7);

    let plot = housing_cycles::plot::render_ascii_plot(&summary.rows, 60, 12);
    let (header, grid) = plot.split_once('\n').unwrap();
    assert!(header.starts_with("Plot: 2000-01-01 .. 2019-12-01"));
    assert_eq!(grid.matches('P').count(), 4);
    assert_eq!(grid.matches('T').count(), 4);
}
