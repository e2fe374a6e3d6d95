//! `housing-cycles` library crate.
//!
//! The binary (`cycles`) is a thin wrapper around this library so that:
//!
//! - the smoothing/detection/segmentation core is testable without spawning processes
//! - the same pipeline backs the CLI, batch mode and the TUI

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod detect;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod smooth;
pub mod tui;
