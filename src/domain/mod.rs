//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration enums (`Cadence`, `ValidationPolicy`)
//! - the validated input series (`Series`, `SeriesPoint`)
//! - pipeline outputs (`SmoothedSeries`, `Extremum`, `Segment`, `AnnotatedRow`)

pub mod types;

pub use types::*;
