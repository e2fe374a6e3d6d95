//! Data sources: FRED downloads and synthetic series.

pub mod fred;
pub mod synthetic;

pub use fred::FredClient;
pub use synthetic::{SyntheticSpec, generate_synthetic};
