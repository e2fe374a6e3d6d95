//! Numerical building blocks: rolling means and Gaussian kernel filtering.

pub mod gaussian;
pub mod rolling;

pub use gaussian::*;
pub use rolling::*;
