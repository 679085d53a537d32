//! Mathematical utilities: descriptive statistics and trailing windows.

pub mod rolling;
pub mod stats;

pub use rolling::*;
pub use stats::*;
