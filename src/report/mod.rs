//! Reporting: summary statistics, recorded warnings, and terminal formatting.

pub mod format;
pub mod summary;
pub mod warning;

pub use format::*;
pub use summary::*;
pub use warning::*;
