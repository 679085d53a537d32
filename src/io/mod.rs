//! Input/output helpers.
//!
//! - CSV ingest for price and event tables (`ingest`)
//! - feature CSV and JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
