//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`RawPricePoint`, `EventRecord`) and the cleaned `PricePoint`
//! - derived outputs (`EnrichedPricePoint`, `WindowFeatures`, `ImpactResult`)
//! - run configuration (`PipelineConfig`, `DateOrder`)

pub mod types;

pub use types::*;
