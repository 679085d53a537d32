//! `commodity-events` library crate.
//!
//! The binary (`cev`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - each stage (clean, features, impact, report) can be driven on its own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod clean;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod impact;
pub mod io;
pub mod math;
pub mod report;
