//! Error types.
//!
//! - `PipelineError` is what the library stages return.
//! - `AppError` is what the `cev` binary exits with (message + process exit code).

use std::path::PathBuf;

use chrono::NaiveDate;

/// Which side of a reference date lacked a price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySide {
    /// No observation strictly before the reference date.
    Before,
    /// No observation on or after the reference date.
    After,
}

impl std::fmt::Display for HistorySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistorySide::Before => write!(f, "before"),
            HistorySide::After => write!(f, "on/after"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Malformed or missing required input field. `line` is the 1-based CSV line
    /// when known.
    #[error("Format error{}: {message}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Format { line: Option<usize>, message: String },

    /// Non-positive or non-finite price reached a logarithm.
    #[error("Domain error: price {price} on {date} is not a positive finite number")]
    Domain { date: NaiveDate, price: f64 },

    #[error("Insufficient history for reference date {reference_date}: no price {side} it")]
    InsufficientHistory {
        reference_date: NaiveDate,
        side: HistorySide,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn format(line: Option<usize>, message: impl Into<String>) -> Self {
        PipelineError::Format {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match &err {
            PipelineError::Format { .. } | PipelineError::Config(_) | PipelineError::Io { .. } => 2,
            PipelineError::Domain { .. } => 3,
            PipelineError::InsufficientHistory { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
