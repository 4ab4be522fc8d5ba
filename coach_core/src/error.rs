//! Error types for the coach_core library.

use crate::types::BodyRegion;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Week or session number outside the program, or week outside the
    /// periodization table
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Every region a session needs came back empty after injury filtering
    #[error("Catalog exhausted: no exercise left in {regions:?} for {requested} slot(s)")]
    CatalogExhausted {
        regions: Vec<BodyRegion>,
        requested: usize,
    },

    /// Caller-supplied value outside its accepted range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Program parameters that cannot produce a program
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Program store error
    #[error("Store error: {0}")]
    Store(String),
}
