//! Common error types for djkr8

use thiserror::Error;

/// Common result type for djkr8 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the optimizer core and its front ends
#[derive(Error, Debug)]
pub enum Error {
    /// Key string is not `<1-12><A|B>`
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Missing required field, duplicate id, non-positive tempo
    #[error("Invalid track data: {0}")]
    InvalidTrackData(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Solver proved that no sequence of two or more tracks satisfies the constraints
    #[error("No feasible solution: {0}")]
    NoFeasibleSolution(String),

    /// Time limit elapsed before any solution was found
    #[error("Solver timeout: {0}")]
    SolverTimeout(String),

    /// Model uses a construct the selected solving engine cannot handle
    #[error("Solver error: {0}")]
    Solver(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
