//! Error types for RaffleForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum RfError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid participant name: {0:?}")]
    InvalidName(String),
}

/// Result type alias
pub type RfResult<T> = Result<T, RfError>;
