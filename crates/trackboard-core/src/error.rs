//! Error types for Trackboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("sync failed: {0}")]
    SyncFailed(String),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("crypto error: {0}")]
    CryptoFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
