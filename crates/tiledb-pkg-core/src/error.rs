//! Error types for forge lookups, configuration and release assembly.
//!
//! None of these are recoverable: callers propagate them and the pipeline
//! re-runs the whole step.

use std::path::PathBuf;

use thiserror::Error;
use tiledb_pkg_schema::DigestError;

/// Failures talking to the source forge.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Transport failure, non-success status, or an undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API token cannot be sent as a header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

/// Failures loading a matrix configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for a matrix configuration.
    #[error("Failed to parse matrix config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but describes an unusable matrix.
    #[error("Invalid matrix config: {0}")]
    Invalid(String),
}

/// Failures assembling or verifying a release directory.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The build matrix JSON could not be decoded.
    #[error("Malformed build matrix: {0}")]
    Matrix(#[from] serde_json::Error),

    /// A filesystem operation failed.
    #[error("{action} {path}: {source}")]
    Io {
        /// What was being done (e.g. "Failed to copy").
        action: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A checksum sidecar does not hold a valid digest.
    #[error("Bad checksum file {path}: {source}")]
    Digest {
        /// The sidecar path.
        path: PathBuf,
        /// Why the digest was rejected.
        source: DigestError,
    },
}

impl ReleaseError {
    /// Wrap an I/O error with the action and path it happened on.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
