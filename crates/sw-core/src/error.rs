//! Error types for sw-core

use crate::Version;
use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Connection string is not of the form `scheme://rest`
    #[error("[E004] Invalid URL '{url}': expected <scheme>://<location>")]
    InvalidUrl { url: String },

    /// E005: URL scheme is not a known source or database backend
    #[error("[E005] Unsupported {kind} '{scheme}' (supported: {supported})")]
    UnsupportedScheme {
        kind: &'static str,
        scheme: String,
        supported: &'static str,
    },

    /// E006: No migration produces the requested version
    #[error("[E006] Migration not found for version {version}")]
    MigrationNotFound { version: Version },

    /// E007: The target reports more applied migrations than the source has
    #[error("[E007] Current version {current} is ahead of the {available} available migration(s)")]
    VersionAhead { current: Version, available: usize },

    /// E008: Glob pattern could not be compiled
    #[error("[E008] Invalid migration pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

impl CoreError {
    /// True for the "no such migration" signal, as opposed to a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::MigrationNotFound { .. })
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
