//! # Effects Error Types
//!
//! Everything that can go wrong while configuring or mounting an effect.
//! Callers at the page boundary turn these into silent no-ops.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the effects system.
#[derive(Error, Debug)]
pub enum EffectsError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration text is not valid TOML for the schema.
    #[error("malformed configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A file could not be read or written.
    #[error("i/o failure on {path:?}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The drawing context for a surface could not be obtained.
    #[error("drawing context unavailable")]
    ContextUnavailable,

    /// A required host element is missing.
    #[error("element not found: {0}")]
    MissingElement(String),

    /// Any other failure reported by the host environment.
    #[error("host error: {0}")]
    Host(String),
}

impl EffectsError {
    /// Shorthand for [`EffectsError::InvalidConfig`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type for effects operations.
pub type EffectsResult<T> = Result<T, EffectsError>;
