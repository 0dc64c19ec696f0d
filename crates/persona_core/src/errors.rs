//! Error Types
//!
//! This module defines the error types used throughout the character runtime.
//!
//! # Overview
//!
//! The main error type [`PersonaError`] covers:
//! - Lookups of unknown character instances or clips
//! - Duplicate instance registration
//! - Configuration loading and validation
//!
//! # Usage
//!
//! Internal APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, PersonaError>`. The host-facing animation surface
//! turns these into `false`/`0` sentinels, so a missing clip only means the
//! character skips that gesture.
//!
//! ```rust,ignore
//! use persona_core::errors::{PersonaError, Result};
//!
//! fn find_clip() -> Result<()> {
//!     Err(PersonaError::InstanceNotFound("Char1".into()))
//! }
//! ```

use thiserror::Error;

/// The main error type for the Persona runtime.
#[derive(Error, Debug)]
pub enum PersonaError {
    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No multiplexer is registered under this instance name.
    #[error("Animation instance not found: {0}")]
    InstanceNotFound(String),

    /// The instance exists but has no clip of this name.
    #[error("Clip '{clip}' not found on instance '{instance}'")]
    ClipNotFound {
        /// Instance that was searched
        instance: String,
        /// The missing clip name
        clip: String,
    },

    /// An instance of this name is already registered.
    #[error("Animation instance already exists: {0}")]
    InstanceExists(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A tunable is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PersonaError {
    /// Returns `true` for the not-found family, which callers usually absorb.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PersonaError::InstanceNotFound(_) | PersonaError::ClipNotFound { .. }
        )
    }
}

/// Alias for `Result<T, PersonaError>`.
pub type Result<T> = std::result::Result<T, PersonaError>;
