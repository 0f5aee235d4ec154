//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Drawing surface could not be allocated.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Asset could not be fetched or decoded.
    #[error("Failed to load asset {src}: {reason}")]
    Asset {
        /// Asset URL as written in the template.
        src: String,
        /// What went wrong.
        reason: String,
    },

    /// Asset load exceeded the configured timeout.
    #[error("Timed out loading asset {0}")]
    Timeout(String),

    /// Output encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Export options are unusable.
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    /// Template-level failure.
    #[error(transparent)]
    Core(#[from] stayframe_core::CoreError),
}

impl RenderError {
    /// Build an [`RenderError::Asset`].
    pub fn asset(src: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Asset {
            src: src.into(),
            reason: reason.to_string(),
        }
    }
}
