//! Error types for template and editor operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Element not found in the active template.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Template not found in the catalog.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// No template is loaded into the editor.
    #[error("No active template")]
    NoActiveTemplate,

    /// Property edit does not apply to this element type.
    #[error("Invalid operation on element {element}: {reason}")]
    InvalidOperation {
        /// Target element.
        element: String,
        /// Why the edit was rejected.
        reason: String,
    },

    /// Property value is out of range or not finite.
    #[error("Invalid value for {property}: {value}")]
    InvalidValue {
        /// Property name.
        property: &'static str,
        /// Offending value rendered as text.
        value: String,
    },

    /// Element is locked against editing.
    #[error("Element is locked: {0}")]
    Locked(String),

    /// Template definition is malformed.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// CSS color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Template serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
