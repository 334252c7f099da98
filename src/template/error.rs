//! Error types for template rendering.

use thiserror::Error;

use crate::ooxml::OoxmlError;

/// Result type for template rendering.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Fatal errors of a render call. None of them leave output behind.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template bytes are not a readable workbook, or the target sheet is unreadable
    #[error("failed to load template: {0}")]
    TemplateLoad(#[source] OoxmlError),

    /// No cell of the sheet contains the anchor marker
    #[error("no row contains the template marker '{marker}'")]
    TemplateNotFound { marker: String },

    /// Writing the workbook back failed
    #[error("failed to serialize workbook: {0}")]
    Serialization(#[source] OoxmlError),

    /// A key exists in both the header and the line-item namespaces
    #[error("placeholder '{key}' is defined both as a header field and a line-item field")]
    KeyCollision { key: String },

    /// Invalid options, or the configured sheet does not exist
    #[error("invalid configuration: {0}")]
    Config(String),
}
