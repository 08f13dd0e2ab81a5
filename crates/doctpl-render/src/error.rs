//! Error types for document rendering.
//!
//! [`RenderError`] is the error returned by every rendering entry point. It
//! keeps the template engine's and the document adapter's errors behind a
//! stable API so callers can tell authoring defects ([`RenderError::StyleNotFound`])
//! apart from broken packages and bad expressions.

use thiserror::Error;

/// Failures while opening, reading or writing a DOCX package.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The byte source is not a readable zip container.
    #[error("invalid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package part is not well-formed XML.
    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    /// A part required by the format is absent.
    #[error("package has no {0} part")]
    MissingPart(String),

    /// I/O failure while reading or writing package entries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The designated tag style is missing from the document's style table.
    ///
    /// This is a template authoring defect and is never worth retrying.
    #[error("style '{0}' not found in document")]
    StyleNotFound(String),

    /// The document could not be opened or serialized.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Expression syntax error or evaluation failure.
    #[error("template error: {0}")]
    Template(String),

    /// The morphological lexicon could not be loaded.
    #[error("lexicon error: {0}")]
    Lexicon(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        RenderError::Template(err.to_string())
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Lexicon(err.to_string())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
