//! Error types for document mutation, upload resolution and settings.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the document model when a step cannot be applied.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    /// Position lies outside the document.
    #[error("position {pos} is out of range (document size {size})")]
    #[diagnostic(code(weaver_upload::document::out_of_range))]
    PositionOutOfRange { pos: usize, size: usize },

    /// No node starts at the position.
    #[error("no node starts at position {pos}")]
    #[diagnostic(code(weaver_upload::document::no_node))]
    NoNodeAt { pos: usize },

    /// Text nodes carry no attributes.
    #[error("node at position {pos} is a text node and has no attributes")]
    #[diagnostic(code(weaver_upload::document::text_attrs))]
    TextHasNoAttrs { pos: usize },

    /// The transaction was built against an older state.
    #[error("transaction built against state version {built}, current version is {current}")]
    #[diagnostic(
        code(weaver_upload::document::stale),
        help("build the transaction and apply it under the same state borrow")
    )]
    StaleTransaction { built: u64, current: u64 },
}

/// Error returned by a resolver when it cannot produce a URI.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("upload failed: {message}")]
#[diagnostic(code(weaver_upload::resolve))]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Why an upload ended without a URI.
///
/// Both variants end up as `error: true` on the node; the distinction is only
/// carried in the upload report.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadFailure {
    /// The resolver rejected.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rejected(#[from] ResolveError),

    /// The resolver succeeded with an empty URI.
    #[error("resolver returned an empty URI")]
    #[diagnostic(code(weaver_upload::empty_result))]
    EmptyResult,
}

/// Errors loading upload settings.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SettingsError {
    /// IO error
    #[error("failed to read settings: {0}")]
    #[diagnostic(code(weaver_upload::settings::io))]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("invalid settings: {0}")]
    #[diagnostic(code(weaver_upload::settings::parse))]
    Parse(#[from] serde_json::Error),

    /// Settings parsed but make no sense
    #[error("invalid settings: {0}")]
    #[diagnostic(code(weaver_upload::settings::invalid))]
    Invalid(String),
}
