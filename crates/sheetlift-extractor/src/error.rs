//! Error types for the Extractor

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Template file missing, unreadable or empty
    #[error("Failed to load template {}: {reason}", .path.display())]
    TemplateLoad {
        /// Template location
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Template placeholders do not match the substitution mapping
    #[error("Template resolution error: {0}")]
    TemplateResolution(#[from] TemplateError),

    /// Provider answered with a non-success status, or could not be reached
    #[error("Remote call failed: {message}")]
    RemoteCall {
        /// Provider status code, when the provider answered at all
        status: Option<u16>,
        /// Provider message
        message: String,
    },

    /// Sanitized response text is not valid JSON
    #[error("Response is not valid JSON ({source}); response text: {text}")]
    ResponseParse {
        /// Decoder error
        source: serde_json::Error,
        /// The sanitized text that failed to decode
        text: String,
    },

    /// Reading or writing a file failed
    #[error("Persistence error at {}: {source}", .path.display())]
    Persistence {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A stored artifact is not valid JSON
    #[error("Artifact {} is not valid JSON: {source}", .path.display())]
    ArtifactDecode {
        /// Artifact file
        path: PathBuf,
        /// Decoder error
        source: serde_json::Error,
    },

    /// A record could not be serialized
    #[error("Failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractorError::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while resolving a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A referenced placeholder has no value in the mapping
    #[error("no value for placeholder '{0}'")]
    MissingPlaceholder(String),

    /// An unescaped brace that does not form a `{name}` placeholder
    #[error("unmatched '{brace}' at byte {offset} (use '{{{{' or '}}}}' for a literal brace)")]
    Malformed {
        /// The offending brace
        brace: char,
        /// Byte offset in the template text
        offset: usize,
    },
}
