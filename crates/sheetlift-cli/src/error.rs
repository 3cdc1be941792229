//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API key missing or unusable
    #[error("Credential error: {0}")]
    Credential(String),

    /// Extraction error
    #[error(transparent)]
    Extractor(#[from] sheetlift_extractor::ExtractorError),

    /// Provider setup error
    #[error("Provider error: {0}")]
    Llm(#[from] sheetlift_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Environment file could not be parsed
    #[error("Environment file error: {0}")]
    EnvFile(#[from] dotenvy::Error),
}
