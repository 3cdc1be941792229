//! Request and result types for extraction

use crate::prompt::Template;
use sheetlift_domain::SamplingParams;
use std::collections::HashMap;
use std::path::PathBuf;

/// Decoded model answer; its schema is whatever the template asked for
pub type ExtractedRecord = serde_json::Value;

/// Which kind of extraction a request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One document, one record
    Document,
    /// Whole handbook merged with previously extracted records
    Aggregate,
}

/// A fully specified extraction call
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Prompt template
    pub template: Template,

    /// Placeholder name → substituted text
    pub variables: HashMap<String, String>,

    /// Model identifier
    pub model: String,

    /// Output bound and temperature
    pub params: SamplingParams,
}

/// How a record is serialized to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactForm {
    /// Two-space indented JSON
    #[default]
    Pretty,
    /// Single-line JSON
    Compact,
}

/// A record read back from storage
#[derive(Debug, Clone, PartialEq)]
pub struct ResultArtifact {
    /// File the record was read from
    pub path: PathBuf,

    /// Decoded content
    pub record: ExtractedRecord,
}

/// Outcome of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Artifacts written, in processing order
    pub written: Vec<PathBuf>,

    /// Inputs that produced no artifact
    pub failures: Vec<BatchFailure>,
}

/// An input that failed during a batch run
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Input document path
    pub input: PathBuf,

    /// Reason for failure
    pub reason: String,
}

impl BatchReport {
    /// Number of inputs attempted
    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }

    /// Whether every attempted input produced an artifact
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
