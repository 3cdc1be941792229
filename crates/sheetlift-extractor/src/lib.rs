//! Sheetlift Extractor
//!
//! Turns datasheet Markdown into structured JSON by asking a completion
//! provider and cleaning up what comes back.
//!
//! # Overview
//!
//! A prompt template is loaded from disk, its `{placeholders}` are filled with
//! the document text (and any extra context), and the resolved prompt is sent
//! as a single user message. The model's answer is stripped of code fences,
//! decoded as JSON and written out as an artifact. Previously written artifacts
//! can be loaded back and fed into a larger aggregation pass.
//!
//! # Architecture
//!
//! ```text
//! Markdown → PromptLoader/Template → Extractor → CompletionProvider
//!          → sanitize → JSON → ResultStore
//!
//! ResultStore::load_all → Extractor::aggregate → ResultStore::save
//! ```
//!
//! # Key Features
//!
//! - **Template prompts**: `{name}` placeholders with `{{`/`}}` escapes
//! - **Fence-tolerant decoding**: a leading ```` ```json ```` and trailing
//!   ```` ``` ```` are dropped
//! - **Batch runs**: whole directory trees, one artifact per document, failures isolated
//! - **Aggregation**: prior artifacts merged into a second, larger extraction
//!
//! # Example Usage
//!
//! ```no_run
//! use sheetlift_extractor::{ArtifactForm, Extractor, ExtractorConfig, ResultStore};
//! use sheetlift_llm::MockProvider;
//! use std::collections::HashMap;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"type": "resistor"}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let record = extractor.extract(
//!     "Resistor R1, 10kΩ",
//!     "prompt/image_prompt.txt",
//!     &HashMap::new(),
//! )?;
//!
//! ResultStore::new().save(&record, "image_output.txt", ArtifactForm::Pretty)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod batch;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod store;
mod types;


pub use batch::{BatchRunner, DEFAULT_INPUT_EXTENSION, DEFAULT_OUTPUT_SUFFIX};
pub use config::ExtractorConfig;
pub use error::{ExtractorError, TemplateError};
pub use extractor::{Extractor, EXISTING_RESULTS_PLACEHOLDER, HANDBOOK_PLACEHOLDER};
pub use parser::{parse_response, sanitize};
pub use prompt::{PromptLoader, Template};
pub use store::{ResultStore, DEFAULT_RESULT_EXTENSIONS};
pub use types::{
    ArtifactForm, BatchFailure, BatchReport, ExtractedRecord, ExtractionMode,
    ExtractionRequest, ResultArtifact,
};
