//! Configuration for the Extractor

use crate::types::ExtractionMode;
use serde::{Deserialize, Serialize};
use sheetlift_domain::SamplingParams;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// Placeholder that receives the document text in single-document mode
    pub document_placeholder: String,

    /// Sampling for single-document extraction
    pub document: SamplingParams,

    /// Sampling for the aggregation pass
    pub aggregate: SamplingParams,
}

impl ExtractorConfig {
    /// Sampling parameters for `mode`
    pub fn params_for(&self, mode: ExtractionMode) -> SamplingParams {
        match mode {
            ExtractionMode::Document => self.document,
            ExtractionMode::Aggregate => self.aggregate,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.document_placeholder.trim().is_empty() {
            return Err("document_placeholder must not be empty".to_string());
        }
        for (name, params) in [("document", &self.document), ("aggregate", &self.aggregate)] {
            if params.max_tokens == 0 {
                return Err(format!("{}.max_tokens must be greater than 0", name));
            }
            if !(0.0..=2.0).contains(&params.temperature) {
                return Err(format!(
                    "{}.temperature {} out of range [0.0, 2.0]",
                    name, params.temperature
                ));
            }
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "qwen-max".to_string(),
            document_placeholder: "markdown_text".to_string(),
            document: SamplingParams::DOCUMENT,
            aggregate: SamplingParams::AGGREGATE,
        }
    }
}
