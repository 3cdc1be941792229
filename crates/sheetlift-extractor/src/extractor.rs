//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_response;
use crate::prompt::{PromptLoader, Template};
use crate::types::{ExtractedRecord, ExtractionMode, ExtractionRequest, ResultArtifact};
use sheetlift_domain::{CompletionProvider, CompletionRequest, RawResponse};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Placeholder receiving the full handbook text in the aggregation pass
pub const HANDBOOK_PLACEHOLDER: &str = "handbook_content";

/// Placeholder receiving prior records (as a JSON array) in the aggregation pass
pub const EXISTING_RESULTS_PLACEHOLDER: &str = "existing_results";

/// The Extractor turns document text into a JSON record via a completion provider
///
/// Every call is single-shot: nothing is retried, and two calls with the same
/// input may return different samples.
pub struct Extractor<P>
where
    P: CompletionProvider,
{
    provider: P,
    loader: PromptLoader,
    config: ExtractorConfig,
}

impl<P> Extractor<P>
where
    P: CompletionProvider,
{
    /// Create a new Extractor
    pub fn new(provider: P, config: ExtractorConfig) -> Self {
        Self {
            provider,
            loader: PromptLoader::new(),
            config,
        }
    }

    /// Use `loader` to resolve template ids
    pub fn with_loader(mut self, loader: PromptLoader) -> Self {
        self.loader = loader;
        self
    }

    /// The provider requests are sent to
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Template loader in use
    pub fn loader(&self) -> &PromptLoader {
        &self.loader
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a record from one document
    ///
    /// The document text is bound to the configured document placeholder
    /// (`markdown_text` by default); `extra_context` entries are added on top
    /// and win on collision.
    pub fn extract(
        &self,
        document_text: &str,
        template_id: impl AsRef<Path>,
        extra_context: &HashMap<String, String>,
    ) -> Result<ExtractedRecord, ExtractorError> {
        let template = self.loader.load(template_id)?;
        self.extract_with_template(&template, document_text, extra_context)
    }

    /// Like [`extract`](Self::extract) with an already loaded template
    pub fn extract_with_template(
        &self,
        template: &Template,
        document_text: &str,
        extra_context: &HashMap<String, String>,
    ) -> Result<ExtractedRecord, ExtractorError> {
        let mut variables = HashMap::with_capacity(extra_context.len() + 1);
        variables.insert(
            self.config.document_placeholder.clone(),
            document_text.to_string(),
        );
        variables.extend(extra_context.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = self.request(template.clone(), variables, ExtractionMode::Document);
        self.execute(&request)
    }

    /// Aggregation pass: merge prior records into a whole-handbook extraction
    pub fn aggregate(
        &self,
        handbook_content: &str,
        template_id: impl AsRef<Path>,
        prior: &[ResultArtifact],
    ) -> Result<ExtractedRecord, ExtractorError> {
        let template = self.loader.load(template_id)?;
        self.aggregate_with_template(&template, handbook_content, prior)
    }

    /// Like [`aggregate`](Self::aggregate) with an already loaded template
    pub fn aggregate_with_template(
        &self,
        template: &Template,
        handbook_content: &str,
        prior: &[ResultArtifact],
    ) -> Result<ExtractedRecord, ExtractorError> {
        let records: Vec<&ExtractedRecord> = prior.iter().map(|a| &a.record).collect();
        let existing_results =
            serde_json::to_string_pretty(&records).map_err(ExtractorError::Encode)?;

        info!(
            "Aggregating {} prior records into handbook of {} chars",
            records.len(),
            handbook_content.len()
        );

        let variables = HashMap::from([
            (HANDBOOK_PLACEHOLDER.to_string(), handbook_content.to_string()),
            (EXISTING_RESULTS_PLACEHOLDER.to_string(), existing_results),
        ]);

        let request = self.request(template.clone(), variables, ExtractionMode::Aggregate);
        self.execute(&request)
    }

    /// Build a request with this extractor's model and the mode's sampling
    pub fn request(
        &self,
        template: Template,
        variables: HashMap<String, String>,
        mode: ExtractionMode,
    ) -> ExtractionRequest {
        ExtractionRequest {
            template,
            variables,
            model: self.config.model.clone(),
            params: self.config.params_for(mode),
        }
    }

    /// Resolve, call the provider once, sanitize and decode
    pub fn execute(&self, request: &ExtractionRequest) -> Result<ExtractedRecord, ExtractorError> {
        let prompt = request.template.resolve(&request.variables)?;
        debug!("Prompt length: {} chars", prompt.len());

        let completion = CompletionRequest::single_turn(&request.model, prompt, request.params);

        let start = Instant::now();
        let response = self
            .provider
            .complete(&completion)
            .map_err(|e| ExtractorError::RemoteCall {
                status: None,
                message: e.to_string(),
            })?;

        let text = match response {
            RawResponse::Success { text } => text,
            RawResponse::Failure { status, message } => {
                warn!(
                    "{} returned status {}: {}",
                    self.provider.name(),
                    status,
                    message
                );
                return Err(ExtractorError::RemoteCall {
                    status: Some(status),
                    message,
                });
            }
        };

        debug!(
            "{} response: {} chars in {} ms",
            self.provider.name(),
            text.len(),
            start.elapsed().as_millis()
        );

        let record = parse_response(&text)?;

        info!(
            "Extraction complete: model {}, {}",
            request.model,
            describe(&record)
        );

        Ok(record)
    }
}

fn describe(record: &ExtractedRecord) -> String {
    match record {
        serde_json::Value::Array(items) => format!("{} items", items.len()),
        serde_json::Value::Object(map) => format!("object with {} keys", map.len()),
        _ => "scalar value".to_string(),
    }
}
