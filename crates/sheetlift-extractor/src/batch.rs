//! Directory-wide extraction runs

use crate::error::{ExtractorError, TemplateError};
use crate::extractor::Extractor;
use crate::prompt::Template;
use crate::store::ResultStore;
use crate::types::{ArtifactForm, BatchFailure, BatchReport};
use sheetlift_domain::CompletionProvider;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Extension of input documents picked up by a batch run
pub const DEFAULT_INPUT_EXTENSION: &str = "md";

/// Appended to an input's stem to name its artifact
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_output.txt";

/// Runs the extractor over every document in a directory tree
///
/// Documents are processed one at a time. A document that fails (unreadable,
/// provider error, bad JSON, write error) is recorded in the report and the
/// run moves on; only problems that would fail every document abort the run.
pub struct BatchRunner<P>
where
    P: CompletionProvider,
{
    extractor: Extractor<P>,
    store: ResultStore,
    input_extension: String,
    output_suffix: String,
    form: ArtifactForm,
}

impl<P> BatchRunner<P>
where
    P: CompletionProvider,
{
    /// Create a runner with the default input extension and output suffix
    pub fn new(extractor: Extractor<P>) -> Self {
        Self {
            extractor,
            store: ResultStore::new(),
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            form: ArtifactForm::Pretty,
        }
    }

    /// Use `store` to write artifacts
    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = store;
        self
    }

    /// Only process files with this extension (without leading dot)
    pub fn with_input_extension(mut self, extension: impl Into<String>) -> Self {
        self.input_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Name artifacts `<stem><suffix>`
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Serialization form of written artifacts
    pub fn with_form(mut self, form: ArtifactForm) -> Self {
        self.form = form;
        self
    }

    /// The wrapped extractor
    pub fn extractor(&self) -> &Extractor<P> {
        &self.extractor
    }

    /// Artifact path for `input` inside `output_dir`
    ///
    /// Output is flat: the input's sub-directory is not reproduced.
    pub fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir.join(format!("{}{}", stem, self.output_suffix))
    }

    fn is_input(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.input_extension)
            .unwrap_or(false)
    }

    /// Extract every matching document under `input_dir` into `output_dir`
    ///
    /// The template is loaded and checked before anything else: it may only
    /// reference the document placeholder, and a bad template fails the run
    /// without a single provider call. `output_dir` is created if
    /// needed. Two inputs mapping to the same artifact name within one run
    /// keep the first artifact; the second input is reported as a failure.
    pub fn run(
        &self,
        input_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        template_id: impl AsRef<Path>,
    ) -> Result<BatchReport, ExtractorError> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        let template = self.extractor.loader().load(template_id)?;
        let document_placeholder = &self.extractor.config().document_placeholder;
        if let Some(name) = template
            .placeholders()?
            .into_iter()
            .find(|name| *name != document_placeholder.as_str())
        {
            return Err(TemplateError::MissingPlaceholder(name.to_string()).into());
        }

        if !input_dir.is_dir() {
            return Err(ExtractorError::persistence(
                input_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "input directory not found"),
            ));
        }
        fs::create_dir_all(output_dir).map_err(|e| ExtractorError::persistence(output_dir, e))?;

        info!(
            "Batch extraction: {} -> {} (*.{})",
            input_dir.display(),
            output_dir.display(),
            self.input_extension
        );

        let mut report = BatchReport::default();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for entry in WalkDir::new(input_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read entry under {}: {}", input_dir.display(), e);
                    continue;
                }
            };

            // Symlinked files count; `Path::is_file` follows the link
            let input = entry.path();
            if !input.is_file() || !self.is_input(input) {
                continue;
            }

            let output = self.output_path(input, output_dir);

            if claimed.contains(&output) {
                let reason = format!(
                    "artifact name {} already used by another input in this run",
                    output.display()
                );
                warn!("Skipping {}: {}", input.display(), reason);
                report.failures.push(BatchFailure {
                    input: input.to_path_buf(),
                    reason,
                });
                continue;
            }

            match self.process(&template, input, &output) {
                Ok(()) => {
                    info!("Processed {} -> {}", input.display(), output.display());
                    claimed.insert(output.clone());
                    report.written.push(output);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", input.display(), e);
                    report.failures.push(BatchFailure {
                        input: input.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch complete: {} written, {} failed",
            report.written.len(),
            report.failures.len()
        );

        Ok(report)
    }

    fn process(
        &self,
        template: &Template,
        input: &Path,
        output: &Path,
    ) -> Result<(), ExtractorError> {
        let text = fs::read_to_string(input).map_err(|e| ExtractorError::persistence(input, e))?;
        let record = self
            .extractor
            .extract_with_template(template, &text, &HashMap::new())?;
        self.store.save(&record, output, self.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use sheetlift_llm::MockProvider;
    use std::io::Write;
    use tempfile::TempDir;

    fn runner(provider: MockProvider) -> BatchRunner<MockProvider> {
        BatchRunner::new(Extractor::new(provider, ExtractorConfig::default()))
    }

    fn write_template(dir: &Path) -> PathBuf {
        let path = dir.join("prompt.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "Extract: {{markdown_text}}").unwrap();
        path
    }

    #[test]
    fn test_output_path_is_flat() {
        let runner = runner(MockProvider::default());
        let output = runner.output_path(Path::new("in/a/b/table.md"), Path::new("out"));
        assert_eq!(output, PathBuf::from("out/table_output.txt"));
    }

    #[test]
    fn test_custom_suffix_and_extension() {
        let runner = runner(MockProvider::default())
            .with_input_extension(".markdown")
            .with_output_suffix(".json");
        assert!(runner.is_input(Path::new("x.markdown")));
        assert!(!runner.is_input(Path::new("x.md")));
        assert_eq!(
            runner.output_path(Path::new("x.markdown"), Path::new("o")),
            PathBuf::from("o/x.json")
        );
    }

    #[test]
    fn test_run_skips_non_matching_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.md"), "A").unwrap();
        fs::write(input.join("b.txt"), "B").unwrap();
        let template = write_template(dir.path());

        let runner = runner(MockProvider::new(r#"{"ok": true}"#));
        let report = runner.run(&input, dir.path().join("out"), &template).unwrap();

        assert_eq!(report.written, vec![dir.path().join("out").join("a_output.txt")]);
        assert!(report.is_clean());
        assert_eq!(runner.extractor().provider().call_count(), 1);
    }

    #[test]
    fn test_run_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let template = write_template(dir.path());

        let result = runner(MockProvider::default()).run(
            dir.path().join("nope"),
            dir.path().join("out"),
            &template,
        );
        assert!(matches!(result, Err(ExtractorError::Persistence { .. })));
    }

    #[test]
    fn test_run_name_collision_keeps_first() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(input.join("a")).unwrap();
        fs::create_dir_all(input.join("b")).unwrap();
        fs::write(input.join("a").join("datasheet.md"), "first").unwrap();
        fs::write(input.join("b").join("datasheet.md"), "second").unwrap();
        let template = write_template(dir.path());

        let mut provider = MockProvider::default();
        provider.add_response_containing("first", sheetlift_domain::RawResponse::success("1"));
        provider.add_response_containing("second", sheetlift_domain::RawResponse::success("2"));

        let runner = runner(provider);
        let report = runner.run(&input, dir.path().join("out"), &template).unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].input, input.join("b").join("datasheet.md"));
        assert_eq!(
            fs::read_to_string(dir.path().join("out").join("datasheet_output.txt")).unwrap(),
            "1"
        );
        assert_eq!(runner.extractor().provider().call_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_follows_symlinked_inputs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(dir.path().join("real.md"), "linked table").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.md"), input.join("linked.md")).unwrap();
        let template = write_template(dir.path());

        let runner = runner(MockProvider::new(r#"{"linked": true}"#));
        let report = runner.run(&input, dir.path().join("out"), &template).unwrap();

        assert_eq!(report.written, vec![dir.path().join("out").join("linked_output.txt")]);
        assert!(report.is_clean());
        assert_eq!(
            runner.extractor().provider().last_request().unwrap().prompt(),
            Some("Extract: linked table")
        );
    }
}
