//! Extract command implementation.

use super::{build_extractor, build_store, read_document};
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use sheetlift_domain::CompletionProvider;
use sheetlift_extractor::ArtifactForm;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the extract command.
///
/// Returns the path of the written artifact.
pub fn execute_extract<P: CompletionProvider>(
    args: ExtractArgs,
    config: &Config,
    provider: P,
) -> Result<PathBuf> {
    let extractor = build_extractor(provider, config);

    let document = read_document(&args.input)?;
    let record = extractor.extract(&document, &args.template, &HashMap::new())?;

    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input, &config.batch.output_suffix));
    build_store(config).save(&record, &output, ArtifactForm::Pretty)?;

    info!("Extracted {} -> {}", args.input.display(), output.display());
    println!("{}", output.display());

    Ok(output)
}

/// `<stem><suffix>` next to the input.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use sheetlift_extractor::ExtractorError;
    use sheetlift_llm::MockProvider;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(dir: &Path) -> ExtractArgs {
        fs::write(dir.join("image.md"), "Resistor R1, 10kΩ").unwrap();
        fs::write(dir.join("prompt.txt"), "Extract info: {markdown_text}").unwrap();
        ExtractArgs {
            input: dir.join("image.md"),
            template: dir.join("prompt.txt"),
            output: None,
        }
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("output_image/image.md"), "_output.txt"),
            PathBuf::from("output_image/image_output.txt")
        );
    }

    #[test]
    fn test_extract_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let args = fixture(dir.path());
        let provider =
            MockProvider::new("```json\n{\"type\":\"resistor\",\"value\":\"10kΩ\"}\n```");

        let output = execute_extract(args, &Config::default(), &provider).unwrap();

        assert_eq!(output, dir.path().join("image_output.txt"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "{\n  \"type\": \"resistor\",\n  \"value\": \"10kΩ\"\n}"
        );
        assert_eq!(
            provider.last_request().unwrap().prompt(),
            Some("Extract info: Resistor R1, 10kΩ")
        );
    }

    #[test]
    fn test_extract_explicit_output() {
        let dir = TempDir::new().unwrap();
        let mut args = fixture(dir.path());
        args.output = Some(dir.path().join("custom.json"));

        let output = execute_extract(args, &Config::default(), MockProvider::new("[]")).unwrap();
        assert_eq!(output, dir.path().join("custom.json"));
        assert_eq!(fs::read_to_string(output).unwrap(), "[]");
    }

    #[test]
    fn test_extract_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let args = fixture(dir.path());

        let provider = MockProvider::failing(400, "InvalidParameter");
        let result = execute_extract(args, &Config::default(), provider);
        assert!(matches!(
            result,
            Err(CliError::Extractor(ExtractorError::RemoteCall { status: Some(400), .. }))
        ));
        assert!(!dir.path().join("image_output.txt").exists());
    }

    #[test]
    fn test_extract_missing_input() {
        let dir = TempDir::new().unwrap();
        let mut args = fixture(dir.path());
        args.input = dir.path().join("missing.md");

        let provider = MockProvider::default();
        let result = execute_extract(args, &Config::default(), &provider);
        assert!(matches!(
            result,
            Err(CliError::Extractor(ExtractorError::Persistence { .. }))
        ));
        assert_eq!(provider.call_count(), 0);
    }
}
