//! Batch command implementation.

use super::{build_extractor, build_store};
use crate::cli::BatchArgs;
use crate::config::Config;
use crate::error::Result;
use sheetlift_domain::CompletionProvider;
use sheetlift_extractor::{BatchReport, BatchRunner};

/// Execute the batch command.
///
/// Per-document failures are reported but do not fail the command.
pub fn execute_batch<P: CompletionProvider>(
    args: BatchArgs,
    config: &Config,
    provider: P,
) -> Result<BatchReport> {
    let runner = BatchRunner::new(build_extractor(provider, config))
        .with_store(build_store(config))
        .with_input_extension(config.batch.input_extension.as_str())
        .with_output_suffix(config.batch.output_suffix.as_str());

    let report = runner.run(&args.input_dir, &args.output_dir, &args.template)?;

    println!("{}", summary(&report));
    for failure in &report.failures {
        eprintln!("  failed: {}: {}", failure.input.display(), failure.reason);
    }

    Ok(report)
}

fn summary(report: &BatchReport) -> String {
    format!(
        "Processed {} documents: {} written, {} failed",
        report.total(),
        report.written.len(),
        report.failures.len()
    )
}
