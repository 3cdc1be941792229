//! Aggregate command implementation.

use super::{build_extractor, build_store, read_document};
use crate::cli::AggregateArgs;
use crate::config::Config;
use crate::error::Result;
use sheetlift_domain::CompletionProvider;
use sheetlift_extractor::ArtifactForm;
use std::path::PathBuf;
use tracing::info;

/// Execute the aggregate command.
///
/// Returns the path of the written artifact.
pub fn execute_aggregate<P: CompletionProvider>(
    args: AggregateArgs,
    config: &Config,
    provider: P,
) -> Result<PathBuf> {
    let extractor = build_extractor(provider, config);
    let store = build_store(config);

    let template = extractor.loader().load(&args.template)?;
    let handbook = read_document(&args.handbook)?;
    let prior = store.load_all(&args.results);

    let record = extractor.aggregate_with_template(&template, &handbook, &prior)?;
    store.save(&record, &args.output, ArtifactForm::Pretty)?;

    info!(
        "Aggregated {} prior results -> {}",
        prior.len(),
        args.output.display()
    );
    println!("{}", args.output.display());

    Ok(args.output)
}
