//! Command implementations.

pub mod aggregate;
pub mod batch;
pub mod extract;

pub use self::aggregate::execute_aggregate;
pub use self::batch::execute_batch;
pub use self::extract::execute_extract;

use crate::config::Config;
use sheetlift_domain::CompletionProvider;
use sheetlift_extractor::{Extractor, ExtractorError, ResultStore};
use std::fs;
use std::path::Path;

/// Build an extractor from the loaded configuration.
pub(crate) fn build_extractor<P: CompletionProvider>(provider: P, config: &Config) -> Extractor<P> {
    Extractor::new(provider, config.extractor.clone())
}

/// Result store recognising the configured extensions.
pub(crate) fn build_store(config: &Config) -> ResultStore {
    ResultStore::with_extensions(&config.store.result_extensions)
}

/// Read a UTF-8 document, reporting failures against its path.
pub(crate) fn read_document(path: &Path) -> Result<String, ExtractorError> {
    fs::read_to_string(path).map_err(|source| ExtractorError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}
