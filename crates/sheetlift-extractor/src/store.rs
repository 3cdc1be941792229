//! Writing extraction artifacts and reading them back

use crate::error::ExtractorError;
use crate::types::{ArtifactForm, ExtractedRecord, ResultArtifact};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions recognised as result artifacts by default
pub const DEFAULT_RESULT_EXTENSIONS: &[&str] = &["txt", "json"];

/// Persists records as JSON text files
///
/// Records are always written as JSON regardless of the file extension;
/// the extension only decides which files [`load_all`](Self::load_all)
/// treats as artifacts.
#[derive(Debug, Clone)]
pub struct ResultStore {
    extensions: Vec<String>,
}

impl ResultStore {
    /// Store recognising [`DEFAULT_RESULT_EXTENSIONS`]
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_RESULT_EXTENSIONS.iter().copied())
    }

    /// Store recognising the given extensions (without leading dot)
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Extensions treated as artifacts
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `path` carries one of the recognised extensions
    pub fn is_artifact(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|known| known == ext))
            .unwrap_or(false)
    }

    /// Serialize `record` and write it to `path`, replacing any existing file
    ///
    /// Non-ASCII text is written as-is, never escaped. The parent directory
    /// must already exist.
    pub fn save(
        &self,
        record: &ExtractedRecord,
        path: impl AsRef<Path>,
        form: ArtifactForm,
    ) -> Result<(), ExtractorError> {
        let path = path.as_ref();

        let text = match form {
            ArtifactForm::Pretty => serde_json::to_string_pretty(record),
            ArtifactForm::Compact => serde_json::to_string(record),
        }
        .map_err(ExtractorError::Encode)?;

        fs::write(path, text).map_err(|e| ExtractorError::persistence(path, e))?;

        debug!("Saved artifact {}", path.display());
        Ok(())
    }

    /// Read every recognised artifact under `dirs`, recursively
    ///
    /// Missing directories and files that are unreadable or not valid JSON
    /// are logged and skipped. Artifacts come back directory by directory,
    /// each directory walked in file-name order.
    pub fn load_all<I, P>(&self, dirs: I) -> Vec<ResultArtifact>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut artifacts = Vec::new();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                warn!("Result directory {} does not exist, skipping", dir.display());
                continue;
            }

            let before = artifacts.len();
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Cannot read entry under {}: {}", dir.display(), e);
                        continue;
                    }
                };

                // Follows symlinks, unlike `entry.file_type()`
                let path = entry.path();
                if !path.is_file() || !self.is_artifact(path) {
                    continue;
                }

                match read_artifact(path) {
                    Ok(artifact) => artifacts.push(artifact),
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }

            info!(
                "Loaded {} artifacts from {}",
                artifacts.len() - before,
                dir.display()
            );
        }

        artifacts
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_artifact(path: &Path) -> Result<ResultArtifact, ExtractorError> {
    let text = fs::read_to_string(path).map_err(|e| ExtractorError::persistence(path, e))?;
    let record = serde_json::from_str(&text).map_err(|source| ExtractorError::ArtifactDecode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ResultArtifact {
        path: PathBuf::from(path),
        record,
    })
}
