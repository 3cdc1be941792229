//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sheetlift_extractor::{
    ExtractorConfig, DEFAULT_INPUT_EXTENSION, DEFAULT_OUTPUT_SUFFIX, DEFAULT_RESULT_EXTENSIONS,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sheetlift.toml";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Batch run settings
    #[serde(default)]
    pub batch: BatchSettings,

    /// Result store settings
    #[serde(default)]
    pub store: StoreSettings,
}

/// Which completion service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Alibaba DashScope text generation
    #[default]
    Dashscope,
    /// Local Ollama server
    Ollama,
}

/// Completion provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider kind
    #[serde(default)]
    pub kind: ProviderKind,

    /// Endpoint override; the provider's public default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds; per-kind default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderSettings {
    /// Effective request timeout
    ///
    /// DashScope waits 120 s by default and a local Ollama model 300 s.
    pub fn timeout(&self) -> Duration {
        let secs = self.timeout_secs.unwrap_or(match self.kind {
            ProviderKind::Dashscope => sheetlift_llm::dashscope::DEFAULT_TIMEOUT_SECS,
            ProviderKind::Ollama => sheetlift_llm::ollama::DEFAULT_TIMEOUT_SECS,
        });
        Duration::from_secs(secs)
    }
}

/// Batch run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Extension of input documents
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Suffix appended to an input's stem to name its artifact
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

/// Result store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Extensions recognised as result artifacts
    #[serde(default = "default_result_extensions")]
    pub result_extensions: Vec<String>,
}

impl Config {
    /// Default per-user configuration file path.
    pub fn user_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sheetlift").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `sheetlift.toml` in the
    /// working directory is tried, then the per-user file, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Ok(user) = Self::user_path() {
            if user.is_file() {
                return Self::from_file(&user);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Parse the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check settings that would make every extraction fail.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;

        if self.provider.timeout_secs == Some(0) {
            return Err(CliError::Config("provider.timeout_secs must be greater than 0".into()));
        }
        if self.batch.input_extension.trim().is_empty() {
            return Err(CliError::Config("batch.input_extension must not be empty".into()));
        }
        if self.batch.output_suffix.is_empty() {
            return Err(CliError::Config("batch.output_suffix must not be empty".into()));
        }
        if self.store.result_extensions.is_empty() {
            return Err(CliError::Config("store.result_extensions must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            endpoint: None,
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            input_extension: default_input_extension(),
            output_suffix: default_output_suffix(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            result_extensions: default_result_extensions(),
        }
    }
}

fn default_api_key_env() -> String {
    "DASHSCOPE_API_KEY".to_string()
}

fn default_input_extension() -> String {
    DEFAULT_INPUT_EXTENSION.to_string()
}

fn default_output_suffix() -> String {
    DEFAULT_OUTPUT_SUFFIX.to_string()
}

fn default_result_extensions() -> Vec<String> {
    DEFAULT_RESULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::Dashscope);
        assert_eq!(config.provider.api_key_env, "DASHSCOPE_API_KEY");
        assert_eq!(config.provider.timeout_secs, None);
        assert_eq!(config.provider.timeout(), Duration::from_secs(120));
        assert_eq!(config.extractor.model, "qwen-max");
        assert_eq!(config.batch.output_suffix, "_output.txt");
        assert_eq!(config.store.result_extensions, vec!["txt", "json"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[provider]
kind = "ollama"
endpoint = "http://gpu-box:11434"
timeout_secs = 600

[extractor]
model = "qwen2.5:14b"

[extractor.aggregate]
max_tokens = 4096
temperature = 0.2

[batch]
input_extension = "markdown"

[store]
result_extensions = ["json"]
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.provider.api_key_env, "DASHSCOPE_API_KEY");
        assert_eq!(config.provider.timeout_secs, Some(600));
        assert_eq!(config.provider.timeout(), Duration::from_secs(600));
        assert_eq!(config.extractor.model, "qwen2.5:14b");
        assert_eq!(config.extractor.aggregate.max_tokens, 4096);
        assert_eq!(config.extractor.document.max_tokens, 2048);
        assert_eq!(config.batch.input_extension, "markdown");
        assert_eq!(config.batch.output_suffix, "_output.txt");
        assert_eq!(config.store.result_extensions, vec!["json"]);
    }

    #[test]
    fn test_ollama_timeout_defaults_longer() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[provider]\nkind = \"ollama\"\n").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.provider.timeout_secs, None);
        assert_eq!(config.provider.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/no/such/sheetlift.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[provider\nkind = ").unwrap();
        assert!(matches!(Config::load(Some(file.path())), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[provider]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(Config::load(Some(file.path())), Err(CliError::Config(_))));

        let mut config = Config::default();
        config.extractor.document.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
