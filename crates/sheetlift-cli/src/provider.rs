//! Credential lookup and provider construction.

use crate::config::{ProviderKind, ProviderSettings};
use crate::error::{CliError, Result};
use sheetlift_domain::CompletionProvider;
use sheetlift_llm::{dashscope, ollama, DashScopeProvider, LlmError, OllamaProvider};
use std::path::Path;
use tracing::{debug, info};

/// A provider chosen at runtime.
pub type DynProvider = Box<dyn CompletionProvider<Error = LlmError>>;

/// Load `env_file` into the process environment; a missing file is fine.
pub fn load_env_file(env_file: &Path) -> Result<()> {
    match dotenvy::from_path(env_file) {
        Ok(()) => {
            debug!("Loaded environment from {}", env_file.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!("No environment file at {}", env_file.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Find the API key for `settings`.
///
/// An explicit key wins; otherwise the variable named by
/// `settings.api_key_env` is looked up through `lookup`. Providers that need
/// no key get `None`; a provider that needs one and has none is an error.
pub fn resolve_api_key<F>(
    settings: &ProviderSettings,
    explicit: Option<&str>,
    lookup: F,
) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if settings.kind == ProviderKind::Ollama {
        return Ok(None);
    }

    let key = explicit
        .map(str::to_string)
        .or_else(|| lookup(&settings.api_key_env))
        .filter(|k| !k.trim().is_empty());

    match key {
        Some(key) => Ok(Some(key)),
        None => Err(CliError::Credential(format!(
            "{} is not set (export it, add it to the env file or pass --api-key)",
            settings.api_key_env
        ))),
    }
}

/// Build the configured provider.
pub fn build_provider(settings: &ProviderSettings, api_key: Option<String>) -> Result<DynProvider> {
    let timeout = settings.timeout();

    let provider: DynProvider = match settings.kind {
        ProviderKind::Dashscope => {
            let endpoint = settings
                .endpoint
                .clone()
                .unwrap_or_else(|| dashscope::DEFAULT_ENDPOINT.to_string());
            let key = api_key.ok_or_else(|| {
                CliError::Credential(format!("{} is not set", settings.api_key_env))
            })?;
            info!("Using DashScope at {}", endpoint);
            Box::new(DashScopeProvider::with_endpoint(endpoint, key, timeout)?)
        }
        ProviderKind::Ollama => {
            let endpoint = settings
                .endpoint
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
            info!("Using Ollama at {}", endpoint);
            Box::new(OllamaProvider::new(endpoint, timeout)?)
        }
    };

    Ok(provider)
}
