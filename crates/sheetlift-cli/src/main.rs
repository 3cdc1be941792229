//! Sheetlift CLI - extract structured JSON from datasheet Markdown.

use clap::Parser;
use sheetlift_cli::commands;
use sheetlift_cli::{build_provider, resolve_api_key, Cli, Command, Config};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, RUST_LOG wins over -v)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> sheetlift_cli::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // Command-line overrides
    if let Some(model) = cli.model {
        config.extractor.model = model;
    }
    if let Some(provider) = cli.provider {
        config.provider.kind = provider.into();
    }
    config.validate()?;

    // Credential is checked before any extraction starts
    sheetlift_cli::provider::load_env_file(&cli.env_file)?;
    let api_key = resolve_api_key(&config.provider, cli.api_key.as_deref(), |name| {
        std::env::var(name).ok()
    })?;
    let provider = build_provider(&config.provider, api_key)?;

    match cli.command {
        Command::Extract(args) => {
            commands::execute_extract(args, &config, provider)?;
        }
        Command::Batch(args) => {
            commands::execute_batch(args, &config, provider)?;
        }
        Command::Aggregate(args) => {
            commands::execute_aggregate(args, &config, provider)?;
        }
    }

    Ok(())
}
