//! CLI entrypoint for Paper Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::{
    CouncilProgressNotifier, NoProgress, RoundLogger, RunCouncilError, RunCouncilUseCase,
};
use council_domain::{CouncilConfig, ExtractionRequest};
use council_infrastructure::{
    AdapterFactory, ConfigLoader, FileConfig, FileCouncilConfig, FileProviderConfig,
    JsonlRoundLogger, ProviderKind,
};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const EXIT_SETUP_ERROR: u8 = 1;
const EXIT_NO_QUORUM: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(&cli, &file_config)?;
    info!("Starting Paper Council");

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    let request = read_request(&cli)?;
    let (council, config) = council_config(&cli, &file_config)?;

    // === Dependency Injection ===
    let adapters = AdapterFactory::new()?.build_all(&council)?;

    let cancellation = CancellationToken::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; abandoning round");
            interrupt.cancel();
        }
    });

    let mut use_case = RunCouncilUseCase::new(adapters).with_cancellation(cancellation);
    if let Some(path) = file_config.logging.round_log_path() {
        match JsonlRoundLogger::new(&path) {
            Some(logger) => {
                info!("Recording rounds to {}", path.display());
                let logger: Arc<dyn RoundLogger> = Arc::new(logger);
                use_case = use_case.with_round_logger(logger);
            }
            None => warn!("Round log disabled"),
        }
    }

    let progress: Box<dyn CouncilProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let result = match use_case
        .execute_with_progress(request, &config, progress.as_ref())
        .await
    {
        Ok(result) => result,
        Err(RunCouncilError::Cancelled) => bail!("Round cancelled"),
        Err(e) => return Err(e.into()),
    };

    let format = OutputFormat::from(
        file_config
            .output
            .resolve_format(cli.output.map(council_domain::OutputFormat::from)),
    );
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", output);

    if result.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_NO_QUORUM))
    }
}

/// Install the tracing subscriber.
///
/// Logs go to stderr unless a log file is given on the command line or in
/// `[logging] file`. The returned guard flushes the file writer on drop.
fn init_logging(cli: &Cli, file_config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| file_config.logging.file_path());

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(&directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn read_request(cli: &Cli) -> Result<ExtractionRequest> {
    let raw = if cli.reads_stdin() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        let path = cli
            .request
            .as_ref()
            .ok_or_else(|| anyhow!("An extraction request file is required"))?;
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?
    };

    let request: ExtractionRequest =
        serde_json::from_str(&raw).context("Request is not a valid extraction request")?;
    if request.text.trim().is_empty() {
        bail!("Request {} has no text to extract", request.paper_id);
    }
    Ok(request)
}

/// Resolve the providers of this run and apply command-line overrides.
///
/// Without configured providers, `--provider` names are taken as provider
/// kinds with built-in defaults (e.g. `-p openai -p claude`).
fn council_config(
    cli: &Cli,
    file_config: &FileConfig,
) -> Result<(FileCouncilConfig, CouncilConfig)> {
    let mut council = file_config.council.clone();

    if council.providers.is_empty() && !cli.provider.is_empty() {
        council.providers = cli
            .provider
            .iter()
            .map(|name| {
                let kind: ProviderKind = name.parse().map_err(anyhow::Error::msg)?;
                let mut provider = FileProviderConfig::new(kind);
                provider.name = Some(name.clone());
                Ok(provider)
            })
            .collect::<Result<Vec<_>>>()?;
        council.min_responses = council.min_responses.min(council.providers.len());
    }

    let mut config = council.to_council_config()?;

    if !file_config.council.providers.is_empty() && !cli.provider.is_empty() {
        if let Some(unknown) = cli.provider.iter().find(|n| config.provider(n).is_none()) {
            let known: Vec<&str> = config.providers().iter().map(|p| p.name.as_str()).collect();
            bail!(
                "Unknown provider '{}'; configured providers: {}",
                unknown,
                known.join(", ")
            );
        }
        config = config.restricted_to(&cli.provider)?;
        council
            .providers
            .retain(|p| cli.provider.iter().any(|n| n == p.provider_name()));
    }

    let mut builder = config.to_builder();
    if let Some(min_responses) = cli.min_responses {
        builder = builder.min_responses(min_responses);
    }
    if cli.no_fallback {
        builder = builder.fallback_to_single(false);
    }
    if cli.sequential {
        builder = builder.parallel(false);
    }

    Ok((council, builder.build()?))
}
