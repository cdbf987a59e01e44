mod config;
mod delivery;
mod engine;
mod pr;
mod report;

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

use engine::DiffRuleEngine;
use pr::PrProvider;
use report::OutputFormat;

/// PR Migration Lint: checks the added lines of a GitHub Pull Request
/// against the e2e framework migration rules (framework import paths,
/// typed getters, withFixtures in every test block).
#[derive(Parser, Debug)]
#[command(name = "pr-migration-lint", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// Not required when --mock or --diff is used.
    pr_url: Option<String>,

    /// Check a local `git diff` file instead of fetching from GitHub
    #[arg(long, conflicts_with_all = ["pr_url", "mock"])]
    diff: Option<PathBuf>,

    /// Use a built-in mock PR for demo purposes (no GitHub token needed)
    #[arg(long, conflicts_with = "pr_url")]
    r#mock: bool,

    /// Config file (defaults to .pr-migration-lint.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Optional output file path for the report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit one JSON progress event per line on stdout while checking
    #[arg(long, conflicts_with_all = ["format", "output"])]
    stream: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    let engine = DiffRuleEngine::new(&config.rules)?;

    let provider: Box<dyn PrProvider> = if cli.r#mock {
        info!("using mock PR data for demo");
        Box::new(pr::MockProvider)
    } else if let Some(path) = cli.diff.clone() {
        info!(path = %path.display(), "using local diff");
        Box::new(pr::DiffFileProvider::new(path))
    } else {
        let pr_url = cli.pr_url.as_deref().ok_or(
            "PR URL is required unless --mock or --diff is used. Usage: pr-migration-lint <URL>",
        )?;
        Box::new(pr::GitHubProvider::new(pr_url, &config.github))
    };

    let _main_span = info_span!("pr_migration_lint", source = provider.name()).entered();

    let report = if cli.stream {
        run_stream(provider, engine).await?
    } else {
        info!("loading pull request");
        let pull_request = provider.load().await?;
        info!(files = pull_request.files.len(), "loaded PR");

        let report = delivery::validate(&pull_request, &engine);
        report::output(&report, cli.format, cli.output.as_deref())?;
        Some(report)
    };

    match report {
        Some(report) if report.passed() => {
            info!(files = report.files_checked_count(), "no issues");
            Ok(ExitCode::SUCCESS)
        }
        Some(report) => {
            info!(issues = report.issues().len(), "issues found");
            Ok(ExitCode::from(1))
        }
        None => Ok(ExitCode::from(2)),
    }
}

/// Run the streaming path: the producer checks files on a separate task
/// while this task writes each event to stdout as a JSON line.
async fn run_stream(
    provider: Box<dyn PrProvider>,
    engine: DiffRuleEngine,
) -> Result<Option<report::ValidationReport>, Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::channel(32);
    let producer = tokio::spawn(async move {
        delivery::stream_validation(provider.as_ref(), &engine, &tx).await
    });

    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        let line = serde_json::to_string(&event)?;
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            warn!(error = %e, "stdout closed, stopping event stream");
            break;
        }
    }
    drop(rx);

    Ok(producer.await??)
}
