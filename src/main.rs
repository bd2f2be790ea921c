//! deptrack - Dependency upgrade detection and ticket correlation CLI
//!
//! Diffs the current repository against a base revision, detects version
//! bumps of observed dependencies, and prints the issue-tracker tickets
//! referenced in the dependency's commit history between the two versions.

use clap::Parser;
use deptrack::cli::CliArgs;
use deptrack::config;
use deptrack::domain::Ticket;
use deptrack::orchestrator::Orchestrator;
use deptrack::output::create_formatter;
use deptrack::tracker::{JiraClient, TicketLookup};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default directory for cached dependency repository mirrors
const DEFAULT_CACHE_DIR: &str = ".deptrack_cache";

#[tokio::main]
async fn main() -> ExitCode {
    // Hook installations run everywhere; the tool only makes sense on a
    // developer checkout
    if std::env::var_os("CI").is_some() {
        eprintln!("deptrack does not run in CI environments");
        return ExitCode::SUCCESS;
    }

    let args = CliArgs::parse();
    init_logging(&args);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &CliArgs) {
    let default = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = config::load(args.config.as_deref())?;
    let formatter = create_formatter(&args.format)?;
    let jira = JiraClient::new(&config.tracker);

    let cache_dir = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_CACHE_DIR.into());
    let orchestrator = Orchestrator::new(config, cache_dir, args.limit);
    let results = orchestrator.run(Path::new("."), args.rev.as_deref()).await?;

    // When invoked as a prepare-commit-msg hook, append trailers to the
    // commit message instead of printing them
    let mut writer: Box<dyn Write> = match args.commit_message_file() {
        Some(path) => Box::new(OpenOptions::new().append(true).open(path)?),
        None => Box::new(io::stdout().lock()),
    };

    for result in &results {
        if result.tickets.is_empty() {
            info!(
                "No tickets found for {} between {} and {}",
                result.upgrade.name, result.upgrade.old_version, result.upgrade.new_version
            );
            continue;
        }

        let mut tickets = Vec::with_capacity(result.tickets.len());
        for name in &result.tickets {
            let ticket = if formatter.needs_details() {
                jira.ticket_details(name).await?
            } else {
                Ticket::new(name)
            };
            tickets.push(ticket);
        }
        formatter.print(&result.upgrade, &tickets, &mut writer)?;
    }
    writer.flush()?;

    Ok(ExitCode::SUCCESS)
}
