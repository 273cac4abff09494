//! Homework bot
//!
//! CLI entry point: loads config and secrets, then runs the poll loop.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use homework_bot::cli::{Cli, Command};
use homework_bot::config::{Config, Secrets};
use homework_bot::poller::{CycleOutcome, PollState, Poller};
use homework_bot::status::Verdict;
use homework_bot::{PracticumClient, TelegramNotifier};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

/// Log to both the log file and stdout
fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_path: &Path) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));

    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(Mutex::new(log_file)))
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?}, file: {})", level, log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a .env file next to the bot
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    setup_logging(
        cli.log_level.as_deref(),
        config.log_level.as_deref(),
        &config.log_file_path(),
    )
    .context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run { from_date, interval }) => cmd_run(config, from_date, interval).await,
        None => cmd_run(config, None, None).await,
        Some(Command::Once { from_date }) => cmd_once(config, from_date).await,
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Verdicts) => cmd_verdicts(),
    }
}

/// Resolve secrets or stop the process before the loop starts
fn require_secrets(config: &Config) -> Result<Secrets> {
    match Secrets::from_env(config) {
        Ok(secrets) => Ok(secrets),
        Err(e) => {
            error!("CRITICAL: {}", e);
            Err(e.into())
        }
    }
}

fn build_poller(config: &Config, from_date: Option<i64>) -> Result<Poller> {
    let secrets = require_secrets(config)?;

    let source = PracticumClient::new(&config.api, secrets.api_token.as_str())
        .context("Failed to create status API client")?;
    let notifier = TelegramNotifier::new(&config.telegram, &secrets.bot_token, secrets.chat_id.as_str())
        .context("Failed to create Telegram notifier")?;

    let state = PollState::from_start(from_date.or(config.poll.from_date));

    Ok(Poller::new(
        Arc::new(source),
        Arc::new(notifier),
        config.poll.retry_interval(),
        state,
    ))
}

/// Poll forever
async fn cmd_run(mut config: Config, from_date: Option<i64>, interval: Option<u64>) -> Result<()> {
    debug!(?from_date, ?interval, "cmd_run: called");
    if let Some(secs) = interval {
        config.poll.retry_interval_secs = secs;
    }
    config.validate().context("Invalid --interval")?;

    let poller = build_poller(&config, from_date)?;
    info!("Starting homework bot");
    poller.run().await;
    Ok(())
}

/// Run a single cycle and report what happened
async fn cmd_once(config: Config, from_date: Option<i64>) -> Result<()> {
    debug!(?from_date, "cmd_once: called");
    let mut poller = build_poller(&config, from_date)?;

    match poller.run_cycle().await {
        CycleOutcome::Completed {
            sent,
            failed,
            current_date,
        } => {
            println!(
                "{} {} sent, {} failed, next from_date {}",
                "✓".green(),
                sent,
                failed,
                current_date.to_string().cyan()
            );
            Ok(())
        }
        CycleOutcome::Failed { error, notified } => {
            println!("{} {} (alert sent: {})", "✗".red(), error, notified);
            Err(eyre::eyre!("Poll cycle failed: {}", error))
        }
    }
}

/// Report which secrets are set
fn cmd_check_config(config: &Config) -> Result<()> {
    debug!("cmd_check_config: called");
    let names = [
        config.api.token_env.as_str(),
        config.telegram.token_env.as_str(),
        config.telegram.chat_id_env.as_str(),
    ];

    for name in names {
        let present = std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
        if present {
            println!("{} {}", "✓".green(), name);
        } else {
            println!("{} {} is not set", "✗".red(), name.yellow());
        }
    }

    require_secrets(config)?;
    println!("Endpoint: {}", config.api.endpoint.cyan());
    println!("Retry interval: {}s", config.poll.retry_interval_secs);
    Ok(())
}

fn cmd_verdicts() -> Result<()> {
    for verdict in Verdict::ALL {
        println!("{:<10} {}", verdict.as_status().cyan(), verdict.description());
    }
    Ok(())
}
