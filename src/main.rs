use build_keeper::config::{APP_NAME, KeeperConfig};
use build_keeper::history::JobHistory;
use build_keeper::{BuildKeeper, Decision};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", APP_NAME));

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let from_env = std::env::var_os("RUST_LOG").is_some();
    let mut builder = env_logger::Builder::from_default_env();
    if !from_env {
        // Let everything through the logger; the configured level is applied
        // with set_max_level once the config is loaded.
        builder.filter_level(LevelFilter::Trace);
    }
    builder.target(env_logger::Target::Pipe(target)).init();
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Level named by the config's `log_level`, if it names one
fn configured_level(level: Option<&str>) -> Option<LevelFilter> {
    level.and_then(|l| l.trim().parse().ok())
}

/// Apply the configured log level unless RUST_LOG already decided it
fn apply_log_level(level: Option<&str>) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    match configured_level(level) {
        Some(filter) => log::set_max_level(filter),
        None => {
            if let Some(level) = level {
                log::warn!("Unknown log_level '{}', keeping info", level);
            }
        }
    }
}

fn run_application(cli: &Cli, config: &KeeperConfig) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{} {}", "Policy:".cyan(), config.policy);
    }

    match &cli.command {
        Commands::Replay {
            history,
            output,
            keep_existing,
        } => handle_replay_command(history, output.as_deref(), *keep_existing, config),
        Commands::Check { path } => handle_check_command(path.as_ref(), config),
    }
}

fn handle_replay_command(
    history_path: &Path,
    output: Option<&Path>,
    keep_existing: bool,
    config: &KeeperConfig,
) -> Result<()> {
    info!("Replaying {} (keep existing: {})", history_path.display(), keep_existing);

    let keeper = BuildKeeper::new(config.policy.clone()).context("Invalid policy")?;
    let mut history = JobHistory::load_jsonl(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;
    if !keep_existing {
        history.release_all();
    }

    let mut console = std::io::stdout();
    let decisions = keeper.replay(&mut history, &mut console);

    for (number, decision) in &decisions {
        let Some(build) = history.iter().find(|b| b.number == *number) else {
            continue;
        };
        let line = format!(
            "#{:<6} {:<10} {}  {}",
            number,
            build.outcome,
            build.timestamp.format("%Y-%m-%d %H:%M:%S%.3f %:z"),
            decision
        );
        match decision {
            Decision::Retained(_) => println!("{}", line.green()),
            Decision::Blocked => println!("{}", line.yellow()),
            Decision::Covered(_) | Decision::Skipped => println!("{}", line.dimmed()),
        }
    }

    let kept = history.kept();
    println!(
        "{} kept {} of {} builds: {:?}",
        "Summary:".green(),
        kept.len(),
        history.len(),
        kept
    );

    if let Some(path) = output {
        history
            .save_jsonl(path)
            .with_context(|| format!("Failed to write history to {}", path.display()))?;
        println!("{} {}", "Wrote:".green(), path.display());
    }

    Ok(())
}

fn handle_check_command(path: Option<&PathBuf>, config: &KeeperConfig) -> Result<()> {
    let checked = match path {
        Some(path) => {
            info!("Checking config: {}", path.display());
            KeeperConfig::load_from_file(path).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => config.clone(),
    };

    println!("{} {}", "OK:".green(), checked.policy);
    print!("{}", checked.to_yaml().context("Failed to render config")?);
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging first, so config loading and legacy upgrades are logged
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = KeeperConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(config.log_level.as_deref());

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
