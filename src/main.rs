//! Scope Koans - a runner for koans about functions, closures and scope
//!
//! Each koan is a small case whose assertions pin down one behavior of
//! first-class functions, lexical scope chains, variadic arguments or
//! receiver substitution.
//!
//! ## Features
//!
//! - 15 koans in three suites, run in registration order
//! - Panics, errors and timeouts isolated per case
//! - Table, JSON, CSV and one-line summary reports with word diffs
//! - YAML/JSON configuration with `SCOPE_KOANS_*` overrides
//!
//! ## Usage
//!
//! ```bash
//! # Run every koan
//! scope-koans run
//!
//! # Run one suite as JSON
//! scope-koans run --suite scope --format json
//!
//! # List registered koans
//! scope-koans list --detailed
//!
//! # Write a default configuration file
//! scope-koans config init
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

mod assertion;
mod cli;
mod config;
mod executor;
mod koans;
mod lang;
mod models;
mod output;
mod registry;
mod utils;

use cli::{Args, Command, ConfigAction};
use config::{AppConfig, EnvConfig};
use executor::{KoanRunner, RunFilter};
use output::{write_report_to_file, OutputFormat, ResultFormatter};
use utils::logger::{init_logger, LogLevel};

/// A case failed or errored
const EXIT_FAILED: u8 = 1;
/// Usage, configuration or registration error
const EXIT_USAGE: u8 = 2;

/// How long shutdown waits on case bodies abandoned by a timeout
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let args = Args::parse();
    let env = EnvConfig::load();

    let config = match load_config(args.config.as_deref(), &env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log_level()
    };
    init_logger(level);

    let outcome = match args.command {
        Command::Run(run_args) => run_on_runtime(run_args, config),
        Command::List(list_args) => list_koans(list_args).map(|()| ExitCode::SUCCESS),
        Command::Config(config_args) => {
            manage_config(config_args, &config).map(|()| ExitCode::SUCCESS)
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Resolve file and environment layers. The file comes from `--config`,
/// then `SCOPE_KOANS_CONFIG`, then the standard locations.
fn load_config(path: Option<&Path>, env: &EnvConfig) -> Result<AppConfig> {
    let file_config = match (path, env.config_file.as_deref()) {
        (Some(path), _) => AppConfig::load(path)?,
        (None, Some(path)) => AppConfig::load(path)?,
        (None, None) => AppConfig::load_default()?,
    };

    let config = file_config.with_env(env);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Apply `run` flags on top of the loaded configuration
fn apply_run_args(mut config: AppConfig, args: &cli::RunArgs) -> Result<AppConfig> {
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if let Some(timeout) = args.timeout_ms {
        config.case_timeout_ms = Some(timeout);
    }
    if args.no_color {
        config.colorize = false;
    }
    if let Some(skip) = &args.skip {
        config.skip = skip.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

/// Stop the runtime without waiting out a hung case body
fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

fn run_on_runtime(args: cli::RunArgs, config: AppConfig) -> Result<ExitCode> {
    let runtime = build_runtime()?;
    let outcome = runtime.block_on(run_koans(args, config));
    shutdown_runtime(runtime);
    outcome
}

async fn run_koans(args: cli::RunArgs, config: AppConfig) -> Result<ExitCode> {
    let config = apply_run_args(config, &args)?;
    let format = config.output_format();

    let registry = koans::registry().context("Failed to register koans")?;
    let mut runner = KoanRunner::new(registry).with_skip(config.skip.clone());
    if let Some(timeout) = config.case_timeout() {
        runner = runner.with_timeout(timeout);
    }

    let filter = RunFilter::new(args.suite, args.case);
    let selected = runner.selected(&filter);
    if selected == 0 {
        bail!("No koans match the given --suite/--case filter");
    }
    debug!("{} koans selected", selected);

    let report = runner.run_filtered(&filter).await;

    let mut formatter = ResultFormatter::new(format);
    if !config.colorize {
        formatter = formatter.no_color();
    }
    let rendered = formatter
        .format_report(&report)
        .context("Failed to render report")?;
    println!("{rendered}");

    if let Some(path) = &args.output {
        write_report_to_file(path, &report, format)?;
        info!("Report written to {}", path);
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FAILED))
    }
}

fn list_koans(args: cli::ListArgs) -> Result<()> {
    let registry = koans::registry().context("Failed to register koans")?;
    if registry.is_empty() {
        bail!("No koans are registered");
    }

    println!(
        "\nRegistered koans ({} suites, {} cases)\n",
        registry.len(),
        registry.case_count()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for suite in registry.suites() {
        if args.detailed {
            let setup = if suite.setup().is_some() {
                ", with setup"
            } else {
                ""
            };
            println!("\n{} ({} cases{}):", suite.name(), suite.cases().len(), setup);
        } else {
            println!("\n{}:", suite.name());
        }
        println!("──────────────────────────────────────────────────────────────────────");

        for (i, case) in suite.cases().iter().enumerate() {
            if args.detailed {
                println!("  {:2}. {:55} [{}/{}]", i + 1, case.name(), suite.name(), case.name());
            } else {
                println!("  {:2}. {}", i + 1, case.name());
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show { format } => {
            let output = if format == "json" {
                serde_json::to_string_pretty(config)?
            } else {
                serde_yaml::to_string(config)?
            };
            println!("{output}");
        }

        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            AppConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
            println!(
                "\nFormats: {}. Edit the file to customize your settings.",
                OutputFormat::names().join(", ")
            );
        }
    }

    Ok(())
}
