//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Koan runner for functions, closures and scope
#[derive(Parser, Debug)]
#[command(name = "scope-koans")]
#[command(version)]
#[command(about = "Run the functions, closures and scope koans")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run koans and print the report
    Run(RunArgs),

    /// List registered suites and cases
    List(ListArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Only suites whose name contains this text
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Only cases whose name contains this text
    #[arg(short, long)]
    pub case: Option<String>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Per-case timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Disable color codes
    #[arg(long)]
    pub no_color: bool,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Cases to skip, comma-separated (case name or suite/case)
    #[arg(long, value_delimiter = ',')]
    pub skip: Option<Vec<String>>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show case counts and suite setup hooks
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "./scope-koans.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
