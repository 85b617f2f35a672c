//! CLI argument parsing for tool-eval
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::OutputFormat;

/// tool-eval - score recorded tool calls against evaluation suites
#[derive(Parser, Debug)]
#[command(name = "tool-eval")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a suite against recorded model responses
    Run {
        /// Suite file (YAML)
        suite: PathBuf,

        /// Recorded responses file (YAML or JSON)
        #[arg(long, short)]
        responses: PathBuf,

        /// Runs per case
        #[arg(long)]
        runs: Option<usize>,

        /// Seed policy: constant, random, or an integer
        #[arg(long)]
        seed: Option<String>,

        /// How multi-run results decide pass/fail: last, mean, majority
        #[arg(long)]
        pass_rule: Option<String>,

        /// Maximum cases evaluated at once
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Model name recorded in the report
        #[arg(long, default_value = "replay")]
        model: String,

        /// Configuration file (defaults to tool-eval.toml beside the suite)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the tools a suite exposes to the model
    Tools {
        /// Suite file (YAML)
        suite: PathBuf,

        /// Omit strict-mode flags from the formatted tools
        #[arg(long)]
        no_strict: bool,

        /// Configuration file (defaults to tool-eval.toml beside the suite)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record the tool calls a model makes without scoring them
    Capture {
        /// Suite file (YAML)
        suite: PathBuf,

        /// Recorded responses file (YAML or JSON)
        #[arg(long, short)]
        responses: PathBuf,

        /// Include system message and history in each captured case
        #[arg(long)]
        include_context: bool,

        /// Model name recorded in the result
        #[arg(long, default_value = "replay")]
        model: String,

        /// Configuration file (defaults to tool-eval.toml beside the suite)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
