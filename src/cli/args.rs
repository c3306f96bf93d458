//! CLI argument definitions
//!
//! All Clap derive structs for `delirium-sim` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Delirium-care nursing dialogue simulation.
#[derive(Parser, Debug)]
#[command(name = "delirium-sim", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "DELIRIUM_SIM_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play an interactive session against a chat-completions model.
    Play(PlayArgs),

    /// Replay a scripted scenario offline.
    Replay(ReplayArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Subcommand Arguments
// ============================================================================

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Configuration file (defaults apply when omitted).
    #[arg(short, long, env = "DELIRIUM_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the JSONL event stream to this file instead of stderr.
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

/// Arguments for `replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Scenario script (YAML).
    pub script: PathBuf,

    /// Report format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Write the JSONL event stream to this file.
    #[arg(long)]
    pub events_file: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}
