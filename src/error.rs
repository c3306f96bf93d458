//! Error types for `delirium-sim`
//!
//! This module provides the error hierarchy for the state engine, the
//! external collaborators, and configuration loading, together with the
//! exit codes the CLI maps them to.

use std::path::PathBuf;
use thiserror::Error;

use crate::sim::GameResult;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `delirium-sim` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Interpreter or narrator failure (network, timeout, bad reply)
    pub const COLLABORATOR_ERROR: i32 = 4;

    /// State engine error (turn on a finished session, empty narration)
    pub const GAME_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `delirium-sim` operations.
///
/// Aggregates all domain-specific errors and provides a unified
/// interface for exit code mapping.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// State engine error
    #[error(transparent)]
    Game(#[from] GameError),

    /// Interpreter or narrator error
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Game(_) => ExitCode::GAME_ERROR,
            Self::Collaborator(_) => ExitCode::COLLABORATOR_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Game Errors
// ============================================================================

/// State engine errors.
///
/// None of these leave the session partially mutated: every check runs
/// before the first write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// A turn was submitted to a session that already has a result
    #[error("game over: session ended with {result} after turn {turn}")]
    GameOver {
        /// The terminal result the session ended with
        result: GameResult,
        /// Turn counter at the time the session ended
        turn: u32,
    },

    /// The interpreter payload was not a JSON object at all
    #[error("malformed turn delta: {0}")]
    MalformedDelta(String),

    /// The narrator produced an empty line
    #[error("narrator returned an empty line")]
    EmptyNarration,

    /// An ending line was already recorded, or the session is still active
    #[error("ending line not accepted: {0}")]
    EndingRejected(String),
}

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failures of the external interpreter and narrator.
///
/// The engine never retries; these are surfaced to the caller and the
/// current turn is abandoned.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Network-level failure talking to the model endpoint
    #[error("network error: {0}")]
    Network(String),

    /// The model endpoint answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The call did not complete within the configured timeout
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The reply could not be parsed
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The reply was empty after normalization
    #[error("empty reply from {0}")]
    EmptyReply(&'static str),

    /// The API key environment variable is not set
    #[error("API key environment variable '{0}' not set")]
    MissingApiKey(String),

    /// A scripted interpreter ran out of queued deltas
    #[error("scripted interpreter exhausted after {0} turns")]
    Exhausted(usize),

    /// The interpreter reply parsed but was rejected by the engine
    #[error(transparent)]
    Delta(#[from] GameError),
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", .errors.join("; "))]
    ValidationError {
        /// Path to the configuration file
        path: PathBuf,
        /// List of validation issues found
        errors: Vec<String>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Malformed `${...}` reference
    #[error("invalid variable reference at offset {position}: {message}")]
    InvalidVarRef {
        /// Character offset of the reference
        position: usize,
        /// What was wrong with it
        message: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `delirium-sim` operations.
pub type Result<T> = std::result::Result<T, SimError>;
