//! Diagnostic log setup.
//!
//! Logs go to stderr only. Stdout carries the transcript in `play` and the
//! report in `replay`, and must stay parseable when `--format json` is used.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Filter directive read from the environment. When set, `-v` is ignored.
pub const LOG_LEVEL_ENV: &str = "DELIRIUM_SIM_LOG_LEVEL";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Level for a `-v` count. Quiet by default so a play session only shows
/// warnings such as defaulted delta fields or failed narration.
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Whether human-format logs should carry ANSI colors.
///
/// `auto` colors only an interactive stderr and honors `NO_COLOR`.
#[must_use]
pub const fn wants_ansi(color: ColorChoice, stderr_is_tty: bool, no_color_set: bool) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => stderr_is_tty && !no_color_set,
    }
}

fn level_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Installs the global subscriber. A second call keeps the first
/// subscriber and does nothing.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(level_filter(verbosity))
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => builder
            .with_ansi(wants_ansi(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            ))
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_by_verbosity() {
        let levels: Vec<_> = [0, 1, 2, 3, 200]
            .into_iter()
            .map(level_for_verbosity)
            .collect();
        assert_eq!(levels, ["warn", "info", "debug", "trace", "trace"]);
    }

    #[test]
    fn auto_color_needs_tty_and_no_opt_out() {
        assert!(wants_ansi(ColorChoice::Auto, true, false));
        assert!(!wants_ansi(ColorChoice::Auto, false, false));
        assert!(!wants_ansi(ColorChoice::Auto, true, true));
    }

    #[test]
    fn explicit_color_choice_wins() {
        assert!(wants_ansi(ColorChoice::Always, false, true));
        assert!(!wants_ansi(ColorChoice::Never, true, false));
    }

    #[test]
    fn second_init_is_ignored() {
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
        init_logging(LogFormat::Human, 0, ColorChoice::Auto);
    }
}
