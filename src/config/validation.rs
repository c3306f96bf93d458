//! Configuration validation.
//!
//! Runs on the deserialized [`SimConfig`] and collects every issue rather
//! than stopping at the first.

use crate::config::schema::{CallParams, SimConfig};

/// Temperatures accepted by chat-completions endpoints.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Timeouts above this draw a warning.
const LONG_TIMEOUT_MS: u64 = 120_000;

/// Outcome of validating one configuration.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent loading, as `path: message`.
    pub errors: Vec<String>,

    /// Informational issues.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &SimConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        let llm = &config.llm;
        if llm.model.trim().is_empty() {
            self.add_error("llm.model", "must not be empty");
        }
        if llm.base_url.trim().is_empty() {
            self.add_error("llm.base_url", "must not be empty");
        } else if !(llm.base_url.starts_with("http://") || llm.base_url.starts_with("https://")) {
            self.add_error("llm.base_url", "must be an http(s) URL");
        } else if llm.base_url.starts_with("http://") {
            self.add_warning("llm.base_url", "API key will be sent over plain HTTP");
        }
        if llm.api_key_env.trim().is_empty() {
            self.add_error("llm.api_key_env", "must name an environment variable");
        }
        if llm.timeout_ms == 0 {
            self.add_error("llm.timeout_ms", "must be greater than 0");
        } else if llm.timeout_ms > LONG_TIMEOUT_MS {
            self.add_warning(
                "llm.timeout_ms",
                &format!("{} ms is unusually long", llm.timeout_ms),
            );
        }

        self.validate_call("llm.interpreter", llm.interpreter);
        self.validate_call("llm.narrator", llm.narrator);
        self.validate_call("llm.ending", llm.ending);

        if config.game.opening_line.trim().is_empty() {
            self.add_error("game.opening_line", "must not be empty");
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_call(&mut self, path: &str, params: CallParams) {
        if !TEMPERATURE_RANGE.contains(&params.temperature) {
            self.add_error(
                &format!("{path}.temperature"),
                &format!("{} is outside 0.0..=2.0", params.temperature),
            );
        }
        if params.max_tokens == 0 {
            self.add_error(&format!("{path}.max_tokens"), "must be greater than 0");
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(format!("{path}: {message}"));
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(format!("{path}: {message}"));
    }
}
