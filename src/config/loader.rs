//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and read (UTF-8 BOM stripped)
//! 2. Environment variable expansion on the raw text
//! 3. YAML parsing and deserialization to [`SimConfig`]
//! 4. Validation

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::config::schema::SimConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Default upper bound on a configuration file, in bytes.
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// A loaded and validated configuration.
#[derive(Debug)]
pub struct LoadResult {
    pub config: SimConfig,
    pub warnings: Vec<LoadWarning>,
}

/// Non-fatal issue found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub message: String,
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    max_size: u64,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            max_size: env_or("DELIRIUM_SIM_MAX_CONFIG_SIZE", MAX_CONFIG_SIZE),
        }
    }
}

impl ConfigLoader {
    /// Loader with an explicit size limit.
    #[must_use]
    pub const fn with_max_size(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Loads and validates the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, a variable
    /// reference cannot be expanded, the YAML does not match the schema,
    /// or validation fails.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.max_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.max_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

        debug!(path = %path.display(), bytes = raw.len(), "loading configuration");
        Self::load_str(raw, path)
    }

    /// Runs the pipeline on in-memory YAML; `path` is used for messages.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file checks.
    pub fn load_str(raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let substituted = substitute(raw)?;

        let root: Value = serde_yaml::from_str(&substituted).map_err(|e| parse_error(path, &e))?;
        let config = if root.is_null() {
            warnings.push(LoadWarning {
                message: "configuration is empty, using defaults".into(),
                location: Some(path.display().to_string()),
            });
            SimConfig::default()
        } else {
            serde_yaml::from_value(root).map_err(|e| parse_error(path, &e))?
        };

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.to_path_buf(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(|message| LoadWarning {
            message,
            location: Some(path.display().to_string()),
        }));

        Ok(LoadResult { config, warnings })
    }
}

fn parse_error(path: &Path, e: &serde_yaml::Error) -> ConfigError {
    let message = e.location().map_or_else(
        || e.to_string(),
        |loc| format!("line {}: {e}", loc.line()),
    );
    ConfigError::ParseError {
        path: PathBuf::from(path),
        message,
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Expands environment references in raw YAML text, before parsing.
///
/// - `${VAR}` expands to the value; unset is an error
/// - `${VAR:-default}` expands to `default` when unset
/// - `$$` is a literal `$`
///
/// # Errors
///
/// Returns [`ConfigError::EnvVarNotSet`] for an unset variable without a
/// default and [`ConfigError::InvalidVarRef`] for an unclosed or empty
/// reference.
pub fn substitute(raw: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut position = 0usize;

    while let Some(c) = chars.next() {
        position += 1;
        if c != '$' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                position += 1;
                result.push('$');
            }
            Some('{') => {
                let start = position;
                chars.next();
                position += 1;
                let (name, default) = parse_var_spec(&mut chars, &mut position, start)?;
                match (std::env::var(&name), default) {
                    (Ok(value), _) => result.push_str(&value),
                    (Err(_), Some(default)) => result.push_str(&default),
                    (Err(_), None) => return Err(ConfigError::EnvVarNotSet { var: name }),
                }
            }
            _ => result.push(c),
        }
    }

    Ok(result)
}

/// Reads `NAME}` or `NAME:-default}` after the opening `${`.
fn parse_var_spec(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    position: &mut usize,
    start: usize,
) -> Result<(String, Option<String>), ConfigError> {
    let mut spec = String::new();

    for c in chars.by_ref() {
        *position += 1;
        if c != '}' {
            spec.push(c);
            continue;
        }
        let (name, default) = match spec.split_once(":-") {
            Some((name, default)) => (name, Some(default.to_owned())),
            None => (spec.as_str(), None),
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidVarRef {
                position: start,
                message: "empty variable name".into(),
            });
        }
        return Ok((name.to_owned(), default));
    }

    Err(ConfigError::InvalidVarRef {
        position: start,
        message: format!("unclosed reference ${{{spec}"),
    })
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn substitution_uses_set_variable() {
        // PATH is always set
        let result = substitute("path: ${PATH}").unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
    }

    #[test]
    fn substitution_falls_back_to_default() {
        let result =
            substitute("model: ${DELIRIUM_SIM_TEST_UNSET_MODEL_XYZ:-gpt-4o-mini}").unwrap();
        assert_eq!(result, "model: gpt-4o-mini");
    }

    #[test]
    fn substitution_default_may_be_empty_or_contain_colons() {
        assert_eq!(
            substitute("a: ${DELIRIUM_SIM_TEST_UNSET_A_XYZ:-}").unwrap(),
            "a: "
        );
        assert_eq!(
            substitute("u: ${DELIRIUM_SIM_TEST_UNSET_U_XYZ:-http://localhost:8080/v1}").unwrap(),
            "u: http://localhost:8080/v1"
        );
    }

    #[test]
    fn substitution_unset_without_default_fails() {
        match substitute("x: ${DELIRIUM_SIM_TEST_UNSET_REQUIRED_XYZ}") {
            Err(ConfigError::EnvVarNotSet { var }) => {
                assert_eq!(var, "DELIRIUM_SIM_TEST_UNSET_REQUIRED_XYZ");
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn substitution_escapes_and_plain_dollars() {
        assert_eq!(substitute("price: $$100").unwrap(), "price: $100");
        assert_eq!(substitute("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn substitution_rejects_unclosed_and_empty() {
        assert!(matches!(
            substitute("x: ${UNCLOSED"),
            Err(ConfigError::InvalidVarRef { position: 4, .. })
        ));
        assert!(matches!(
            substitute("x: ${}"),
            Err(ConfigError::InvalidVarRef { .. })
        ));
    }

    #[test]
    fn load_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm:\n  model: ${{DELIRIUM_SIM_TEST_UNSET_M_XYZ:-gpt-4o}}\n  timeout_ms: 5000\n"
        )
        .unwrap();
        let result = ConfigLoader::default().load(file.path()).unwrap();
        assert_eq!(result.config.llm.model, "gpt-4o");
        assert_eq!(result.config.llm.timeout_ms, 5000);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_file_uses_defaults_with_warning() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = ConfigLoader::default().load(file.path()).unwrap();
        assert_eq!(result.config, SimConfig::default());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn bom_is_stripped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}game:\n  opening_line: 안녕\n").unwrap();
        let result = ConfigLoader::default().load(file.path()).unwrap();
        assert_eq!(result.config.game.opening_line, "안녕");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ConfigLoader::default()
            .load(Path::new("/definitely/not/here.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "game:\n  opening_line: {}", "x".repeat(64)).unwrap();
        let err = ConfigLoader::with_max_size(16).load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn validation_failure_lists_paths() {
        let err = ConfigLoader::load_str(
            "llm:\n  timeout_ms: 0\ngame:\n  opening_line: ''\n",
            Path::new("bad.yaml"),
        )
        .unwrap_err();
        match err {
            ConfigError::ValidationError { path, errors } => {
                assert_eq!(path, PathBuf::from("bad.yaml"));
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = ConfigLoader::load_str("llm: [unclosed", Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
