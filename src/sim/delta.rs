//! Per-turn score delta produced by the interpreter.
//!
//! Parsing is deliberately lenient: a field that is missing or not a
//! number contributes `0` and is reported as a [`DeltaIssue`] instead of
//! failing the turn. Only a payload that is not an object at all is
//! rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GameError;

/// Structured judgement of one nurse utterance.
///
/// Each field is expected in `[-5, 5]`; out-of-range values are accepted
/// and simply flow through the scoring rules and the final clamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnDelta {
    pub empathy: i32,
    pub reorientation: i32,
    pub cam_assessment: i32,
    pub sedative_request: i32,
    pub safety_intervention: i32,
}

impl TurnDelta {
    /// Field names in the order the interpreter is asked for them.
    pub const FIELDS: [&'static str; 5] = [
        "empathy",
        "reorientation",
        "cam_assessment",
        "sedative_request",
        "safety_intervention",
    ];

    /// Parses a JSON value leniently.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedDelta`] if `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Result<ParsedDelta, GameError> {
        let Value::Object(map) = value else {
            return Err(GameError::MalformedDelta(format!(
                "expected an object, got {}",
                json_kind(value)
            )));
        };

        let mut issues = Vec::new();
        let mut read = |field: &'static str| -> i32 {
            match map.get(field) {
                None | Some(Value::Null) => {
                    issues.push(DeltaIssue {
                        field,
                        kind: IssueKind::Missing,
                    });
                    0
                }
                Some(v) => coerce_int(v).unwrap_or_else(|| {
                    issues.push(DeltaIssue {
                        field,
                        kind: IssueKind::NotNumeric(v.to_string()),
                    });
                    0
                }),
            }
        };

        let delta = Self {
            empathy: read("empathy"),
            reorientation: read("reorientation"),
            cam_assessment: read("cam_assessment"),
            sedative_request: read("sedative_request"),
            safety_intervention: read("safety_intervention"),
        };

        Ok(ParsedDelta { delta, issues })
    }

    /// Parses an interpreter reply: optional Markdown code fence around a
    /// JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedDelta`] if the text is not JSON or
    /// not a JSON object.
    pub fn from_reply(text: &str) -> Result<ParsedDelta, GameError> {
        let body = strip_code_fence(text);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| GameError::MalformedDelta(format!("reply is not JSON: {e}")))?;
        Self::from_value(&value)
    }
}

/// A delta together with the fields that had to be defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDelta {
    pub delta: TurnDelta,
    pub issues: Vec<DeltaIssue>,
}

/// A field that contributed `0` because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    NotNumeric(String),
}

impl std::fmt::Display for DeltaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: missing, treated as 0", self.field),
            IssueKind::NotNumeric(raw) => {
                write!(f, "{}: not a number ({raw}), treated as 0", self.field)
            }
        }
    }
}

/// Integers pass through (saturating to `i32`), floats round to nearest,
/// numeric strings are parsed. Anything else is `None`.
#[allow(clippy::cast_possible_truncation)]
fn coerce_int(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            } else if let Some(u) = n.as_u64() {
                Some(i32::try_from(u).unwrap_or(i32::MAX))
            } else {
                // `as` saturates for floats
                n.as_f64().map(|f| f.round() as i32)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i32)
            })
        }
        _ => None,
    }
}

const fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Removes a surrounding ```` ```json ... ``` ```` fence if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") up to the first newline
    let rest = rest.find('\n').map_or(rest, |i| &rest[i + 1..]);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
