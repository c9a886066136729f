//! Error types for rule evaluation.
//!
//! A rule reports two disjoint kinds of failure. A value that is well formed
//! but breaks the rule yields [`ValidationError::Invalid`] carrying the rule's
//! [`RuleError`]. A rule that cannot evaluate the value at all (wrong input
//! type, unparsable literal, unsupported threshold) yields one of the other
//! variants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The error value a rule reports when validation fails.
///
/// Identified by a stable `code`, with a human-readable `message` template
/// whose `{{.name}}` placeholders are filled from `params`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleError {
    code: String,
    message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, serde_json::Value>,
}

impl RuleError {
    /// Create a new rule error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// The stable machine identifier, e.g. `validation_in_invalid`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message template.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> &HashMap<String, serde_json::Value> {
        &self.params
    }

    /// Derive an error with a new message, keeping code and params.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Derive an error with its params replaced wholesale.
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, serde_json::Value>) -> Self {
        self.params = params;
        self
    }

    /// Add a single parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.params.insert(key.into(), v);
        }
        self
    }

    /// Interpolate parameters into the message.
    ///
    /// Replaces `{{.name}}` placeholders with the matching param. Placeholders
    /// without a param are left as written. The template is scanned once, so
    /// substituted text is never expanded again.
    pub fn interpolate_message(&self) -> String {
        let mut result = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();
        while let Some(start) = rest.find("{{.") {
            result.push_str(&rest[..start]);
            let tail = &rest[start + 3..];
            let Some(end) = tail.find("}}") else {
                result.push_str(&rest[start..]);
                return result;
            };
            match self.params.get(&tail[..end]) {
                Some(value) => result.push_str(&render_param(value)),
                None => result.push_str(&rest[start..start + 3 + end + 2]),
            }
            rest = &tail[end + 2..];
        }
        result.push_str(rest);
        result
    }
}

fn render_param(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        // Integral floats print as `2`, not `2.0`.
        serde_json::Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string()),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "<nil>".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.interpolate_message())
    }
}

impl std::error::Error for RuleError {}

/// Error returned by [`Rule::validate`](crate::Rule::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The value did not satisfy the rule.
    #[error(transparent)]
    Invalid(#[from] RuleError),

    /// The value could not be coerced to the type the rule compares with.
    #[error("cannot convert {from_type} to {to_type}")]
    Conversion {
        from_type: String,
        to_type: &'static str,
    },

    /// The rule was configured with a threshold it cannot compare.
    #[error("type not supported: {0}")]
    UnsupportedType(String),

    /// A deferred numeric literal failed to parse.
    #[error("invalid number literal {literal:?}: {reason}")]
    InvalidNumber { literal: String, reason: String },

    /// A pattern rule was configured with an invalid regex.
    #[error("invalid regex pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ValidationError {
    pub(crate) fn conversion(from_type: &str, to_type: &'static str) -> Self {
        ValidationError::Conversion {
            from_type: from_type.to_owned(),
            to_type,
        }
    }

    /// Whether this is a validation failure rather than a configuration or
    /// type error.
    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationError::Invalid(_))
    }

    /// The rule's error value, for validation failures.
    pub fn rule_error(&self) -> Option<&RuleError> {
        match self {
            ValidationError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

/// Error loading rule configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rule configuration: {0}")]
    Json(#[from] serde_json::Error),
}
