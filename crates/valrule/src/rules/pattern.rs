//! Regex format rule.

use crate::error::{RuleError, ValidationError};
use crate::traits::Rule;
use crate::value::{indirect, is_empty, Value};
use regex::Regex;
use std::sync::LazyLock;

/// Returned when a value does not match the pattern.
pub static ERR_MATCH_INVALID: LazyLock<RuleError> =
    LazyLock::new(|| RuleError::new("validation_match_invalid", "must be in a valid format"));

/// Checks that a string value matches a regex pattern.
///
/// The pattern is compiled once when the rule is built. An invalid pattern
/// is reported by every call to `validate` as
/// [`ValidationError::InvalidPattern`].
#[derive(Debug, Clone)]
pub struct MatchRule {
    pattern: String,
    compiled: Result<Regex, String>,
    err: RuleError,
}

impl PartialEq for MatchRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.err == other.err
    }
}

impl MatchRule {
    /// Create a new match rule.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let compiled = Regex::new(&pattern).map_err(|e| e.to_string());
        Self {
            pattern,
            compiled,
            err: ERR_MATCH_INVALID.clone(),
        }
    }

    /// Create a match rule from an already compiled regex.
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            pattern: regex.as_str().to_owned(),
            compiled: Ok(regex),
            err: ERR_MATCH_INVALID.clone(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Set a custom error message.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.err = self.err.with_message(message);
        self
    }

    /// Replace the error value entirely.
    pub fn error_object(mut self, err: RuleError) -> Self {
        self.err = err;
        self
    }

    pub fn rule_error(&self) -> &RuleError {
        &self.err
    }

    fn regex(&self) -> Result<&Regex, ValidationError> {
        self.compiled
            .as_ref()
            .map_err(|reason| ValidationError::InvalidPattern {
                pattern: self.pattern.clone(),
                reason: reason.clone(),
            })
    }
}

impl Rule for MatchRule {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let regex = self.regex()?;
        let Some(value) = indirect(value) else {
            return Ok(());
        };
        if is_empty(value) {
            return Ok(());
        }

        let matched = match value {
            Value::String(s) => regex.is_match(s),
            Value::Bytes(b) => std::str::from_utf8(b).is_ok_and(|s| regex.is_match(s)),
            other => return Err(ValidationError::conversion(other.type_name(), "string")),
        };

        if matched {
            Ok(())
        } else {
            Err(self
                .err
                .clone()
                .param("pattern", self.pattern.as_str())
                .into())
        }
    }

    fn rule_name(&self) -> &'static str {
        "match"
    }
}
