//! Presence rules.

use crate::error::{RuleError, ValidationError};
use crate::traits::Rule;
use crate::value::{indirect, is_empty, Value};
use std::sync::LazyLock;

/// Returned when a required value is nil or empty.
pub static ERR_REQUIRED: LazyLock<RuleError> =
    LazyLock::new(|| RuleError::new("validation_required", "cannot be blank"));

/// Returned when a value is nil.
pub static ERR_NOT_NIL_REQUIRED: LazyLock<RuleError> =
    LazyLock::new(|| RuleError::new("validation_not_nil_required", "is required"));

/// Checks that a value is neither nil nor empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredRule {
    err: RuleError,
}

impl Default for RequiredRule {
    fn default() -> Self {
        Self {
            err: ERR_REQUIRED.clone(),
        }
    }
}

impl RequiredRule {
    pub fn new() -> Self {
        Self::default()
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
}

impl Rule for RequiredRule {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match indirect(value) {
            Some(v) if !is_empty(v) => Ok(()),
            _ => Err(self.err.clone().into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "required"
    }
}

/// Checks that a value is not nil. Present but empty values pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NotNilRule {
    err: RuleError,
}

impl Default for NotNilRule {
    fn default() -> Self {
        Self {
            err: ERR_NOT_NIL_REQUIRED.clone(),
        }
    }
}

impl NotNilRule {
    pub fn new() -> Self {
        Self::default()
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
}

impl Rule for NotNilRule {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match indirect(value) {
            Some(_) => Ok(()),
            None => Err(self.err.clone().into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "not_nil"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rule_valid() {
        let rule = RequiredRule::new();
        assert!(rule.validate_any("value").is_ok());
        assert!(rule.validate_any(&1).is_ok());
        assert!(rule.validate_any(&Some(1)).is_ok());
    }

    #[test]
    fn required_rule_empty() {
        let rule = RequiredRule::new();
        for value in [
            Value::Nil,
            Value::String(String::new()),
            Value::I32(0),
            Value::Ref(None),
            Value::Ref(Some(Box::new(Value::I64(0)))),
        ] {
            let err = rule.validate(&value).unwrap_err();
            assert_eq!(err.to_string(), "cannot be blank");
        }
    }

    #[test]
    fn required_rule_custom_message() {
        let rule = RequiredRule::new().error("please fill in");
        let err = rule.validate_any("").unwrap_err();
        let rule_err = err.rule_error().unwrap();
        assert_eq!(rule_err.message(), "please fill in");
        assert_eq!(rule_err.code(), "validation_required");
    }

    #[test]
    fn not_nil_rule() {
        let rule = NotNilRule::new();
        assert!(rule.validate_any(&Some(0)).is_ok());
        assert!(rule.validate_any("").is_ok());
        let err = rule.validate_any(&None::<i32>).unwrap_err();
        assert_eq!(err.rule_error().unwrap().code(), "validation_not_nil_required");
        assert_eq!(err.to_string(), "is required");
    }

    #[test]
    fn not_nil_rule_error_object() {
        let custom = RuleError::new("missing", "gone");
        let rule = NotNilRule::new().error_object(custom.clone());
        assert_eq!(rule.validate(&Value::Nil).unwrap_err().rule_error(), Some(&custom));
    }
}
