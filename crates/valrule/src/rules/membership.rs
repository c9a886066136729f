//! Set membership rules.

use crate::error::{RuleError, ValidationError};
use crate::traits::Rule;
use crate::value::{indirect, is_empty, ToValue, Value};
use std::fmt::Debug;
use std::sync::LazyLock;

/// Returned when a value is not one of the allowed values.
pub static ERR_IN_INVALID: LazyLock<RuleError> =
    LazyLock::new(|| RuleError::new("validation_in_invalid", "must be a valid value"));

/// Returned when a value is one of the forbidden values.
pub static ERR_NOT_IN_INVALID: LazyLock<RuleError> =
    LazyLock::new(|| RuleError::new("validation_not_in_invalid", "must not be in list"));

fn contains<T: ToValue>(elements: &[T], value: &Value) -> bool {
    elements.iter().any(|e| e.to_value() == *value)
}

/// Checks that a value is one of a fixed list of values.
///
/// Candidates are compared by deep structural equality after the value is
/// normalized, so `InRule::new([1, 2, 3])` matches `2i32` and `Some(2i32)`
/// but not `2i64`. A nil or empty value is valid; pair with
/// [`RequiredRule`](crate::RequiredRule) to reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct InRule<T> {
    elements: Vec<T>,
    err: RuleError,
}

impl<T> InRule<T> {
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            elements: values.into_iter().collect(),
            err: ERR_IN_INVALID.clone(),
        }
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
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

impl<T> Rule for InRule<T>
where
    T: ToValue + Debug + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(value) = indirect(value) else {
            return Ok(());
        };
        if is_empty(value) || contains(&self.elements, value) {
            return Ok(());
        }
        Err(self.err.clone().into())
    }

    fn rule_name(&self) -> &'static str {
        "in"
    }
}

/// Checks that a value is none of a fixed list of values.
///
/// The inverse of [`InRule`], with the same equality and emptiness semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct NotInRule<T> {
    elements: Vec<T>,
    err: RuleError,
}

impl<T> NotInRule<T> {
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            elements: values.into_iter().collect(),
            err: ERR_NOT_IN_INVALID.clone(),
        }
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
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

impl<T> Rule for NotInRule<T>
where
    T: ToValue + Debug + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(value) = indirect(value) else {
            return Ok(());
        };
        if is_empty(value) || !contains(&self.elements, value) {
            return Ok(());
        }
        Err(self.err.clone().into())
    }

    fn rule_name(&self) -> &'static str {
        "not_in"
    }
}
