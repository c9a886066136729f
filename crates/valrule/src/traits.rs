//! The rule contract.

use crate::error::ValidationError;
use crate::value::{ToValue, Value};
use std::fmt::Debug;

/// A validation rule.
///
/// Rules are immutable once built: configuration methods return modified
/// copies, so one instance can be shared across threads and reused.
///
/// ## Example
///
/// ```rust
/// use valrule::prelude::*;
///
/// #[derive(Debug)]
/// struct EvenRule;
///
/// impl Rule for EvenRule {
///     fn validate(&self, value: &Value) -> Result<(), ValidationError> {
///         let Some(value) = indirect(value) else {
///             return Ok(());
///         };
///         if to_int(value)? % 2 == 0 {
///             Ok(())
///         } else {
///             Err(RuleError::new("even", "must be even").into())
///         }
///     }
///
///     fn rule_name(&self) -> &'static str {
///         "even"
///     }
/// }
///
/// assert!(EvenRule.validate_any(&4).is_ok());
/// assert!(EvenRule.validate_any(&3).is_err());
/// ```
pub trait Rule: Debug + Send + Sync {
    /// Validate the value against this rule.
    ///
    /// Returns [`ValidationError::Invalid`] when the value breaks the rule and
    /// any other variant when the rule cannot evaluate the value.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Get the rule name for diagnostics.
    fn rule_name(&self) -> &'static str;

    /// Lower a Rust value and validate it.
    fn validate_any<V: ToValue + ?Sized>(&self, value: &V) -> Result<(), ValidationError>
    where
        Self: Sized,
    {
        self.validate(&value.to_value())
    }
}

/// Run `rules` against `value` in order, stopping at the first error.
pub fn validate(value: &Value, rules: &[&dyn Rule]) -> Result<(), ValidationError> {
    run(value, rules.iter().copied())
}

pub(crate) fn run<'a, R>(
    value: &Value,
    rules: impl IntoIterator<Item = &'a R>,
) -> Result<(), ValidationError>
where
    R: Rule + ?Sized + 'a,
{
    for rule in rules {
        if let Err(err) = rule.validate(value) {
            match &err {
                ValidationError::Invalid(e) => {
                    tracing::trace!(rule = rule.rule_name(), code = e.code(), "validation failed");
                }
                other => {
                    tracing::debug!(rule = rule.rule_name(), error = %other, "rule could not evaluate value");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}
