//! Threshold comparison rules (`min` / `max`).

use crate::error::{RuleError, ValidationError};
use crate::numeric::{to_float, to_int, to_uint, Number};
use crate::traits::Rule;
use crate::value::{indirect, is_empty, is_zero_time, ToValue, Value};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Returned when a value is less than the threshold.
pub static ERR_MIN_GREATER_EQUAL_THAN_REQUIRED: LazyLock<RuleError> = LazyLock::new(|| {
    RuleError::new(
        "validation_min_greater_equal_than_required",
        "must be no less than {{.threshold}}",
    )
});

/// Returned when a value is greater than the threshold.
pub static ERR_MAX_LESS_EQUAL_THAN_REQUIRED: LazyLock<RuleError> = LazyLock::new(|| {
    RuleError::new(
        "validation_max_less_equal_than_required",
        "must be no greater than {{.threshold}}",
    )
});

/// Returned when a value is less than or equal to an exclusive threshold.
pub static ERR_MIN_GREATER_THAN_REQUIRED: LazyLock<RuleError> = LazyLock::new(|| {
    RuleError::new(
        "validation_min_greater_than_required",
        "must be greater than {{.threshold}}",
    )
});

/// Returned when a value is greater than or equal to an exclusive threshold.
pub static ERR_MAX_LESS_THAN_REQUIRED: LazyLock<RuleError> = LazyLock::new(|| {
    RuleError::new(
        "validation_max_less_than_required",
        "must be less than {{.threshold}}",
    )
});

/// Comparison applied between the value and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
}

impl Operator {
    /// Whether `value` stands in this relation to `threshold`.
    pub fn compare<T: PartialOrd>(self, threshold: &T, value: &T) -> bool {
        match self {
            Operator::GreaterThan => value > threshold,
            Operator::GreaterEqualThan => value >= threshold,
            Operator::LessThan => value < threshold,
            Operator::LessEqualThan => value <= threshold,
        }
    }
}

/// The comparable kind of a threshold, fixed when the rule is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    Int(i64),
    Uint(u64),
    Float(f64),
    Time(DateTime<Utc>),
    /// A threshold of a kind that cannot be compared; holds its type name.
    Unsupported(String),
}

impl Threshold {
    /// Classify a threshold value.
    pub fn from_value(value: &Value) -> Self {
        match *value {
            Value::I8(v) => Threshold::Int(i64::from(v)),
            Value::I16(v) => Threshold::Int(i64::from(v)),
            Value::I32(v) => Threshold::Int(i64::from(v)),
            Value::I64(v) => Threshold::Int(v),
            Value::Isize(v) => i64::try_from(v)
                .map(Threshold::Int)
                .unwrap_or_else(|_| Threshold::Unsupported("isize".into())),
            Value::U8(v) => Threshold::Uint(u64::from(v)),
            Value::U16(v) => Threshold::Uint(u64::from(v)),
            Value::U32(v) => Threshold::Uint(u64::from(v)),
            Value::U64(v) => Threshold::Uint(v),
            Value::Usize(v) => u64::try_from(v)
                .map(Threshold::Uint)
                .unwrap_or_else(|_| Threshold::Unsupported("usize".into())),
            Value::F32(v) => Threshold::Float(f64::from(v)),
            Value::F64(v) => Threshold::Float(v),
            Value::Time(t) => Threshold::Time(t),
            ref other => Threshold::Unsupported(other.type_name().to_owned()),
        }
    }

    /// Read a deferred numeric literal as this threshold's kind.
    ///
    /// Integers parse as `i64` (then convert for unsigned thresholds), floats
    /// as `f64`, and times as Unix seconds. Unsupported thresholds leave the
    /// literal untouched for the dispatch to reject.
    ///
    /// A negative literal against an unsigned threshold is not reinterpreted
    /// as its two's complement bit pattern; it fails with
    /// [`ValidationError::InvalidNumber`].
    pub fn resolve_number(&self, n: &Number) -> Result<Value, ValidationError> {
        match self {
            Threshold::Int(_) => n.int64().map(Value::I64),
            Threshold::Uint(_) => {
                let i = n.int64()?;
                u64::try_from(i)
                    .map(Value::U64)
                    .map_err(|_| n.invalid("negative value for an unsigned threshold"))
            }
            Threshold::Float(_) => n.float64().map(Value::F64),
            Threshold::Time(_) => {
                let secs = n.int64()?;
                DateTime::from_timestamp(secs, 0)
                    .map(Value::Time)
                    .ok_or_else(|| n.invalid("timestamp out of range"))
            }
            Threshold::Unsupported(_) => Ok(Value::Number(n.clone())),
        }
    }
}

fn numeric<'a>(value: &'a Value, target: &'static str) -> Result<&'a Value, ValidationError> {
    if value.is_numeric() {
        Ok(value)
    } else {
        Err(ValidationError::conversion(value.type_name(), target))
    }
}

/// Checks that a value satisfies a threshold.
///
/// Only integer, float and time thresholds are supported; the value is
/// coerced to the threshold's kind before comparing. A nil or empty value is
/// valid, use [`RequiredRule`](crate::RequiredRule) to reject it.
///
/// Note that a zero value counts as empty, so `ThresholdRule::min(1)` accepts
/// `0`, including a `"0"` literal decoded from JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    threshold: Value,
    kind: Threshold,
    operator: Operator,
    err: RuleError,
}

impl ThresholdRule {
    fn new(threshold: Value, operator: Operator, err: RuleError) -> Self {
        Self {
            kind: Threshold::from_value(&threshold),
            threshold,
            operator,
            err,
        }
    }

    /// A rule checking that a value is greater than or equal to `min`.
    ///
    /// Call [`exclusive`](Self::exclusive) to require strictly greater.
    pub fn min(min: impl ToValue) -> Self {
        Self::new(
            min.to_value(),
            Operator::GreaterEqualThan,
            ERR_MIN_GREATER_EQUAL_THAN_REQUIRED.clone(),
        )
    }

    /// A rule checking that a value is less than or equal to `max`.
    ///
    /// Call [`exclusive`](Self::exclusive) to require strictly less.
    pub fn max(max: impl ToValue) -> Self {
        Self::new(
            max.to_value(),
            Operator::LessEqualThan,
            ERR_MAX_LESS_EQUAL_THAN_REQUIRED.clone(),
        )
    }

    /// Exclude the boundary value from the accepted range.
    ///
    /// Idempotent: an already exclusive rule is returned unchanged.
    pub fn exclusive(mut self) -> Self {
        match self.operator {
            Operator::GreaterEqualThan => {
                self.operator = Operator::GreaterThan;
                self.err = ERR_MIN_GREATER_THAN_REQUIRED.clone();
            }
            Operator::LessEqualThan => {
                self.operator = Operator::LessThan;
                self.err = ERR_MAX_LESS_THAN_REQUIRED.clone();
            }
            Operator::GreaterThan | Operator::LessThan => {}
        }
        self
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

    pub fn threshold(&self) -> &Value {
        &self.threshold
    }

    pub fn kind(&self) -> &Threshold {
        &self.kind
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn rule_error(&self) -> &RuleError {
        &self.err
    }

    fn satisfied(&self, value: &Value) -> Result<bool, ValidationError> {
        let op = self.operator;
        match &self.kind {
            Threshold::Int(t) => Ok(op.compare(t, &to_int(numeric(value, "i64")?)?)),
            Threshold::Uint(t) => Ok(op.compare(t, &to_uint(numeric(value, "u64")?)?)),
            Threshold::Float(t) => Ok(op.compare(t, &to_float(numeric(value, "f64")?)?)),
            Threshold::Time(t) => match value {
                Value::Time(v) => Ok(is_zero_time(v) || op.compare(t, v)),
                other => Err(ValidationError::conversion(other.type_name(), "time")),
            },
            Threshold::Unsupported(ty) => Err(ValidationError::UnsupportedType(ty.clone())),
        }
    }
}

impl Rule for ThresholdRule {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(value) = indirect(value) else {
            return Ok(());
        };
        if is_empty(value) {
            return Ok(());
        }

        let resolved;
        let value = match value {
            Value::Number(n) => {
                resolved = self.kind.resolve_number(n)?;
                if is_empty(&resolved) {
                    return Ok(());
                }
                &resolved
            }
            other => other,
        };

        if self.satisfied(value)? {
            return Ok(());
        }

        let params = HashMap::from([("threshold".to_string(), self.threshold.to_param())]);
        Err(self.err.clone().with_params(params).into())
    }

    fn rule_name(&self) -> &'static str {
        match self.operator {
            Operator::GreaterThan | Operator::GreaterEqualThan => "min",
            Operator::LessThan | Operator::LessEqualThan => "max",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn min_error_renders_threshold() {
        let rule = ThresholdRule::min(10);
        let err = rule.validate_any(&9).unwrap_err();
        assert_eq!(err.to_string(), "must be no less than 10");
        assert_eq!(
            err.rule_error().unwrap().params().get("threshold"),
            Some(&json!(10))
        );
    }

    #[test]
    fn min_custom_message() {
        let rule = ThresholdRule::min(10).error("123");
        assert_eq!(rule.rule_error().message(), "123");
        assert_eq!(
            rule.rule_error().code(),
            "validation_min_greater_equal_than_required"
        );
    }

    #[test]
    fn max_error_renders_threshold() {
        let rule = ThresholdRule::max(10);
        assert_eq!(
            rule.validate_any(&11).unwrap_err().to_string(),
            "must be no greater than 10"
        );

        let rule = rule.error("123");
        assert_eq!(rule.rule_error().message(), "123");
    }

    #[test]
    fn error_object_replaces_identity() {
        let err = RuleError::new("code", "abc");
        let rule = ThresholdRule::max(10).error_object(err.clone());

        assert_eq!(rule.rule_error(), &err);
        assert_eq!(rule.rule_error().code(), err.code());
        assert_eq!(rule.rule_error().message(), err.message());
    }

    #[test]
    fn exclusive_swaps_operator_and_error_together() {
        let rule = ThresholdRule::min(1).exclusive();
        assert_eq!(rule.operator(), Operator::GreaterThan);
        assert_eq!(rule.rule_error(), &*ERR_MIN_GREATER_THAN_REQUIRED);

        let rule = ThresholdRule::max(1).exclusive();
        assert_eq!(rule.operator(), Operator::LessThan);
        assert_eq!(rule.rule_error(), &*ERR_MAX_LESS_THAN_REQUIRED);
    }

    #[test]
    fn exclusive_is_idempotent() {
        let once = ThresholdRule::min(1).exclusive();
        let twice = once.clone().exclusive();
        assert_eq!(once, twice);

        let once = ThresholdRule::max(1).exclusive();
        assert_eq!(once.clone().exclusive(), once);
    }

    #[test]
    fn configuration_returns_copies() {
        let base = ThresholdRule::min(1);
        let exclusive = base.clone().exclusive();
        assert_eq!(base.operator(), Operator::GreaterEqualThan);
        assert_eq!(exclusive.operator(), Operator::GreaterThan);
        assert!(base.validate_any(&1).is_ok());
        assert!(exclusive.validate_any(&1).is_err());
    }

    #[test]
    fn threshold_kinds() {
        assert_eq!(ThresholdRule::min(5u8).kind(), &Threshold::Uint(5));
        assert_eq!(ThresholdRule::min(-5i16).kind(), &Threshold::Int(-5));
        assert_eq!(ThresholdRule::min(1.5f32).kind(), &Threshold::Float(1.5));
        assert_eq!(
            ThresholdRule::min("1").kind(),
            &Threshold::Unsupported("string".into())
        );
    }

    #[test]
    fn unsupported_threshold() {
        let err = ThresholdRule::min("1").validate_any(&1).unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedType("string".into()));
        assert_eq!(err.to_string(), "type not supported: string");
    }

    #[test]
    fn strings_are_not_numbers() {
        let err = ThresholdRule::min(1).validate_any("1").unwrap_err();
        assert!(!err.is_invalid());
        assert_eq!(err.to_string(), "cannot convert string to i64");
    }

    #[test]
    fn mixed_numeric_families_coerce() {
        assert!(ThresholdRule::min(2).validate_any(&3u64).is_ok());
        assert!(ThresholdRule::min(2u32).validate_any(&1i8).is_err());
        assert!(ThresholdRule::max(2.5).validate_any(&2).is_ok());
        assert_eq!(
            ThresholdRule::min(2u32)
                .validate_any(&-1i8)
                .unwrap_err()
                .to_string(),
            "cannot convert i8 to u64"
        );
    }

    #[test]
    fn negative_literal_for_unsigned_threshold_is_an_error() {
        let err = ThresholdRule::min(2u32)
            .validate_any(&Number::from("-1"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));
    }

    #[test]
    fn unparsable_literal_is_an_error() {
        let err = ThresholdRule::min(1)
            .validate_any(&Number::from("1.5"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNumber { .. }));
    }

    #[test]
    fn literal_for_time_threshold_is_unix_seconds() {
        let threshold = Utc.with_ymd_and_hms(2000, 6, 1, 0, 0, 0).unwrap();
        let rule = ThresholdRule::min(threshold);
        let later = Number::new((threshold.timestamp() + 1).to_string()).to_value();
        let earlier = Number::new((threshold.timestamp() - 1).to_string()).to_value();
        assert!(rule.validate(&later).is_ok());
        assert!(rule.validate(&earlier).is_err());
    }

    #[test]
    fn time_threshold_rejects_non_times() {
        let threshold = Utc.with_ymd_and_hms(2000, 6, 1, 0, 0, 0).unwrap();
        let err = ThresholdRule::min(threshold)
            .exclusive()
            .validate_any(&1)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot convert i32 to time");
    }

    #[test]
    fn rule_names() {
        assert_eq!(ThresholdRule::min(1).rule_name(), "min");
        assert_eq!(ThresholdRule::max(1).exclusive().rule_name(), "max");
    }
}
