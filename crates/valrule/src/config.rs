//! Serializable rule definitions.
//!
//! Rules can be declared in configuration files and built at startup:
//!
//! ```rust
//! use valrule::prelude::*;
//! use serde_json::json;
//!
//! let rules = RuleSet::from_json(r#"[
//!     {"type": "required"},
//!     {"type": "min", "threshold": 18},
//!     {"type": "max", "threshold": 120, "message": "too old"}
//! ]"#).unwrap();
//!
//! assert!(rules.validate_any(&json!(42)).is_ok());
//! assert_eq!(rules.validate_any(&json!(130)).unwrap_err().to_string(), "too old");
//! ```

use crate::error::{ConfigError, ValidationError};
use crate::rules::{InRule, MatchRule, NotInRule, NotNilRule, RequiredRule, ThresholdRule};
use crate::traits::{run, Rule};
use crate::value::{ToValue, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A threshold as written in configuration.
///
/// Integers are tried first, then floats, then RFC 3339 time strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ThresholdConfig {
    Int(i64),
    Uint(u64),
    Float(f64),
    Time(DateTime<Utc>),
}

impl ToValue for ThresholdConfig {
    fn to_value(&self) -> Value {
        match *self {
            ThresholdConfig::Int(v) => Value::I64(v),
            ThresholdConfig::Uint(v) => Value::U64(v),
            ThresholdConfig::Float(v) => Value::F64(v),
            ThresholdConfig::Time(t) => Value::Time(t),
        }
    }
}

/// A rule definition.
///
/// Membership values are kept as JSON, so rules built from configuration
/// compare against JSON-decoded input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    /// Set membership
    In {
        values: Vec<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Set exclusion
    NotIn {
        values: Vec<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Lower bound
    Min {
        threshold: ThresholdConfig,
        #[serde(default)]
        exclusive: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Upper bound
    Max {
        threshold: ThresholdConfig,
        #[serde(default)]
        exclusive: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Neither nil nor empty
    Required {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Not nil
    NotNil {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Regex pattern
    Match {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RuleConfig {
    /// Build the configured rule.
    pub fn build(&self) -> Box<dyn Rule> {
        match self {
            RuleConfig::In { values, message } => {
                let rule = InRule::new(values.clone());
                Box::new(match message {
                    Some(m) => rule.error(m.clone()),
                    None => rule,
                })
            }
            RuleConfig::NotIn { values, message } => {
                let rule = NotInRule::new(values.clone());
                Box::new(match message {
                    Some(m) => rule.error(m.clone()),
                    None => rule,
                })
            }
            RuleConfig::Min {
                threshold,
                exclusive,
                message,
            } => Box::new(threshold_rule(
                ThresholdRule::min(*threshold),
                *exclusive,
                message,
            )),
            RuleConfig::Max {
                threshold,
                exclusive,
                message,
            } => Box::new(threshold_rule(
                ThresholdRule::max(*threshold),
                *exclusive,
                message,
            )),
            RuleConfig::Required { message } => {
                let rule = RequiredRule::new();
                Box::new(match message {
                    Some(m) => rule.error(m.clone()),
                    None => rule,
                })
            }
            RuleConfig::NotNil { message } => {
                let rule = NotNilRule::new();
                Box::new(match message {
                    Some(m) => rule.error(m.clone()),
                    None => rule,
                })
            }
            RuleConfig::Match { pattern, message } => {
                let rule = MatchRule::new(pattern.clone());
                Box::new(match message {
                    Some(m) => rule.error(m.clone()),
                    None => rule,
                })
            }
        }
    }
}

// Exclusivity resets the error, so the message is applied last.
fn threshold_rule(rule: ThresholdRule, exclusive: bool, message: &Option<String>) -> ThresholdRule {
    let rule = if exclusive { rule.exclusive() } else { rule };
    match message {
        Some(m) => rule.error(m.clone()),
        None => rule,
    }
}

/// An ordered list of rules applied to one value.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every rule in `configs`, keeping their order.
    pub fn from_configs(configs: &[RuleConfig]) -> Self {
        Self {
            rules: configs.iter().map(RuleConfig::build).collect(),
        }
    }

    /// Load rule definitions from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let configs: Vec<RuleConfig> = serde_json::from_str(json)?;
        tracing::debug!(rules = configs.len(), "loaded rule configuration");
        Ok(Self::from_configs(&configs))
    }

    /// Append a rule.
    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules in order, stopping at the first error.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        run(value, self.rules.iter().map(Box::as_ref))
    }

    /// Lower a Rust value and run the rules against it.
    pub fn validate_any<V: ToValue + ?Sized>(&self, value: &V) -> Result<(), ValidationError> {
        self.validate(&value.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn threshold_config_variants() {
        let parsed: ThresholdConfig = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(parsed, ThresholdConfig::Int(5));
        let parsed: ThresholdConfig = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert_eq!(parsed, ThresholdConfig::Uint(u64::MAX));
        let parsed: ThresholdConfig = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(parsed, ThresholdConfig::Float(1.5));
        let parsed: ThresholdConfig =
            serde_json::from_value(json!("2000-06-01T00:00:00Z")).unwrap();
        assert_eq!(
            parsed,
            ThresholdConfig::Time(Utc.with_ymd_and_hms(2000, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rule_config_roundtrip() {
        let config = RuleConfig::Min {
            threshold: ThresholdConfig::Int(18),
            exclusive: true,
            message: Some("too young".to_string()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn rule_config_tagging() {
        let config: RuleConfig =
            serde_json::from_value(json!({"type": "not_nil"})).unwrap();
        assert_eq!(config, RuleConfig::NotNil { message: None });
        assert_eq!(config.build().rule_name(), "not_nil");
    }

    #[test]
    fn exclusive_config_keeps_custom_message() {
        let config = RuleConfig::Max {
            threshold: ThresholdConfig::Int(10),
            exclusive: true,
            message: Some("keep it under ten".to_string()),
        };
        let rule = config.build();
        assert!(rule.validate(&Value::I32(9)).is_ok());
        let err = rule.validate(&Value::I32(10)).unwrap_err();
        assert_eq!(err.to_string(), "keep it under ten");
        assert_eq!(
            err.rule_error().unwrap().code(),
            "validation_max_less_than_required"
        );
    }

    #[test]
    fn in_config_compares_json_values() {
        let rules = RuleSet::from_json(r#"[{"type": "in", "values": ["a", "b", 3]}]"#).unwrap();
        assert!(rules.validate_any(&json!("a")).is_ok());
        assert!(rules.validate_any(&json!(3)).is_ok());
        let err = rules.validate_any(&json!("z")).unwrap_err();
        assert_eq!(err.rule_error().unwrap().code(), "validation_in_invalid");
    }

    #[test]
    fn rule_set_runs_in_order() {
        let rules = RuleSet::new()
            .with(RequiredRule::new())
            .with(ThresholdRule::min(5));
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.validate_any(&None::<i32>).unwrap_err().to_string(),
            "cannot be blank"
        );
        assert_eq!(
            rules.validate_any(&3).unwrap_err().to_string(),
            "must be no less than 5"
        );
        assert!(rules.validate_any(&5).is_ok());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = RuleSet::from_json(r#"[{"type": "between"}]"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid rule configuration"));
    }

    #[test]
    fn empty_rule_set_accepts_anything() {
        let rules = RuleSet::new();
        assert!(rules.is_empty());
        assert!(rules.validate(&Value::Nil).is_ok());
    }
}
