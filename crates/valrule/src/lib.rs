//! # valrule
//!
//! Composable value validation rules with structured, localizable errors.
//!
//! Each rule checks one constraint (set membership, a numeric or time
//! threshold, presence, a format) against a [`Value`] and reports either
//! nothing or an error. Validation failures carry a [`RuleError`] with a
//! stable code, a message template and named parameters, so callers can show
//! the rendered message or look the code up for translation.
//!
//! ## Example
//!
//! ```rust
//! use valrule::prelude::*;
//!
//! let age = ThresholdRule::min(18);
//! assert!(age.validate_any(&21).is_ok());
//!
//! let err = age.validate_any(&16).unwrap_err();
//! assert_eq!(err.to_string(), "must be no less than 18");
//! assert_eq!(
//!     err.rule_error().unwrap().code(),
//!     "validation_min_greater_equal_than_required"
//! );
//!
//! let color = InRule::new(["red", "green", "blue"]).error("unknown color");
//! assert!(color.validate_any("green").is_ok());
//! assert_eq!(color.validate_any("pink").unwrap_err().to_string(), "unknown color");
//! ```
//!
//! ## Rules
//!
//! - [`InRule`] / [`NotInRule`] - membership by deep equality
//! - [`ThresholdRule::min`] / [`ThresholdRule::max`] - inclusive bounds,
//!   strict with [`ThresholdRule::exclusive`]
//! - [`RequiredRule`] - neither nil nor empty
//! - [`NotNilRule`] - not nil
//! - [`MatchRule`] - regex format
//!
//! Nil and empty values are valid for every rule except the presence rules.
//!
//! ## Error Format
//!
//! A [`RuleError`] serializes as:
//!
//! ```json
//! {
//!   "code": "validation_max_less_equal_than_required",
//!   "message": "must be no greater than {{.threshold}}",
//!   "params": {"threshold": 10}
//! }
//! ```

mod config;
mod error;
mod numeric;
mod rules;
mod traits;
mod value;

#[cfg(test)]
mod tests;

pub use config::{RuleConfig, RuleSet, ThresholdConfig};
pub use error::{ConfigError, RuleError, ValidationError};
pub use numeric::{to_float, to_int, to_uint, Number};
pub use rules::*;
pub use traits::{validate, Rule};
pub use value::{
    format_time, indirect, is_empty, is_zero_time, zero_time, MapValue, StructValue, ToValue,
    Value,
};

/// Prelude module for validation
pub mod prelude {
    pub use crate::config::{RuleConfig, RuleSet, ThresholdConfig};
    pub use crate::error::{RuleError, ValidationError};
    pub use crate::numeric::{to_float, to_int, to_uint, Number};
    pub use crate::rules::*;
    pub use crate::traits::{validate, Rule};
    pub use crate::value::{indirect, is_empty, StructValue, ToValue, Value};
}
