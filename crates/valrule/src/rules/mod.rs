//! Validation rules.
//!
//! Every rule treats a nil or empty value as valid, except the presence rules
//! whose whole purpose is to reject it.

mod membership;
mod pattern;
mod required;
mod threshold;

pub use membership::*;
pub use pattern::*;
pub use required::*;
pub use threshold::*;
