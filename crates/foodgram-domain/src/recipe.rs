//! Recipe value bounds.

use thiserror::Error;

/// Smallest accepted ingredient amount and cooking time.
pub const MIN_VALUE: i32 = 1;

/// Largest accepted ingredient amount and cooking time.
pub const MAX_VALUE: i32 = 32000;

/// Maximum recipe name length in characters.
pub const RECIPE_NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value {0} is outside {MIN_VALUE}..={MAX_VALUE}")]
pub struct OutOfRange(pub i64);

/// Check an ingredient amount or cooking time against [`MIN_VALUE`]..=[`MAX_VALUE`].
///
/// Takes `i64` so oversized JSON numbers are rejected instead of wrapping.
pub fn bounded_value(value: i64) -> Result<i32, OutOfRange> {
    if (i64::from(MIN_VALUE)..=i64::from(MAX_VALUE)).contains(&value) {
        Ok(value as i32)
    } else {
        Err(OutOfRange(value))
    }
}

pub fn validate_recipe_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    len > 0 && len <= RECIPE_NAME_MAX_LEN
}
