//! Option and range validators shared by the server and the client.

use std::fmt::Display;

use tracing::warn;

use crate::InvalidOption;

const VALIDATE_TARGET: &str = module_path!();

/// Returns `value` when it lies in `[min, max]`, otherwise the nearest bound.
///
/// Out-of-range input is a recoverable correction: a warning is logged and
/// the bound is returned. Values that do not compare (such as `NaN`) pass
/// through unchanged.
#[must_use]
pub fn clamp_range<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + Display,
{
    let corrected = if value < min {
        min
    } else if value > max {
        max
    } else {
        return value;
    };
    warn!(
        target: VALIDATE_TARGET,
        %value,
        %min,
        %max,
        %corrected,
        "value out of range; using nearest bound"
    );
    corrected
}

/// Accepts `value` only when it is one of `allowed`.
///
/// # Errors
///
/// Returns [`InvalidOption`] listing the accepted values.
pub fn validate_option(value: &str, allowed: &[&str]) -> Result<(), InvalidOption> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(InvalidOption {
        value: value.to_owned(),
        allowed: allowed.iter().map(|option| (*option).to_owned()).collect(),
    })
}
