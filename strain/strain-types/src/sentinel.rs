//! The "no data" sentinel shared by probing and compilation.

/// Value written where no data exists (outside the probed volume, or
/// propagated from an upstream "no data").
pub const SENTINEL: f64 = -1_000_000.0;

/// Values at or below this threshold are invalid.
///
/// The gap to [`SENTINEL`] absorbs arithmetic on sentinel values, e.g. a
/// difference between a sentinel and a small strain.
pub const VALIDITY_THRESHOLD: f64 = -999_990.0;

/// Returns true if `value` carries real data.
///
/// # Example
///
/// ```
/// use strain_types::{is_valid_value, SENTINEL};
///
/// assert!(is_valid_value(0.004));
/// assert!(!is_valid_value(SENTINEL));
/// assert!(!is_valid_value(SENTINEL + 5.0));
/// ```
#[inline]
#[must_use]
pub fn is_valid_value(value: f64) -> bool {
    value > VALIDITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!is_valid_value(VALIDITY_THRESHOLD));
        assert!(is_valid_value(VALIDITY_THRESHOLD + 1e-6));
    }

    #[test]
    fn test_nan_is_invalid() {
        assert!(!is_valid_value(f64::NAN));
    }
}
