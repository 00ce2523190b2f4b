//! Exact rational time values
//!
//! All time offsets and durations in rhythm reconstruction are exact
//! fractions of a whole note. Floating point is never used for time:
//! equality and ordering over these values drive start-time conflict
//! detection and must be exact.

use num_rational::Rational32;

/// Re-export Rational for duration calculations
pub type Rational = Rational32;

/// The zero time value (start of measure)
pub fn zero() -> Rational {
    Rational::new(0, 1)
}

/// Render a rational time value for dumps ("0", "1/4", "3/8", ...)
pub fn format_rational(value: Rational) -> String {
    if *value.numer() == 0 {
        "0".to_string()
    } else if *value.denom() == 1 {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}
