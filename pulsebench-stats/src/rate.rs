//! Throughput Division
//!
//! `runs / total` where `total` is a nanosecond sum that can exceed 2^53, the
//! largest integer an `f64` represents exactly. Small operands take the plain
//! float path; large ones split into an exact integer quotient plus a
//! fractional remainder so the digits that matter survive the conversion.

/// Largest integer an `f64` represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: u128 = (1 << 53) - 1;

/// Nanoseconds in one millisecond
pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Compute `count * scale / total_nanos` as `f64`.
///
/// A zero `total_nanos` follows IEEE division: `INFINITY` for a positive
/// numerator, `NaN` for zero over zero.
pub fn scaled_ratio(count: u64, scale: u64, total_nanos: u128) -> f64 {
    // u64 * u64 always fits in u128
    let numerator = u128::from(count) * u128::from(scale);

    if total_nanos == 0 {
        return numerator as f64 / 0.0;
    }

    if numerator <= MAX_SAFE_INTEGER && total_nanos <= MAX_SAFE_INTEGER {
        numerator as f64 / total_nanos as f64
    } else {
        let whole = numerator / total_nanos;
        let remainder = numerator % total_nanos;
        whole as f64 + remainder as f64 / total_nanos as f64
    }
}
