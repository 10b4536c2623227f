//! Sequence-matching string similarity.
//!
//! `ratio = 2 * M / T`, where `M` counts the characters left unchanged by a
//! char-level diff of the two strings and `T` is their combined length.

use similar::TextDiff;

pub fn ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// Same as [`ratio`] after lower-casing both sides.
pub fn ratio_ignore_case(a: &str, b: &str) -> f64 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}
