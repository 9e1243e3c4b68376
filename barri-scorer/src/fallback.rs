//! Deterministic placeholder score derived from a neighbourhood identifier.

/// Lowest fallback score.
pub const FALLBACK_MIN: u32 = 5;
/// Highest fallback score.
pub const FALLBACK_MAX: u32 = 95;
const MULTIPLIER: u32 = 7;
const MODULUS: u32 = 100;

/// Derive a pseudo-score from the decimal digits of `id`.
///
/// Non-digit characters are discarded and the remaining digits are read as an
/// integer (1 when there are none). The result is `digits * 7 mod 100`
/// clamped into `5..=95`. Digits are reduced modulo 100 as they are read, so
/// identifiers of any length are accepted.
///
/// # Examples
///
/// ```
/// use barri_scorer::fallback_score;
///
/// assert_eq!(fallback_score("07-3"), 11.0);
/// assert_eq!(fallback_score("01"), 7.0);
/// assert_eq!(fallback_score("sense-codi"), 7.0);
/// ```
#[must_use]
pub fn fallback_score(id: &str) -> f64 {
    let (reduced, seen_digit) = id
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold((0_u32, false), |(acc, _), digit| {
            ((acc * 10 + digit).rem_euclid(MODULUS), true)
        });
    let value = if seen_digit { reduced } else { 1 };
    let score = (value * MULTIPLIER).rem_euclid(MODULUS);
    f64::from(score.clamp(FALLBACK_MIN, FALLBACK_MAX))
}
