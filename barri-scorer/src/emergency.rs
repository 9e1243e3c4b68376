//! Placeholder ranking used when no record could be ranked.
//!
//! The placeholders are synthetic: each of the first N records receives
//! `(position + 1) * 15` plus a jitter offset, clamped into `5..=95`, and the
//! list is then ordered by descending score.

use std::fmt;

use barri_core::{NeighborhoodRecord, RankedNeighborhood, ScoreSource};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Score step between consecutive placeholder positions.
pub const EMERGENCY_STEP: u32 = 15;
/// Lowest placeholder score.
pub const EMERGENCY_MIN: f64 = 5.0;
/// Highest placeholder score.
pub const EMERGENCY_MAX: f64 = 95.0;
/// Half-width of the range [`SeededJitter`] samples from.
pub const JITTER_SPAN: f64 = 5.0;

/// Supplier of per-position offsets added to placeholder scores.
pub trait JitterSource: Send + Sync + fmt::Debug {
    /// Produce `count` offsets, one per placeholder position.
    fn offsets(&self, count: usize) -> Vec<f64>;
}

/// Adds the same offset to every position. The default offset is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedJitter {
    offset: f64,
}

impl FixedJitter {
    /// Use `offset` for every position.
    #[must_use]
    pub const fn new(offset: f64) -> Self {
        Self { offset }
    }
}

impl JitterSource for FixedJitter {
    fn offsets(&self, count: usize) -> Vec<f64> {
        vec![self.offset; count]
    }
}

/// Uniform offsets in `-5.0..=5.0` from a seeded `ChaCha8` generator.
///
/// The generator is re-seeded on every call, so repeated rankings with the
/// same seed produce the same placeholders.
///
/// # Examples
///
/// ```
/// use barri_scorer::{JitterSource, SeededJitter};
///
/// let jitter = SeededJitter::new(42);
/// let offsets = jitter.offsets(3);
/// assert_eq!(offsets, jitter.offsets(3));
/// assert!(offsets.iter().all(|offset| offset.abs() <= 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededJitter {
    seed: u64,
}

impl SeededJitter {
    /// Seed the generator.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl JitterSource for SeededJitter {
    fn offsets(&self, count: usize) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..count)
            .map(|_| rng.gen_range(-JITTER_SPAN..=JITTER_SPAN))
            .collect()
    }
}

/// Placeholder score for the zero-based `position` before sorting.
#[expect(
    clippy::float_arithmetic,
    reason = "jitter is a float offset added to the position step"
)]
#[must_use]
pub fn emergency_score(position: usize, jitter: f64) -> f64 {
    let step = u32::try_from(position)
        .map_or(u32::MAX, |index| index.saturating_add(1))
        .saturating_mul(EMERGENCY_STEP);
    let offset = if jitter.is_finite() { jitter } else { 0.0 };
    (f64::from(step) + offset).clamp(EMERGENCY_MIN, EMERGENCY_MAX)
}

/// Build placeholder entries from the first `limit` records.
pub(crate) fn substitute<'a>(
    records: impl IntoIterator<Item = &'a NeighborhoodRecord>,
    limit: usize,
    jitter: &dyn JitterSource,
) -> Vec<RankedNeighborhood> {
    let candidates: Vec<&NeighborhoodRecord> = records.into_iter().take(limit).collect();
    let offsets = jitter.offsets(candidates.len());
    let mut placeholders: Vec<RankedNeighborhood> = candidates
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            let offset = offsets.get(position).copied().unwrap_or_default();
            RankedNeighborhood::new(
                record.clone(),
                emergency_score(position, offset),
                ScoreSource::Emergency,
            )
        })
        .collect();
    placeholders.sort_by(|a, b| b.tourism_score.total_cmp(&a.tourism_score));
    placeholders
}
