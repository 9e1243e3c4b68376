//! Rank neighbourhoods by tourism score.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use barri_core::{
    DecodedRecord, NeighborhoodRecord, NoopObserver, RankedNeighborhood, RankingObserver,
    RankingReport, ScoreSource, SkipReason, SkippedRecord,
};

use crate::emergency::{self, FixedJitter, JitterSource};
use crate::normalizer::{NormalizedScore, ReferenceMax, normalize};
use crate::{RankerConfigError, fallback_score};

/// Default number of neighbourhoods kept in a ranking.
pub const DEFAULT_TOP_N: usize = 5;

const DEFAULT_TOP_N_NONZERO: NonZeroUsize = match NonZeroUsize::new(DEFAULT_TOP_N) {
    Some(top_n) => top_n,
    None => NonZeroUsize::MIN,
};

/// Ranking size and score rescaling.
///
/// # Examples
///
/// ```
/// use barri_scorer::RankerConfig;
///
/// let config = RankerConfig::default().with_top_n(3)?.with_reference_max(5_000.0)?;
/// assert_eq!(config.top_n(), 3);
/// assert_eq!(config.reference_max().get(), 5_000.0);
/// assert!(RankerConfig::default().with_top_n(0).is_err());
/// # Ok::<(), barri_scorer::RankerConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerConfig {
    top_n: NonZeroUsize,
    reference_max: ReferenceMax,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N_NONZERO,
            reference_max: ReferenceMax::default(),
        }
    }
}

impl RankerConfig {
    /// Replace the ranking size.
    ///
    /// # Errors
    /// Returns [`RankerConfigError::ZeroTopN`] for `0`.
    pub fn with_top_n(mut self, top_n: usize) -> Result<Self, RankerConfigError> {
        self.top_n = NonZeroUsize::new(top_n).ok_or(RankerConfigError::ZeroTopN)?;
        Ok(self)
    }

    /// Replace the reference maximum.
    ///
    /// # Errors
    /// Returns [`RankerConfigError::InvalidReferenceMax`] unless the value is
    /// finite and positive.
    pub fn with_reference_max(mut self, value: f64) -> Result<Self, RankerConfigError> {
        self.reference_max = ReferenceMax::new(value)?;
        Ok(self)
    }

    /// Number of neighbourhoods kept.
    #[must_use]
    pub const fn top_n(&self) -> usize {
        self.top_n.get()
    }

    /// Reference maximum for monthly averages.
    #[must_use]
    pub const fn reference_max(&self) -> ReferenceMax {
        self.reference_max
    }
}

/// Scores, sorts and truncates neighbourhood batches.
///
/// Ranking is pure apart from observer callbacks: the same batch always gives
/// the same report unless a randomised [`JitterSource`] is installed and the
/// emergency path runs.
///
/// # Examples
///
/// ```
/// use barri_core::{NeighborhoodRecord, PercentageValue};
/// use barri_scorer::TourismRanker;
///
/// let records = vec![
///     NeighborhoodRecord::new("01").with_district_percentage(PercentageValue::Number(40.0)),
///     NeighborhoodRecord::new("02").with_district_percentage(PercentageValue::Number(90.0)),
/// ];
/// let report = TourismRanker::default().rank_records(&records);
/// assert_eq!(report.ids(), ["02", "01"]);
/// ```
#[derive(Clone)]
pub struct TourismRanker {
    config: RankerConfig,
    jitter: Arc<dyn JitterSource>,
    observer: Arc<dyn RankingObserver>,
}

impl fmt::Debug for TourismRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourismRanker")
            .field("config", &self.config)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}

impl Default for TourismRanker {
    fn default() -> Self {
        Self::new(RankerConfig::default())
    }
}

impl TourismRanker {
    /// Create a ranker with fixed zero jitter and no observer.
    #[must_use]
    pub fn new(config: RankerConfig) -> Self {
        Self {
            config,
            jitter: Arc::new(FixedJitter::default()),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Install the jitter source used by emergency substitution.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Install an observer for ranking events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RankingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> RankerConfig {
        self.config
    }

    /// Score a single record, falling back to its identifier digits when no
    /// statistic is usable.
    #[must_use]
    pub fn score(&self, record: &NeighborhoodRecord) -> NormalizedScore {
        normalize(record, self.config.reference_max).unwrap_or_else(|| NormalizedScore {
            score: fallback_score(record.id_or_empty()),
            source: ScoreSource::IdentifierFallback,
        })
    }

    /// Rank already-decoded records.
    #[must_use]
    pub fn rank_records(&self, records: &[NeighborhoodRecord]) -> RankingReport {
        let batch: Vec<DecodedRecord> = records.iter().cloned().map(Ok).collect();
        self.rank(&batch)
    }

    /// Rank a decoded batch.
    ///
    /// Records without an identifier and undecodable elements are reported as
    /// skipped. When nothing can be ranked, the first `top_n` decodable
    /// records are returned as emergency placeholders.
    #[must_use]
    pub fn rank(&self, batch: &[DecodedRecord]) -> RankingReport {
        let mut ranked = Vec::with_capacity(batch.len());
        let mut skipped = Vec::new();

        for (position, decoded) in batch.iter().enumerate() {
            match decoded {
                Ok(record) if has_identifier(record) => {
                    let NormalizedScore { score, source } = self.score(record);
                    let entry = RankedNeighborhood::new(record.clone(), score, source);
                    self.observer.record_scored(position, &entry);
                    ranked.push(entry);
                }
                Ok(_) => self.skip(&mut skipped, position, SkipReason::MissingIdentifier),
                Err(reason) => self.skip(&mut skipped, position, reason.clone()),
            }
        }

        // `sort_by` is stable, so equal scores keep their input order.
        ranked.sort_by(|a, b| b.tourism_score.total_cmp(&a.tourism_score));
        ranked.truncate(self.config.top_n());

        if !ranked.is_empty() {
            log::debug!(
                "Ranked {} of {} neighbourhood records ({} skipped)",
                ranked.len(),
                batch.len(),
                skipped.len()
            );
            return RankingReport {
                ranked,
                skipped,
                emergency: false,
            };
        }

        let placeholders = emergency::substitute(
            batch.iter().filter_map(|decoded| decoded.as_ref().ok()),
            self.config.top_n(),
            self.jitter.as_ref(),
        );
        self.observer.emergency_substitution(placeholders.len());
        RankingReport {
            emergency: !placeholders.is_empty(),
            ranked: placeholders,
            skipped,
        }
    }

    fn skip(&self, skipped: &mut Vec<SkippedRecord>, position: usize, reason: SkipReason) {
        self.observer.record_skipped(position, &reason);
        skipped.push(SkippedRecord { position, reason });
    }
}

fn has_identifier(record: &NeighborhoodRecord) -> bool {
    record.id.as_deref().is_some_and(|id| !id.trim().is_empty())
}
