//! Observability hook for ranking decisions.
//!
//! Rankers report each scored record, each skip and any emergency
//! substitution to a [`RankingObserver`]. [`LogObserver`] forwards events to
//! the `log` facade; [`NoopObserver`] discards them.

use crate::{RankedNeighborhood, SkipReason};

/// Receive ranking events. All methods default to doing nothing.
///
/// Observers must be `Send + Sync` so a ranker can be shared across threads.
pub trait RankingObserver: Send + Sync {
    /// A record at `position` received a score.
    fn record_scored(&self, position: usize, entry: &RankedNeighborhood) {
        let _ = (position, entry);
    }

    /// The element at `position` was excluded.
    fn record_skipped(&self, position: usize, reason: &SkipReason) {
        let _ = (position, reason);
    }

    /// Emergency substitution replaced an empty ranking with `candidates`
    /// placeholder entries.
    fn emergency_substitution(&self, candidates: usize) {
        let _ = candidates;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RankingObserver for NoopObserver {}

/// Observer that writes events through the `log` facade.
///
/// Scores are logged at `debug`, low-confidence scores and skips at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RankingObserver for LogObserver {
    fn record_scored(&self, position: usize, entry: &RankedNeighborhood) {
        if entry.is_low_confidence() {
            log::warn!(
                "Neighbourhood {} at position {position} scored {} from {:?}; no usable statistics",
                entry.id(),
                entry.tourism_score,
                entry.source
            );
        } else {
            log::debug!(
                "Neighbourhood {} at position {position} scored {} from {:?}",
                entry.id(),
                entry.tourism_score,
                entry.source
            );
        }
    }

    fn record_skipped(&self, position: usize, reason: &SkipReason) {
        log::warn!("Skipped neighbourhood record at position {position}: {reason}");
    }

    fn emergency_substitution(&self, candidates: usize) {
        log::warn!(
            "Ranking produced no entries; substituted {candidates} placeholder neighbourhoods"
        );
    }
}
