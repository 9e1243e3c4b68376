//! Core domain types for the Barri tourism engine.
//!
//! Neighbourhood records are decoded leniently: malformed statistics degrade
//! to `Unrecognised` variants and undecodable batch elements become skip
//! entries, so ranking always has something to work with. The traits here
//! are the seams the scorer, data sources and CLI plug into.

mod batch;
mod feedback;
mod observer;
mod ranked;
mod record;
mod source;
mod summary;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use batch::{BatchError, DecodedRecord, decode_batch, decode_record, decode_value};
pub use feedback::{
    FeedbackError, FieldError, FieldProblem, NEIGHBOURHOOD_NAME_MAX_CHARS, NeighbourhoodFeedback,
    NewsletterSubscription, Rating, is_valid_email,
};
pub use observer::{LogObserver, NoopObserver, RankingObserver};
pub use ranked::{
    RankedNeighborhood, RankingReport, SCORE_MAX, SCORE_MIN, ScoreSource, SkipReason,
    SkippedRecord, clamp_score,
};
pub use record::{
    Extra, ID_KEY, MonthlyField, MonthlySeries, NeighborhoodRecord, PEAK_MONTH, POPULATION_KEY,
    PercentageValue, RESIDENT_DENSITY_KEY, StatsPayload, TourismStats, parse_percentage,
};
pub use source::{FeedbackSink, NeighbourhoodSource, SourceError, SubmissionReceipt};
pub use summary::{NeighbourhoodSummary, decode_summaries};
