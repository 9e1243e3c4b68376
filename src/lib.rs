//! Facade crate for the Barcelona neighbourhood tourism engine.
//!
//! This crate re-exports the record model and the ranker, and exposes the
//! file and HTTP dataset sources behind the `sources` feature.

#![forbid(unsafe_code)]

pub use barri_core::{
    BatchError, DecodedRecord, FeedbackError, FeedbackSink, NeighborhoodRecord,
    NeighbourhoodFeedback, NeighbourhoodSource, NeighbourhoodSummary, NewsletterSubscription,
    RankedNeighborhood, RankingObserver, RankingReport, ScoreSource, SkipReason, SourceError,
    SubmissionReceipt, decode_batch, decode_summaries, decode_value,
};
pub use barri_scorer::{
    ComparisonRow, ComparisonSelection, FixedJitter, JitterSource, RankerConfig,
    RankerConfigError, ReferenceMax, SeededJitter, TourismRanker, compare_neighbourhoods,
};

#[cfg(feature = "sources")]
pub use barri_data::{
    FileNeighbourhoodSource, HttpFeedbackSink, HttpNeighbourhoodSource, HttpSourceConfig,
};
