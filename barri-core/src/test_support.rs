//! In-memory observers, sources and sinks used by unit and behaviour tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::{
    FeedbackSink, NeighbourhoodFeedback, NeighbourhoodSource, NewsletterSubscription,
    RankedNeighborhood, RankingObserver, ScoreSource, SkipReason, SourceError, SubmissionReceipt,
};

/// An event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    /// A record was scored.
    Scored {
        /// Input position.
        position: usize,
        /// Identifier of the scored record.
        id: String,
        /// Final score.
        score: f64,
        /// Rule that produced the score.
        source: ScoreSource,
    },
    /// A record was skipped.
    Skipped {
        /// Input position.
        position: usize,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Emergency substitution ran.
    Emergency {
        /// Number of placeholder entries.
        candidates: usize,
    },
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    /// Snapshot of the events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.lock().clone()
    }

    /// Positions of skipped records, in the order they were reported.
    #[must_use]
    pub fn skipped_positions(&self) -> Vec<usize> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::Skipped { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ObservedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RankingObserver for RecordingObserver {
    fn record_scored(&self, position: usize, entry: &RankedNeighborhood) {
        self.lock().push(ObservedEvent::Scored {
            position,
            id: entry.id().to_owned(),
            score: entry.tourism_score,
            source: entry.source,
        });
    }

    fn record_skipped(&self, position: usize, reason: &SkipReason) {
        self.lock().push(ObservedEvent::Skipped {
            position,
            reason: reason.clone(),
        });
    }

    fn emergency_substitution(&self, candidates: usize) {
        self.lock().push(ObservedEvent::Emergency { candidates });
    }
}

/// Source serving fixed payloads or fixed errors.
#[derive(Debug, Clone)]
pub struct StubNeighbourhoodSource {
    tourism: Result<Value, SourceError>,
    summary: Result<Value, SourceError>,
}

impl StubNeighbourhoodSource {
    /// Serve `tourism` and an empty summary batch.
    #[must_use]
    pub fn with_tourism(tourism: Value) -> Self {
        Self {
            tourism: Ok(tourism),
            summary: Ok(json!([])),
        }
    }

    /// Replace the summary payload.
    #[must_use]
    pub fn and_summary(mut self, summary: Value) -> Self {
        self.summary = Ok(summary);
        self
    }

    /// Fail both requests with `error`.
    #[must_use]
    pub fn failing(error: SourceError) -> Self {
        Self {
            tourism: Err(error.clone()),
            summary: Err(error),
        }
    }
}

impl NeighbourhoodSource for StubNeighbourhoodSource {
    fn tourism_batch(&self) -> Result<Value, SourceError> {
        self.tourism.clone()
    }

    fn summary_batch(&self) -> Result<Value, SourceError> {
        self.summary.clone()
    }
}

/// A submission captured by [`RecordingFeedbackSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A neighbourhood rating.
    Feedback(NeighbourhoodFeedback),
    /// A newsletter subscription.
    Newsletter(NewsletterSubscription),
}

/// Sink that records submissions and answers with a configurable result.
#[derive(Debug)]
pub struct RecordingFeedbackSink {
    submissions: Mutex<Vec<Submission>>,
    response: Result<SubmissionReceipt, SourceError>,
}

impl Default for RecordingFeedbackSink {
    fn default() -> Self {
        Self::answering(SubmissionReceipt {
            status: 201,
            body: json!({ "ok": true }),
        })
    }
}

impl RecordingFeedbackSink {
    /// Acknowledge every submission with `receipt`.
    #[must_use]
    pub fn answering(receipt: SubmissionReceipt) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            response: Ok(receipt),
        }
    }

    /// Fail every submission with `error` after recording it.
    #[must_use]
    pub fn failing(error: SourceError) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            response: Err(error),
        }
    }

    /// Submissions received so far.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Submission>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedbackSink for RecordingFeedbackSink {
    fn submit_feedback(
        &self,
        feedback: &NeighbourhoodFeedback,
    ) -> Result<SubmissionReceipt, SourceError> {
        self.lock().push(Submission::Feedback(feedback.clone()));
        self.response.clone()
    }

    fn subscribe(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubmissionReceipt, SourceError> {
        self.lock()
            .push(Submission::Newsletter(subscription.clone()));
        self.response.clone()
    }
}
