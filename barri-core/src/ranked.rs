//! Ranking output types.
//!
//! A [`RankedNeighborhood`] is created fresh on every ranking call and carries
//! the score alongside the rule that produced it, so consumers can tell a
//! measured figure from a placeholder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MonthlyField, NeighborhoodRecord};

/// Lowest score the tourism scale allows.
pub const SCORE_MIN: f64 = 0.0;
/// Highest score the tourism scale allows.
pub const SCORE_MAX: f64 = 100.0;

/// Clamp a raw score into `SCORE_MIN..=SCORE_MAX`, mapping non-finite input to
/// `None`.
///
/// # Examples
///
/// ```
/// use barri_core::clamp_score;
///
/// assert_eq!(clamp_score(140.0), Some(100.0));
/// assert_eq!(clamp_score(-3.0), Some(0.0));
/// assert_eq!(clamp_score(f64::NAN), None);
/// ```
#[must_use]
pub fn clamp_score(raw: f64) -> Option<f64> {
    raw.is_finite().then(|| raw.clamp(SCORE_MIN, SCORE_MAX))
}

/// The rule that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreSource {
    /// `turisme_percentatge_districte` on the record itself.
    DirectPercentage,
    /// `turisme_percentatge_districte` inside the statistics object.
    NestedPercentage,
    /// Average of a monthly visitor series rescaled by the reference maximum.
    MonthlyAverage {
        /// The series that supplied the average.
        field: MonthlyField,
    },
    /// Pseudo-score derived from the identifier digits.
    IdentifierFallback,
    /// Synthetic placeholder assigned when nothing could be ranked.
    Emergency,
}

impl ScoreSource {
    /// Whether the score is content-free and should be presented as such.
    #[must_use]
    pub const fn is_low_confidence(self) -> bool {
        matches!(self, Self::IdentifierFallback | Self::Emergency)
    }
}

const SCORE_KEY: &str = "tourismScore";
const SOURCE_KEY: &str = "scoreSource";

/// A neighbourhood annotated with its tourism score.
///
/// Serialises as the input record with `tourismScore` and `scoreSource`
/// keys added. Passthrough keys with those names are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNeighborhood {
    /// The source record, including passthrough fields.
    #[serde(flatten)]
    pub record: NeighborhoodRecord,
    /// Score in `0.0..=100.0`.
    #[serde(rename = "tourismScore")]
    pub tourism_score: f64,
    /// How the score was obtained.
    #[serde(rename = "scoreSource")]
    pub source: ScoreSource,
}

impl RankedNeighborhood {
    /// Pair a record with a score, clamping the score into range.
    ///
    /// Non-finite scores are stored as `SCORE_MIN`.
    #[must_use]
    pub fn new(mut record: NeighborhoodRecord, score: f64, source: ScoreSource) -> Self {
        record
            .extra
            .retain(|key, _| key != SCORE_KEY && key != SOURCE_KEY);
        Self {
            record,
            tourism_score: clamp_score(score).unwrap_or(SCORE_MIN),
            source,
        }
    }

    /// Identifier of the neighbourhood, `""` for placeholders built from
    /// records without one.
    #[must_use]
    pub fn id(&self) -> &str {
        self.record.id_or_empty()
    }

    /// Display name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    /// District name, if known.
    #[must_use]
    pub fn district(&self) -> Option<&str> {
        self.record.district.as_deref()
    }

    /// Shorthand for [`ScoreSource::is_low_confidence`].
    #[must_use]
    pub const fn is_low_confidence(&self) -> bool {
        self.source.is_low_confidence()
    }
}

/// Why an input element took no part in ranking.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The record has no usable `codi_barri`.
    #[error("record has no identifier")]
    MissingIdentifier,
    /// The element was not a decodable neighbourhood object.
    #[error("record could not be decoded: {message}")]
    Undecodable {
        /// Decoder diagnostic.
        message: String,
    },
}

/// A skipped input element and its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Zero-based index in the input batch.
    pub position: usize,
    /// Why the element was excluded.
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of one ranking call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingReport {
    /// Top-N neighbourhoods, highest score first.
    pub ranked: Vec<RankedNeighborhood>,
    /// Elements excluded from ranking, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
    /// Whether the ranked list consists of emergency placeholders.
    #[serde(default)]
    pub emergency: bool,
}

impl RankingReport {
    /// Scores in ranked order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.ranked.iter().map(|entry| entry.tourism_score).collect()
    }

    /// Identifiers in ranked order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.ranked.iter().map(RankedNeighborhood::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ScoreSource::DirectPercentage, false)]
    #[case(ScoreSource::NestedPercentage, false)]
    #[case(ScoreSource::MonthlyAverage { field: MonthlyField::District }, false)]
    #[case(ScoreSource::IdentifierFallback, true)]
    #[case(ScoreSource::Emergency, true)]
    fn low_confidence_sources(#[case] source: ScoreSource, #[case] expected: bool) {
        assert_eq!(source.is_low_confidence(), expected);
    }

    #[rstest]
    fn stale_score_keys_in_the_record_are_replaced() {
        let record = NeighborhoodRecord::new("01")
            .with_extra("tourismScore", json!(99))
            .with_extra("scoreSource", json!("upstream"))
            .with_extra("hoteles", json!(12));
        let ranked = RankedNeighborhood::new(record, 20.0, ScoreSource::DirectPercentage);

        let encoded = serde_json::to_string(&ranked).expect("encode ranked entry");

        assert_eq!(encoded.matches("\"tourismScore\"").count(), 1);
        assert_eq!(encoded.matches("\"scoreSource\"").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(value["tourismScore"], json!(20.0));
        assert_eq!(value["scoreSource"], json!({ "kind": "direct_percentage" }));
        assert_eq!(value["hoteles"], json!(12));
    }

    #[rstest]
    fn ranked_entries_serialise_flat() {
        let record = NeighborhoodRecord::new("01")
            .with_name("el Raval")
            .with_extra("hoteles", json!(12));
        let ranked = RankedNeighborhood::new(
            record,
            20.0,
            ScoreSource::MonthlyAverage {
                field: MonthlyField::SimulatedDistrict,
            },
        );

        let value = serde_json::to_value(&ranked).expect("encode ranked entry");

        assert_eq!(
            value,
            json!({
                "codi_barri": "01",
                "nom_barri": "el Raval",
                "hoteles": 12,
                "tourismScore": 20.0,
                "scoreSource": {
                    "kind": "monthly_average",
                    "field": "turistes_absolut_districte_simulat",
                },
            })
        );
    }

    #[rstest]
    fn ranked_entries_clamp_scores() {
        let entry = RankedNeighborhood::new(NeighborhoodRecord::new("01"), 250.0, ScoreSource::DirectPercentage);
        assert_eq!(entry.tourism_score, SCORE_MAX);
        let entry = RankedNeighborhood::new(NeighborhoodRecord::new("01"), f64::NAN, ScoreSource::DirectPercentage);
        assert_eq!(entry.tourism_score, SCORE_MIN);
    }

    #[rstest]
    fn skipped_records_serialise_with_reason_tag() {
        let skipped = SkippedRecord {
            position: 3,
            reason: SkipReason::Undecodable {
                message: "expected a JSON object, found a number".to_owned(),
            },
        };
        let value = serde_json::to_value(&skipped).expect("encode skip");
        assert_eq!(
            value,
            json!({
                "position": 3,
                "reason": "undecodable",
                "message": "expected a JSON object, found a number",
            })
        );
    }
}
