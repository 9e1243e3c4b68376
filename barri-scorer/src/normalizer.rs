//! Extract a tourism score from whichever statistic a record carries.
//!
//! Extractors are tried in a fixed order and the first one that yields a
//! positive, finite score wins. A source that is absent, unparseable or zero
//! counts as having produced nothing.

use barri_core::{MonthlyField, NeighborhoodRecord, ScoreSource, TourismStats, clamp_score};

use crate::RankerConfigError;

/// Default assumed upper bound for average monthly visitor counts.
pub const DEFAULT_REFERENCE_MAX: f64 = 10_000.0;

/// Upper bound used to rescale monthly visitor averages into `0..=100`.
///
/// # Examples
///
/// ```
/// use barri_scorer::ReferenceMax;
///
/// assert_eq!(ReferenceMax::default().get(), 10_000.0);
/// assert!(ReferenceMax::new(0.0).is_err());
/// assert!(ReferenceMax::new(f64::INFINITY).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceMax(f64);

impl ReferenceMax {
    /// Validate a reference maximum.
    ///
    /// # Errors
    /// Returns [`RankerConfigError::InvalidReferenceMax`] unless `value` is
    /// finite and strictly positive.
    pub fn new(value: f64) -> Result<Self, RankerConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(RankerConfigError::InvalidReferenceMax { value })
        }
    }

    /// The wrapped value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for ReferenceMax {
    fn default() -> Self {
        Self(DEFAULT_REFERENCE_MAX)
    }
}

/// A score together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScore {
    /// Score in `0.0..=100.0`.
    pub score: f64,
    /// Producing rule.
    pub source: ScoreSource,
}

type Extractor = fn(&NeighborhoodRecord, ReferenceMax) -> Option<NormalizedScore>;

const EXTRACTORS: [Extractor; 3] = [direct_percentage, nested_percentage, monthly_average];

/// Score a record from its statistics, or return `None` when no source
/// produced a usable value.
///
/// # Examples
///
/// ```
/// use barri_core::{MonthlyField, MonthlySeries, NeighborhoodRecord, TourismStats};
/// use barri_scorer::{ReferenceMax, normalize};
///
/// let series = MonthlySeries::from_pairs([("gener", 1_000.0), ("febrer", 3_000.0)]);
/// let record = NeighborhoodRecord::new("01")
///     .with_stats(TourismStats::default().with_series(MonthlyField::Monthly, series));
///
/// let normalized = normalize(&record, ReferenceMax::default()).map(|n| n.score);
/// assert_eq!(normalized, Some(20.0));
/// assert!(normalize(&NeighborhoodRecord::new("02"), ReferenceMax::default()).is_none());
/// ```
#[must_use]
pub fn normalize(record: &NeighborhoodRecord, reference: ReferenceMax) -> Option<NormalizedScore> {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(record, reference))
}

fn direct_percentage(record: &NeighborhoodRecord, _: ReferenceMax) -> Option<NormalizedScore> {
    let score = usable(record.district_percentage.as_ref()?.resolve()?)?;
    Some(NormalizedScore {
        score,
        source: ScoreSource::DirectPercentage,
    })
}

fn nested_percentage(record: &NeighborhoodRecord, _: ReferenceMax) -> Option<NormalizedScore> {
    let nested = record.structured_stats()?.district_percentage.as_ref()?;
    let score = usable(nested.resolve()?)?;
    Some(NormalizedScore {
        score,
        source: ScoreSource::NestedPercentage,
    })
}

fn monthly_average(record: &NeighborhoodRecord, reference: ReferenceMax) -> Option<NormalizedScore> {
    let (field, values) = first_series(record.structured_stats()?)?;
    let score = usable(rescale(average(&values)?, reference))?;
    Some(NormalizedScore {
        score,
        source: ScoreSource::MonthlyAverage { field },
    })
}

/// The first series in priority order with at least one numeric entry.
fn first_series(stats: &TourismStats) -> Option<(MonthlyField, Vec<f64>)> {
    MonthlyField::PRIORITY.iter().find_map(|&field| {
        let values = stats.series(field)?.numeric_values();
        (!values.is_empty()).then_some((field, values))
    })
}

#[expect(
    clippy::float_arithmetic,
    reason = "averaging visitor counts is inherently floating point"
)]
fn average(values: &[f64]) -> Option<f64> {
    let count = u32::try_from(values.len()).ok().filter(|&n| n > 0)?;
    Some(values.iter().sum::<f64>() / f64::from(count))
}

#[expect(
    clippy::float_arithmetic,
    reason = "rescaling to a percentage requires float division"
)]
fn rescale(average: f64, reference: ReferenceMax) -> f64 {
    average * 100.0 / reference.get()
}

fn usable(raw: f64) -> Option<f64> {
    clamp_score(raw).filter(|&score| score > 0.0)
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests fail fast on malformed fixtures")]

    use super::*;
    use barri_core::{MonthlySeries, PercentageValue};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn record(payload: Value) -> NeighborhoodRecord {
        serde_json::from_value(payload).expect("decode record")
    }

    #[rstest]
    #[case(json!({ "codi_barri": "01", "turisme_percentatge_districte": 40 }), 40.0, ScoreSource::DirectPercentage)]
    #[case(json!({ "codi_barri": "01", "turisme_percentatge_districte": "12,5%" }), 12.5, ScoreSource::DirectPercentage)]
    #[case(
        json!({ "codi_barri": "01", "turisme_mensual": { "turisme_percentatge_districte": "33%" } }),
        33.0,
        ScoreSource::NestedPercentage
    )]
    #[case(
        json!({
            "codi_barri": "01",
            "turisme_percentatge_districte": 0,
            "turisme_mensual": { "turisme_percentatge_districte": 18 },
        }),
        18.0,
        ScoreSource::NestedPercentage
    )]
    #[case(
        json!({ "codi_barri": "01", "turisme_percentatge_districte": 240 }),
        100.0,
        ScoreSource::DirectPercentage
    )]
    fn percentage_sources(
        #[case] payload: Value,
        #[case] expected: f64,
        #[case] source: ScoreSource,
    ) {
        let normalized = normalize(&record(payload), ReferenceMax::default()).expect("score");
        assert_eq!(normalized, NormalizedScore { score: expected, source });
    }

    #[rstest]
    fn monthly_series_follow_priority_order() {
        let stats = TourismStats::default()
            .with_series(MonthlyField::Monthly, MonthlySeries::from_pairs([("gener", 9_000.0)]))
            .with_series(
                MonthlyField::District,
                MonthlySeries::from_pairs([("gener", 500.0), ("febrer", 1_500.0)]),
            );
        let normalized = normalize(&NeighborhoodRecord::new("01").with_stats(stats), ReferenceMax::default())
            .expect("score");
        assert_eq!(normalized.score, 10.0);
        assert_eq!(
            normalized.source,
            ScoreSource::MonthlyAverage {
                field: MonthlyField::District
            }
        );
    }

    #[rstest]
    fn series_without_numbers_are_passed_over() {
        let payload = json!({
            "codi_barri": "01",
            "turisme_mensual": {
                "turistes_absolut_districte_simulat": { "gener": "molts" },
                "turistes_mensuals": { "gener": 2_500 },
            },
        });
        let normalized = normalize(&record(payload), ReferenceMax::default()).expect("score");
        assert_eq!(normalized.score, 25.0);
    }

    #[rstest]
    fn reference_max_rescales_averages() {
        let stats = TourismStats::default().with_series(
            MonthlyField::SimulatedDistrict,
            MonthlySeries::from_pairs([("gener", 1_000.0)]),
        );
        let reference = ReferenceMax::new(2_000.0).expect("valid reference");
        let normalized =
            normalize(&NeighborhoodRecord::new("01").with_stats(stats), reference).expect("score");
        assert_eq!(normalized.score, 50.0);
    }

    #[rstest]
    #[case(json!({ "codi_barri": "01" }))]
    #[case(json!({ "codi_barri": "01", "turisme_percentatge_districte": "n/a" }))]
    #[case(json!({ "codi_barri": "01", "turisme_percentatge_districte": -4 }))]
    #[case(json!({ "codi_barri": "01", "turisme_mensual": "sense dades" }))]
    #[case(json!({ "codi_barri": "01", "turisme_mensual": { "turistes_mensuals": { "gener": 0 } } }))]
    fn unusable_records_produce_nothing(#[case] payload: Value) {
        assert!(normalize(&record(payload), ReferenceMax::default()).is_none());
    }

    #[rstest]
    fn monthly_percentage_maps_average() {
        let months = json!({ "juny": "10%", "juliol": "30%" });
        let value: PercentageValue = serde_json::from_value(months).expect("percentage map");
        let record = NeighborhoodRecord::new("01").with_district_percentage(value);
        let normalized = normalize(&record, ReferenceMax::default()).expect("score");
        assert_eq!(normalized.score, 20.0);
    }
}
