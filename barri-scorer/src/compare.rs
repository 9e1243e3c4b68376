//! Side-by-side comparison of selected neighbourhoods.
//!
//! Rows join the tourism batch with the summary batch by identifier. Every
//! `0..=100` index is paired with an [`IntensityBand`] for display.

use std::collections::HashMap;
use std::fmt;

use barri_core::{
    NeighborhoodRecord, NeighbourhoodSummary, PEAK_MONTH, POPULATION_KEY, RESIDENT_DENSITY_KEY,
    SCORE_MAX, SCORE_MIN,
};
use serde::{Deserialize, Serialize};

use crate::TourismRanker;

/// Residents per square kilometre that map to a density index of 100.
pub const DENSITY_REFERENCE: f64 = 35_000.0;

/// Qualitative band for a `0..=100` index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    /// Below 40.
    Low,
    /// 40 to below 60.
    Moderate,
    /// 60 to below 80.
    High,
    /// 80 and above.
    VeryHigh,
}

impl IntensityBand {
    /// Band for `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use barri_scorer::IntensityBand;
    ///
    /// assert_eq!(IntensityBand::for_index(80.0), IntensityBand::VeryHigh);
    /// assert_eq!(IntensityBand::for_index(59.9), IntensityBand::Moderate);
    /// assert_eq!(IntensityBand::for_index(f64::NAN), IntensityBand::Low);
    /// ```
    #[must_use]
    pub fn for_index(value: f64) -> Self {
        if value >= 80.0 {
            Self::VeryHigh
        } else if value >= 60.0 {
            Self::High
        } else if value >= 40.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A `0..=100` index and its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indexed {
    /// Index value.
    pub value: f64,
    /// Band the value falls into.
    pub band: IntensityBand,
}

impl Indexed {
    /// Pair a value with its band.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            band: IntensityBand::for_index(value),
        }
    }
}

/// One neighbourhood in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    /// Neighbourhood identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// District name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// 2024 resident population.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    /// Residents per square kilometre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_density: Option<f64>,
    /// Peak-month tourist density index.
    pub tourist_density: Indexed,
    /// Resident density rescaled against [`DENSITY_REFERENCE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_density_index: Option<Indexed>,
    /// Noise level index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<Indexed>,
    /// Noise pollution index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_pollution: Option<Indexed>,
    /// Public transport density index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_density: Option<Indexed>,
    /// Number of hotels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotels: Option<f64>,
    /// Number of points of interest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_of_interest: Option<f64>,
}

/// Ordered set of neighbourhood identifiers picked for comparison.
///
/// # Examples
///
/// ```
/// use barri_scorer::ComparisonSelection;
///
/// let mut selection = ComparisonSelection::default();
/// assert!(selection.toggle("01"));
/// assert!(selection.toggle("02"));
/// assert!(!selection.toggle("01"));
/// assert_eq!(selection.ids(), ["02"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonSelection {
    ids: Vec<String>,
}

impl ComparisonSelection {
    /// Add `id` if absent, remove it if present. Returns whether `id` is
    /// selected afterwards.
    pub fn toggle(&mut self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref().trim();
        if let Some(index) = self.ids.iter().position(|selected| selected == id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(id.to_owned());
            true
        }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Selected identifiers in selection order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ComparisonSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::default();
        for id in iter {
            if !selection.contains(id.as_ref().trim()) {
                selection.toggle(id);
            }
        }
        selection
    }
}

/// Build comparison rows for `selection`, in selection order.
///
/// Identifiers missing from either batch are omitted. When a batch repeats
/// an identifier the first occurrence is used. Tourist density prefers the
/// peak-month district percentage and otherwise uses `ranker`'s score.
#[must_use]
pub fn compare_neighbourhoods(
    tourism: &[NeighborhoodRecord],
    summaries: &[NeighbourhoodSummary],
    selection: &ComparisonSelection,
    ranker: &TourismRanker,
) -> Vec<ComparisonRow> {
    let records = index_by_id(tourism.iter().filter_map(|r| Some((r.id.as_deref()?, r))));
    let overlays = index_by_id(summaries.iter().filter_map(|s| Some((s.id.as_deref()?, s))));

    selection
        .ids()
        .iter()
        .filter_map(|id| {
            let record = records.get(id.as_str())?;
            let summary = overlays.get(id.as_str())?;
            Some(build_row(id, record, summary, ranker))
        })
        .collect()
}

fn index_by_id<'a, T>(rows: impl Iterator<Item = (&'a str, &'a T)>) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::new();
    for (id, row) in rows {
        index.entry(id).or_insert(row);
    }
    index
}

fn build_row(
    id: &str,
    record: &NeighborhoodRecord,
    summary: &NeighbourhoodSummary,
    ranker: &TourismRanker,
) -> ComparisonRow {
    let resident_density = record.number(RESIDENT_DENSITY_KEY);
    ComparisonRow {
        id: id.to_owned(),
        name: record.name.clone().or_else(|| summary.name.clone()),
        district: record.district.clone().or_else(|| summary.district.clone()),
        population: record.number(POPULATION_KEY),
        resident_density,
        tourist_density: Indexed::new(tourist_density(record, ranker)),
        resident_density_index: resident_density.map(|density| Indexed::new(density_index(density))),
        noise_level: summary.noise_level.map(Indexed::new),
        noise_pollution: summary.noise_pollution.map(Indexed::new),
        transport_density: summary.transport_density.map(Indexed::new),
        hotels: summary.hotels,
        points_of_interest: summary.points_of_interest,
    }
}

fn tourist_density(record: &NeighborhoodRecord, ranker: &TourismRanker) -> f64 {
    let nested = record
        .structured_stats()
        .and_then(|stats| stats.district_percentage.as_ref());
    let peak = nested
        .into_iter()
        .chain(record.district_percentage.as_ref())
        .find_map(|percentage| percentage.month(PEAK_MONTH));
    let raw = peak.unwrap_or_else(|| ranker.score(record).score);
    to_index(raw)
}

#[expect(
    clippy::float_arithmetic,
    reason = "density rescaling is a float ratio"
)]
fn density_index(density: f64) -> f64 {
    to_index(density / DENSITY_REFERENCE * 100.0)
}

fn to_index(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.round().clamp(SCORE_MIN, SCORE_MAX)
    } else {
        SCORE_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barri_core::PercentageValue;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn tourism() -> Vec<NeighborhoodRecord> {
        let peak = serde_json::from_value::<PercentageValue>(json!({ "gener": "20%", "juliol": "64,6%" }))
            .unwrap_or(PercentageValue::Number(0.0));
        vec![
            NeighborhoodRecord::new("01")
                .with_name("el Raval")
                .with_district("Ciutat Vella")
                .with_district_percentage(peak)
                .with_extra(POPULATION_KEY, json!(47_000))
                .with_extra(RESIDENT_DENSITY_KEY, json!(43_750)),
            NeighborhoodRecord::new("02")
                .with_name("el Barri Gòtic")
                .with_district_percentage(PercentageValue::Number(41.2))
                .with_extra(RESIDENT_DENSITY_KEY, json!(17_500)),
            NeighborhoodRecord::new("03").with_name("la Barceloneta"),
        ]
    }

    #[fixture]
    fn summaries() -> Vec<NeighbourhoodSummary> {
        let mut raval = NeighbourhoodSummary::new("01");
        raval.noise_level = Some(72.0);
        raval.transport_density = Some(85.0);
        raval.hotels = Some(38.0);
        vec![raval, NeighbourhoodSummary::new("02"), NeighbourhoodSummary::new("03")]
    }

    #[rstest]
    #[case(0.0, IntensityBand::Low)]
    #[case(39.9, IntensityBand::Low)]
    #[case(40.0, IntensityBand::Moderate)]
    #[case(60.0, IntensityBand::High)]
    #[case(100.0, IntensityBand::VeryHigh)]
    fn bands_follow_thresholds(#[case] value: f64, #[case] band: IntensityBand) {
        assert_eq!(IntensityBand::for_index(value), band);
    }

    #[rstest]
    fn rows_follow_selection_order(
        tourism: Vec<NeighborhoodRecord>,
        summaries: Vec<NeighbourhoodSummary>,
    ) {
        let selection: ComparisonSelection = ["02", "missing", "01"].into_iter().collect();
        let rows = compare_neighbourhoods(&tourism, &summaries, &selection, &TourismRanker::default());
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["02", "01"]);
    }

    #[rstest]
    fn indices_are_rounded_and_capped(
        tourism: Vec<NeighborhoodRecord>,
        summaries: Vec<NeighbourhoodSummary>,
    ) {
        let selection: ComparisonSelection = ["01", "02"].into_iter().collect();
        let rows = compare_neighbourhoods(&tourism, &summaries, &selection, &TourismRanker::default());

        let [raval, gotic] = rows.as_slice() else {
            panic!("expected two rows, found {}", rows.len());
        };
        assert_eq!(raval.tourist_density, Indexed::new(65.0));
        assert_eq!(raval.tourist_density.band, IntensityBand::High);
        assert_eq!(raval.resident_density_index, Some(Indexed::new(100.0)));
        assert_eq!(raval.noise_level.map(|n| n.band), Some(IntensityBand::High));
        assert_eq!(raval.transport_density.map(|t| t.band), Some(IntensityBand::VeryHigh));
        assert_eq!(raval.hotels, Some(38.0));
        assert_eq!(raval.population, Some(47_000.0));

        assert_eq!(gotic.tourist_density.value, 41.0);
        assert_eq!(gotic.resident_density_index.map(|i| i.value), Some(50.0));
        assert!(gotic.noise_level.is_none());
    }

    #[rstest]
    fn records_without_statistics_use_the_ranker_score(
        tourism: Vec<NeighborhoodRecord>,
        summaries: Vec<NeighbourhoodSummary>,
    ) {
        let selection: ComparisonSelection = ["03"].into_iter().collect();
        let rows = compare_neighbourhoods(&tourism, &summaries, &selection, &TourismRanker::default());
        let row = rows.first().map(|row| row.tourist_density.value);
        assert_eq!(row, Some(21.0));
        assert!(rows.iter().all(|row| row.resident_density_index.is_none()));
    }

    #[rstest]
    fn peak_month_is_read_from_the_monthly_sub_object() {
        let record: NeighborhoodRecord = match serde_json::from_value(json!({
            "codi_barri": "01",
            "turisme_percentatge_districte": 10,
            "turisme_mensual": {
                "turisme_percentatge_districte": { "gener": "10%", "juliol": "64,6%" }
            }
        })) {
            Ok(record) => record,
            Err(err) => panic!("decode record: {err}"),
        };
        let selection: ComparisonSelection = ["01"].into_iter().collect();
        let rows = compare_neighbourhoods(
            &[record],
            &[NeighbourhoodSummary::new("01")],
            &selection,
            &TourismRanker::default(),
        );
        let density = rows.first().map(|row| row.tourist_density);
        assert_eq!(density, Some(Indexed::new(65.0)));
        assert_eq!(density.map(|d| d.band), Some(IntensityBand::High));
    }

    #[rstest]
    fn toggling_twice_deselects() {
        let mut selection = ComparisonSelection::default();
        selection.toggle(" 07 ");
        assert!(selection.contains("07"));
        selection.toggle("07");
        assert!(selection.is_empty());
    }
}
