//! Loosely-shaped neighbourhood records as published by the tourism datasets.
//!
//! Records arrive from JSON fixtures or the backend API with inconsistent
//! statistics payloads. Every tourism-related field is modelled as a typed
//! variant with an `Unrecognised` catch-all so that a single odd field never
//! rejects the whole record. Keys the model does not name are preserved in
//! [`NeighborhoodRecord::extra`] and serialised back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON fields carried through untouched.
pub type Extra = Map<String, Value>;

/// JSON key holding the neighbourhood identifier.
pub const ID_KEY: &str = "codi_barri";
/// JSON key holding the 2024 resident population.
pub const POPULATION_KEY: &str = "poblacio_2024";
/// JSON key holding residents per square kilometre.
pub const RESIDENT_DENSITY_KEY: &str = "densitat_hab_km2";
/// Month key used when a single representative percentage is required.
pub const PEAK_MONTH: &str = "juliol";

/// One neighbourhood and whatever tourism statistics accompany it.
///
/// # Examples
///
/// ```
/// use barri_core::NeighborhoodRecord;
///
/// let record: NeighborhoodRecord = serde_json::from_str(
///     r#"{"codi_barri":"01","nom_barri":"el Raval","poblacio_2024":47000}"#,
/// )?;
/// assert_eq!(record.id.as_deref(), Some("01"));
/// assert_eq!(record.number(barri_core::POPULATION_KEY), Some(47000.0));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NeighborhoodRecord {
    /// Identifier, unique within a batch. Numbers are rendered as strings.
    #[serde(
        rename = "codi_barri",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Display name.
    #[serde(
        rename = "nom_barri",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// District the neighbourhood belongs to.
    #[serde(
        rename = "nom_districte",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub district: Option<String>,
    /// Pre-computed district-level tourism percentage.
    #[serde(
        rename = "turisme_percentatge_districte",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub district_percentage: Option<PercentageValue>,
    /// Monthly tourism statistics sub-object.
    #[serde(
        rename = "turisme_mensual",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stats: Option<StatsPayload>,
    /// Every other field of the source object.
    #[serde(flatten)]
    pub extra: Extra,
}

impl NeighborhoodRecord {
    /// Create a record carrying only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the district name.
    #[must_use]
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Set the top-level district percentage.
    #[must_use]
    pub fn with_district_percentage(mut self, value: PercentageValue) -> Self {
        self.district_percentage = Some(value);
        self
    }

    /// Attach a structured statistics payload.
    #[must_use]
    pub fn with_stats(mut self, stats: TourismStats) -> Self {
        self.stats = Some(StatsPayload::Structured(stats));
        self
    }

    /// Attach an arbitrary passthrough field.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Return the identifier when it is present, or `""` otherwise.
    #[must_use]
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Structured statistics, if the payload had a usable object shape.
    #[must_use]
    pub fn structured_stats(&self) -> Option<&TourismStats> {
        match self.stats.as_ref()? {
            StatsPayload::Structured(stats) => Some(stats),
            StatsPayload::Unrecognised(_) => None,
        }
    }

    /// Read a finite numeric passthrough field such as [`POPULATION_KEY`].
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.extra
            .get(key)
            .and_then(numeric_value)
            .filter(|value| value.is_finite())
    }
}

/// Statistics payload found under `turisme_mensual`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    /// An object; individual fields may still be unusable.
    Structured(TourismStats),
    /// Anything that is not a JSON object.
    Unrecognised(Value),
}

/// The typed view of a statistics sub-object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TourismStats {
    /// District percentage nested one level down.
    #[serde(
        rename = "turisme_percentatge_districte",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub district_percentage: Option<PercentageValue>,
    /// Simulated absolute visitors per month.
    #[serde(
        rename = "turistes_absolut_districte_simulat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub simulated_district_visitors: Option<MonthlySeries>,
    /// Measured absolute visitors per month.
    #[serde(
        rename = "turistes_absolut_districte",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub district_visitors: Option<MonthlySeries>,
    /// Generic monthly visitor counts.
    #[serde(
        rename = "turistes_mensuals",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_visitors: Option<MonthlySeries>,
    /// Remaining statistics fields.
    #[serde(flatten)]
    pub extra: Extra,
}

impl TourismStats {
    /// Set the nested district percentage.
    #[must_use]
    pub fn with_district_percentage(mut self, value: PercentageValue) -> Self {
        self.district_percentage = Some(value);
        self
    }

    /// Set the series stored under `field`.
    #[must_use]
    pub fn with_series(mut self, field: MonthlyField, series: MonthlySeries) -> Self {
        *self.series_slot(field) = Some(series);
        self
    }

    /// Return the series stored under `field`.
    #[must_use]
    pub const fn series(&self, field: MonthlyField) -> Option<&MonthlySeries> {
        match field {
            MonthlyField::SimulatedDistrict => self.simulated_district_visitors.as_ref(),
            MonthlyField::District => self.district_visitors.as_ref(),
            MonthlyField::Monthly => self.monthly_visitors.as_ref(),
        }
    }

    fn series_slot(&mut self, field: MonthlyField) -> &mut Option<MonthlySeries> {
        match field {
            MonthlyField::SimulatedDistrict => &mut self.simulated_district_visitors,
            MonthlyField::District => &mut self.district_visitors,
            MonthlyField::Monthly => &mut self.monthly_visitors,
        }
    }
}

/// The three alternative monthly-breakdown fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonthlyField {
    /// `turistes_absolut_districte_simulat`.
    #[serde(rename = "turistes_absolut_districte_simulat")]
    SimulatedDistrict,
    /// `turistes_absolut_districte`.
    #[serde(rename = "turistes_absolut_districte")]
    District,
    /// `turistes_mensuals`.
    #[serde(rename = "turistes_mensuals")]
    Monthly,
}

impl MonthlyField {
    /// Fields in the order they are consulted.
    pub const PRIORITY: [Self; 3] = [Self::SimulatedDistrict, Self::District, Self::Monthly];

    /// JSON key of the field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SimulatedDistrict => "turistes_absolut_districte_simulat",
            Self::District => "turistes_absolut_districte",
            Self::Monthly => "turistes_mensuals",
        }
    }
}

impl std::fmt::Display for MonthlyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A month-keyed mapping of visitor counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthlySeries {
    /// A JSON object; non-numeric entries are ignored.
    Months(Map<String, Value>),
    /// Anything that is not a JSON object.
    Unrecognised(Value),
}

impl MonthlySeries {
    /// Build a series from `(month, count)` pairs.
    ///
    /// Non-finite counts are stored as `null`.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::Months(
            pairs
                .into_iter()
                .map(|(month, count)| (month.to_owned(), Value::from(count)))
                .collect(),
        )
    }

    /// Finite numeric entries, in source order.
    #[must_use]
    pub fn numeric_values(&self) -> Vec<f64> {
        match self {
            Self::Months(months) => months
                .values()
                .filter_map(Value::as_f64)
                .filter(|value| value.is_finite())
                .collect(),
            Self::Unrecognised(_) => Vec::new(),
        }
    }
}

/// A percentage as it appears in the datasets.
///
/// # Examples
///
/// ```
/// use barri_core::PercentageValue;
///
/// let text: PercentageValue = serde_json::from_str(r#""12,5 %""#)?;
/// assert_eq!(text.resolve(), Some(12.5));
///
/// let monthly: PercentageValue = serde_json::from_str(r#"{"juny":"10%","juliol":"30%"}"#)?;
/// assert_eq!(monthly.resolve(), Some(20.0));
/// assert_eq!(monthly.month("juliol"), Some(30.0));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentageValue {
    /// A plain number.
    Number(f64),
    /// Text such as `"12.5%"`.
    Text(String),
    /// Month-keyed percentages.
    Monthly(Map<String, Value>),
    /// Any other JSON value.
    Unrecognised(Value),
}

impl PercentageValue {
    /// Reduce the value to a single finite percentage.
    ///
    /// Month maps resolve to the mean of their parseable entries.
    #[must_use]
    pub fn resolve(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Self::Text(text) => parse_percentage(text),
            Self::Monthly(months) => mean(months.values().filter_map(percentage_from_json)),
            Self::Unrecognised(_) => None,
        }
    }

    /// Percentage recorded for a specific month key.
    ///
    /// Scalar values apply to every month.
    #[must_use]
    pub fn month(&self, month: &str) -> Option<f64> {
        match self {
            Self::Monthly(months) => months.get(month).and_then(percentage_from_json),
            Self::Number(_) | Self::Text(_) => self.resolve(),
            Self::Unrecognised(_) => None,
        }
    }
}

/// Parse percentage text, accepting a trailing `%` and a decimal comma.
///
/// # Examples
///
/// ```
/// use barri_core::parse_percentage;
///
/// assert_eq!(parse_percentage("7.25%"), Some(7.25));
/// assert_eq!(parse_percentage(" 3,5 % "), Some(3.5));
/// assert_eq!(parse_percentage("n/a"), None);
/// ```
#[must_use]
pub fn parse_percentage(text: &str) -> Option<f64> {
    let cleaned = text.trim().trim_end_matches('%').trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn percentage_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_percentage(text),
        _ => None,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_u32), |(sum, count), value| {
        (sum + value, count.saturating_add(1))
    });
    (count > 0).then(|| sum / f64::from(count))
}

/// Accept strings and numbers; treat blank strings and other shapes as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
