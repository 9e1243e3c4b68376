//! Per-neighbourhood overlay metrics (noise, transport, hotels).
//!
//! These rows come from the summary dataset that feeds the map overlays and
//! the comparison table. Metric values are expected on a `0..=100` scale
//! except for the hotel and point-of-interest counts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::batch::{decode_object, decode_rows};
use crate::{BatchError, Extra, SkipReason};

/// Overlay metrics for one neighbourhood.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NeighbourhoodSummary {
    /// Identifier shared with the tourism dataset.
    #[serde(
        rename = "codi_barri",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Display name.
    #[serde(rename = "nom_barri", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// District name.
    #[serde(
        rename = "nom_districte",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub district: Option<String>,
    /// Noise level index.
    #[serde(
        rename = "nivel_ruido",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub noise_level: Option<f64>,
    /// Noise pollution index.
    #[serde(
        rename = "contaminacion_sonora",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub noise_pollution: Option<f64>,
    /// Public transport density index.
    #[serde(
        rename = "densidad_transporte",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub transport_density: Option<f64>,
    /// Number of hotels.
    #[serde(
        rename = "hoteles",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub hotels: Option<f64>,
    /// Number of points of interest.
    #[serde(
        rename = "puntos_interes",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub points_of_interest: Option<f64>,
    /// Remaining fields, such as coordinates.
    #[serde(flatten)]
    pub extra: Extra,
}

impl NeighbourhoodSummary {
    /// Create a summary row with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Decode a summary batch.
///
/// # Errors
/// Returns [`BatchError::NotAnArray`] when `value` is not an array.
pub fn decode_summaries(
    value: Value,
) -> Result<Vec<Result<NeighbourhoodSummary, SkipReason>>, BatchError> {
    decode_rows(value, decode_object)
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed.filter(|value: &f64| value.is_finite()))
}
