//! Decode JSON batches into per-record results.
//!
//! A batch must be a JSON array. Elements that are not decodable
//! neighbourhood objects become [`SkipReason::Undecodable`] entries instead of
//! failing the batch.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{NeighborhoodRecord, SkipReason};

/// One decoded batch element.
pub type DecodedRecord = Result<NeighborhoodRecord, SkipReason>;

/// Errors raised when a payload cannot be treated as a batch at all.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The payload was not valid JSON.
    #[error("failed to parse neighbourhood batch JSON")]
    Parse {
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The payload was JSON but not an array.
    #[error("neighbourhood batch must be a JSON array, found {found}")]
    NotAnArray {
        /// Kind of JSON value found instead.
        found: &'static str,
    },
}

/// Decode a batch from JSON text.
///
/// # Errors
/// Returns [`BatchError::Parse`] for invalid JSON and
/// [`BatchError::NotAnArray`] when the top-level value is not an array.
///
/// # Examples
///
/// ```
/// use barri_core::decode_batch;
///
/// let decoded = decode_batch(r#"[{"codi_barri":"01"}, 42]"#)?;
/// assert!(decoded[0].is_ok());
/// assert!(decoded[1].is_err());
/// # Ok::<(), barri_core::BatchError>(())
/// ```
pub fn decode_batch(text: &str) -> Result<Vec<DecodedRecord>, BatchError> {
    let value: Value = serde_json::from_str(text).map_err(|source| BatchError::Parse { source })?;
    decode_value(value)
}

/// Decode a batch from an already-parsed JSON value.
///
/// # Errors
/// Returns [`BatchError::NotAnArray`] when `value` is not an array.
pub fn decode_value(value: Value) -> Result<Vec<DecodedRecord>, BatchError> {
    decode_rows(value, decode_record)
}

/// Decode a single element.
///
/// # Examples
///
/// ```
/// use barri_core::{SkipReason, decode_record};
///
/// let skipped = decode_record(serde_json::json!("01"));
/// assert!(matches!(skipped, Err(SkipReason::Undecodable { .. })));
/// ```
pub fn decode_record(value: Value) -> DecodedRecord {
    decode_object(value)
}

/// Decode any object-shaped row type, skipping elements that do not fit.
pub(crate) fn decode_object<T: DeserializeOwned>(value: Value) -> Result<T, SkipReason> {
    if !value.is_object() {
        return Err(SkipReason::Undecodable {
            message: format!("expected a JSON object, found {}", kind_of(&value)),
        });
    }
    serde_json::from_value(value).map_err(|err| SkipReason::Undecodable {
        message: err.to_string(),
    })
}

pub(crate) fn decode_rows<T>(
    value: Value,
    decode: impl Fn(Value) -> Result<T, SkipReason>,
) -> Result<Vec<Result<T, SkipReason>>, BatchError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(decode).collect()),
        other => Err(BatchError::NotAnArray {
            found: kind_of(&other),
        }),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
