//! Lagged time-series decoding.
//!
//! The `/lagged/{name}` endpoint returns historical observations as a flat
//! JSON array of `[time, value]` pairs, where `time` is Unix epoch seconds
//! (possibly fractional). The service does not promise any ordering, so
//! [`decode_lagged`] validates the shape, converts every timestamp and
//! stable-sorts the result oldest-first.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Which component of a `[time, value]` pair failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairField {
    Timestamp,
    Value,
}

impl std::fmt::Display for PairField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp => write!(f, "timestamp"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// Errors raised while decoding a lagged payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The payload itself is not a JSON array.
    #[error("Expected an array, got {found}")]
    NotAnArray { found: &'static str },

    /// An element of the payload is not a two-component array.
    #[error("Malformed payload at index {index}: {reason}")]
    MalformedPayload { index: usize, reason: String },

    /// A component could not be interpreted as a number.
    #[error("Non-numeric {field} at index {index}")]
    NonNumericField { index: usize, field: PairField },
}

/// A single historical observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaggedPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl LaggedPoint {
    /// Timestamp as float seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> f64 {
        self.timestamp.timestamp() as f64
            + f64::from(self.timestamp.timestamp_subsec_nanos()) / NANOS_PER_SEC
    }
}

/// Historical observations for one stream, ascending by timestamp.
///
/// Built only by [`decode_lagged`] (or its `Deserialize` impl), so the
/// ordering always holds. Duplicate timestamps are kept in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaggedSeries {
    points: Vec<LaggedPoint>,
}

impl LaggedSeries {
    pub fn points(&self) -> &[LaggedPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LaggedPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest observation.
    pub fn first(&self) -> Option<&LaggedPoint> {
        self.points.first()
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<&LaggedPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Back to the wire shape, `[[t, v], ...]`.
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|p| [p.epoch_seconds(), p.value])
            .collect()
    }

    pub fn into_points(self) -> Vec<LaggedPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a LaggedSeries {
    type Item = &'a LaggedPoint;
    type IntoIter = std::slice::Iter<'a, LaggedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl Serialize for LaggedSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.points.len()))?;
        for point in &self.points {
            seq.serialize_element(&[point.epoch_seconds(), point.value])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for LaggedSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        decode_lagged(&raw).map_err(de::Error::custom)
    }
}

/// Convert Unix epoch seconds into a UTC timestamp.
///
/// Sub-second precision is kept at nanosecond resolution. Returns `None` for
/// non-finite input or values outside chrono's representable range.
pub fn decode_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let mut secs = whole as i64;
    let mut nanos = ((seconds - whole) * NANOS_PER_SEC).round() as u32;
    if nanos >= 1_000_000_000 {
        secs = secs.checked_add(1)?;
        nanos = 0;
    }
    DateTime::<Utc>::from_timestamp(secs, nanos)
}

/// Decode a raw `[[t, v], ...]` payload into an ordered [`LaggedSeries`].
///
/// Components may be JSON numbers or numeric strings. An empty array yields
/// an empty series. The sort is stable: equal timestamps keep the order in
/// which they appeared in the payload.
pub fn decode_lagged(raw: &Value) -> Result<LaggedSeries, DecodeError> {
    let pairs = raw.as_array().ok_or(DecodeError::NotAnArray {
        found: json_kind(raw),
    })?;

    let mut points = Vec::with_capacity(pairs.len());
    for (index, pair) in pairs.iter().enumerate() {
        let components = match pair.as_array() {
            Some(components) if components.len() == 2 => components,
            Some(components) => {
                return Err(DecodeError::MalformedPayload {
                    index,
                    reason: format!("expected 2 components, got {}", components.len()),
                })
            }
            None => {
                return Err(DecodeError::MalformedPayload {
                    index,
                    reason: format!("expected a [time, value] pair, got {}", json_kind(pair)),
                })
            }
        };

        let seconds = as_number(&components[0]).ok_or(DecodeError::NonNumericField {
            index,
            field: PairField::Timestamp,
        })?;
        let value = as_number(&components[1]).ok_or(DecodeError::NonNumericField {
            index,
            field: PairField::Value,
        })?;
        let timestamp = decode_epoch_seconds(seconds).ok_or(DecodeError::NonNumericField {
            index,
            field: PairField::Timestamp,
        })?;

        points.push(LaggedPoint { timestamp, value });
    }

    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(LaggedSeries { points })
}

/// Interpret a JSON scalar as `f64`, accepting numeric strings.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn secs(point: &LaggedPoint) -> f64 {
        point.epoch_seconds()
    }

    #[test]
    fn test_decode_sorts_and_keeps_tie_order() {
        let series = decode_lagged(&json!([[100, 5.0], [50, 2.5], [100, 9.0]])).unwrap();

        let got: Vec<(f64, f64)> = series.iter().map(|p| (secs(p), p.value)).collect();
        assert_eq!(got, vec![(50.0, 2.5), (100.0, 5.0), (100.0, 9.0)]);
    }

    #[test]
    fn test_decode_preserves_fractional_seconds() {
        let series = decode_lagged(&json!([[1609459200.5, 1.0]])).unwrap();

        assert_eq!(series.len(), 1);
        let point = series.first().unwrap();
        assert_eq!(point.timestamp.timestamp(), 1_609_459_200);
        assert_eq!(point.timestamp.timestamp_subsec_nanos(), 500_000_000);
        assert_eq!(point.epoch_seconds(), 1609459200.5);
        assert_eq!(point.value, 1.0);
    }

    #[test]
    fn test_decode_empty_is_empty_series() {
        let series = decode_lagged(&json!([])).unwrap();
        assert!(series.is_empty());
        assert!(series.first().is_none());
    }

    #[test]
    fn test_decode_rejects_short_pair() {
        let err = decode_lagged(&json!([[1], [2, 3]])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { index: 0, .. }));
    }

    #[test]
    fn test_decode_rejects_long_pair() {
        let err = decode_lagged(&json!([[1, 2], [2, 3, 4]])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { index: 1, .. }));
    }

    #[test]
    fn test_decode_rejects_non_array_payload() {
        let err = decode_lagged(&json!({"t": 1, "v": 2})).unwrap_err();
        assert_eq!(err, DecodeError::NotAnArray { found: "object" });
        assert_eq!(err.to_string(), "Expected an array, got object");

        let err = decode_lagged(&json!(null)).unwrap_err();
        assert_eq!(err, DecodeError::NotAnArray { found: "null" });
    }

    #[test]
    fn test_decode_bad_first_element_is_not_a_bad_payload() {
        let err = decode_lagged(&json!([5.0])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { index: 0, .. }));
        assert_ne!(err, DecodeError::NotAnArray { found: "array" });
    }

    #[test]
    fn test_decode_rejects_non_numeric_fields() {
        let err = decode_lagged(&json!([[1, 2], ["soon", 3]])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NonNumericField {
                index: 1,
                field: PairField::Timestamp
            }
        );

        let err = decode_lagged(&json!([[1, null]])).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NonNumericField {
                index: 0,
                field: PairField::Value
            }
        );
    }

    #[test]
    fn test_decode_accepts_numeric_strings() {
        let series = decode_lagged(&json!([["20.25", "-1.5"], [10, 0]])).unwrap();
        assert_eq!(series.values(), vec![0.0, -1.5]);
        assert_eq!(secs(series.last().unwrap()), 20.25);
    }

    #[test]
    fn test_decode_output_is_non_decreasing() {
        let raw = json!([
            [1700000300.25, 1.0],
            [1700000000.0, 2.0],
            [1700000100.75, 3.0],
            [1700000000.0, 4.0],
            [1699999999.999, 5.0],
            [1700000300.25, 6.0]
        ]);
        let series = decode_lagged(&raw).unwrap();

        assert_eq!(series.len(), 6);
        for window in series.points().windows(2) {
            assert!(window[0].timestamp <= window[1].timestamp);
        }
        // Ties in payload order
        assert_eq!(series.values(), vec![5.0, 2.0, 4.0, 3.0, 1.0, 6.0]);
    }

    #[test]
    fn test_serialized_series_decodes_to_itself() {
        let raw = json!([[1609459260.125, 3.5], [1609459200.5, 1.0], [1609459230.0, -2.0]]);
        let series = decode_lagged(&raw).unwrap();

        let reserialized = serde_json::to_value(&series).unwrap();
        let again = decode_lagged(&reserialized).unwrap();
        assert_eq!(again, series);

        let via_serde: LaggedSeries = serde_json::from_value(reserialized).unwrap();
        assert_eq!(via_serde, series);
    }

    #[test]
    fn test_deserialize_reports_decode_error() {
        let err = serde_json::from_str::<LaggedSeries>("[[1, 2], [3]]").unwrap_err();
        assert!(err.to_string().contains("Malformed payload at index 1"));
    }

    #[test]
    fn test_decode_epoch_seconds_edges() {
        assert!(decode_epoch_seconds(f64::NAN).is_none());
        assert!(decode_epoch_seconds(f64::INFINITY).is_none());
        assert!(decode_epoch_seconds(1e30).is_none());

        let before_epoch = decode_epoch_seconds(-1.5).unwrap();
        assert_eq!(before_epoch.timestamp(), -2);
        assert_eq!(before_epoch.timestamp_subsec_nanos(), 500_000_000);

        let rounds_up = decode_epoch_seconds(9.9999999999).unwrap();
        assert_eq!(rounds_up.timestamp(), 10);
        assert_eq!(rounds_up.timestamp_subsec_nanos(), 0);
    }
}
