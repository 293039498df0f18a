//! Conversion of stored records into typed readings.
//!
//! Exports from the document store mix timestamp shapes: RFC 3339 strings,
//! naive local strings, epoch milliseconds and `{seconds, nanoseconds}`
//! objects. Everything is folded into a single `DateTime<Utc>`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use glycowatch_core::{AnalysisConfig, AnalysisError, Interval, Reading};
use serde_json::Value;

const TIMESTAMP_FIELDS: [&str; 4] = ["timestamp", "recordedAt", "date", "createdAt"];
const VALUE_FIELDS: [&str; 2] = ["value", "glucose"];
const SYMPTOM_FIELDS: [&str; 2] = ["symptoms", "symptom"];

const NAIVE_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a JSON export (array of records, or `{ "readings": [...] }`).
pub fn parse_readings_str(
    records_json: &str,
    config: &AnalysisConfig,
) -> Result<Vec<Reading>, AnalysisError> {
    let value: Value =
        serde_json::from_str(records_json).map_err(|err| AnalysisError::Parse(err.to_string()))?;
    parse_readings_value(&value, config)
}

/// Parse an already-decoded JSON export.
pub fn parse_readings_value(
    document: &Value,
    config: &AnalysisConfig,
) -> Result<Vec<Reading>, AnalysisError> {
    let records = match document {
        Value::Array(records) => records,
        Value::Object(object) => object
            .get("readings")
            .and_then(Value::as_array)
            .ok_or(AnalysisError::MissingData)?,
        _ => return Err(AnalysisError::MissingData),
    };

    let offset = config.local_offset();
    let readings: Vec<Reading> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| parse_record(index, record, offset))
        .collect();

    if readings.len() < records.len() {
        tracing::warn!(
            skipped = records.len() - readings.len(),
            kept = readings.len(),
            "skipped records that could not be read as readings"
        );
    }

    Ok(readings)
}

/// Build an interval from optional textual bounds.
pub fn parse_interval(
    start: Option<&str>,
    end: Option<&str>,
    config: &AnalysisConfig,
) -> Result<Interval, AnalysisError> {
    let offset = config.local_offset();
    let parse_bound = |text: &str| {
        parse_timestamp_str(text, offset)
            .ok_or_else(|| AnalysisError::InvalidInterval(format!("cannot read bound {text:?}")))
    };

    let start = start.map(parse_bound).transpose()?;
    let end = end.map(parse_bound).transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AnalysisError::InvalidInterval(format!(
                "start {start} is after end {end}"
            )));
        }
    }

    Ok(Interval::new(start, end))
}

/// Fold any supported timestamp shape into an instant.
pub fn normalize_timestamp(value: &Value, offset: FixedOffset) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp_str(text, offset),
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        Value::Object(object) => {
            let seconds = object
                .get("seconds")
                .or_else(|| object.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = object
                .get("nanoseconds")
                .or_else(|| object.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|nanos| u32::try_from(nanos).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Parse a textual timestamp; naive forms are read in `offset`.
pub fn parse_timestamp_str(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_record(index: usize, record: &Value, offset: FixedOffset) -> Option<Reading> {
    if !record.is_object() {
        tracing::warn!(index, "skipping record that is not an object");
        return None;
    }

    let id = record_id(record, index);

    let Some(recorded_at) = TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| record.get(*field))
        .find_map(|value| normalize_timestamp(value, offset))
    else {
        tracing::warn!(record = %id, "skipping record without usable timestamp");
        return None;
    };

    let value = VALUE_FIELDS
        .iter()
        .find_map(|field| record.get(*field))
        .and_then(numeric_value);

    let symptoms = SYMPTOM_FIELDS
        .iter()
        .find_map(|field| record.get(*field))
        .map(symptom_labels)
        .unwrap_or_default();

    Some(Reading {
        id,
        value,
        recorded_at,
        symptoms,
    })
}

fn record_id(record: &Value, index: usize) -> String {
    match record.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => format!("reading-{index}"),
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|value| value.is_finite())
}

fn symptom_labels(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(label) if !label.trim().is_empty() => vec![label.trim().to_string()],
        _ => Vec::new(),
    }
}
