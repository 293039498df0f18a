//! Glucose reading analytics: record normalization, rule-based alerts,
//! symptom correlation and daily summaries.

mod correlate;
mod format;
mod normalize;
mod scan;
mod summary;

use glycowatch_core::{AnalysisConfig, AnalysisError, AnalysisReport, Interval, Reading};

pub use correlate::{correlate, symptom_correlations};
pub use normalize::{
    normalize_timestamp, parse_interval, parse_readings_str, parse_readings_value,
    parse_timestamp_str,
};
pub use scan::{scan, scan_alerts, Rule, RuleFn, RULES};
pub use summary::daily_summaries;

/// Run every analysis over already-normalized readings. Repeated calls agree
/// on everything except `generated_at`.
pub fn analyze(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> AnalysisReport {
    AnalysisReport::new(
        scan_alerts(readings, interval, config),
        correlate(readings, interval, config),
        daily_summaries(readings, interval, config),
    )
}

/// Parse a JSON export and analyze it.
pub fn analyze_str(
    records_json: &str,
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    let readings = parse_readings_str(records_json, config)?;
    tracing::debug!(readings = readings.len(), "parsed glucose readings");
    Ok(analyze(&readings, interval, config))
}

/// Readings inside `interval`, ordered by time. Stable, so equal instants
/// keep their input order; the caller's slice is left untouched.
pub(crate) fn sorted_window<'a>(
    readings: &'a [Reading],
    interval: Option<&Interval>,
) -> Vec<&'a Reading> {
    let mut window: Vec<&Reading> = readings
        .iter()
        .filter(|reading| interval.map_or(true, |range| range.contains(reading.recorded_at)))
        .collect();
    window.sort_by_key(|reading| reading.recorded_at);
    window
}
