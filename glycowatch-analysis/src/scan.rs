//! Rule-based alert scanner.
//!
//! Every rule sees the same time-ordered, interval-filtered window and works
//! independently of the others. `RULES` fixes the order in which their
//! alerts appear.

use chrono::{Duration, Timelike};
use glycowatch_core::{Alert, AlertKind, AnalysisConfig, Interval, Reading};

use crate::format::{format_instant, format_numeric};
use crate::sorted_window;

const NO_READINGS: &str = "No glucose readings recorded yet.";
const NO_READINGS_IN_INTERVAL: &str =
    "No glucose readings found in the selected period.";
const NOTHING_SIGNIFICANT: &str = "No significant patterns detected in the analyzed readings.";

/// Signature shared by every rule: sorted window in, alerts out.
pub type RuleFn = fn(&[&Reading], &AnalysisConfig) -> Vec<Alert>;

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub evaluate: RuleFn,
}

/// Registry in evaluation order.
pub const RULES: [Rule; 5] = [
    Rule {
        name: "morning_hypoglycemia",
        evaluate: morning_hypoglycemia,
    },
    Rule {
        name: "sharp_swing",
        evaluate: sharp_swings,
    },
    Rule {
        name: "progressive_decline",
        evaluate: progressive_decline,
    },
    Rule {
        name: "measurement_density",
        evaluate: measurement_density,
    },
    Rule {
        name: "extreme_value",
        evaluate: extreme_values,
    },
];

/// Scan readings and return the alert texts.
pub fn scan(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Vec<String> {
    scan_alerts(readings, interval, config)
        .into_iter()
        .map(|alert| alert.message)
        .collect()
}

/// Scan readings and return typed alerts. Never empty: when nothing can be
/// reported a single informational alert explains why.
pub fn scan_alerts(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Vec<Alert> {
    if readings.is_empty() {
        return vec![Alert::new(AlertKind::NoReadings, NO_READINGS)];
    }

    let window = sorted_window(readings, interval);
    if window.is_empty() {
        return vec![Alert::new(
            AlertKind::NoReadingsInInterval,
            NO_READINGS_IN_INTERVAL,
        )];
    }

    let mut alerts = Vec::new();
    for rule in &RULES {
        let found = (rule.evaluate)(&window, config);
        tracing::debug!(rule = rule.name, alerts = found.len(), "rule evaluated");
        alerts.extend(found);
    }

    if alerts.is_empty() {
        alerts.push(Alert::new(AlertKind::NothingSignificant, NOTHING_SIGNIFICANT));
    }

    alerts
}

// Windows beyond what `Duration` holds saturate instead of panicking.
fn window_span(minutes: i64) -> Duration {
    Duration::try_minutes(minutes).unwrap_or(if minutes < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

fn morning_hypoglycemia(window: &[&Reading], config: &AnalysisConfig) -> Vec<Alert> {
    let offset = config.local_offset();
    let morning = config.morning_start_hour..=config.morning_end_hour;

    let count = window
        .iter()
        .filter(|reading| morning.contains(&reading.recorded_at.with_timezone(&offset).hour()))
        .filter_map(|reading| reading.numeric_value())
        .filter(|value| *value < config.hypo_threshold)
        .count();

    if count < config.morning_hypo_min_count {
        return Vec::new();
    }

    vec![Alert::new(
        AlertKind::MorningHypoglycemia,
        format!(
            "Morning hypoglycemia pattern: {count} readings below {} mg/dL between {}h and {}h.",
            format_numeric(config.hypo_threshold),
            config.morning_start_hour,
            config.morning_end_hour
        ),
    )]
}

fn sharp_swings(window: &[&Reading], config: &AnalysisConfig) -> Vec<Alert> {
    let offset = config.local_offset();
    let max_gap = window_span(config.swing_window_minutes);

    window
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            let (before, after) = (prev.numeric_value()?, curr.numeric_value()?);
            let gap = curr.recorded_at - prev.recorded_at;
            if (after - before).abs() < config.swing_delta || gap > max_gap {
                return None;
            }
            Some(Alert::new(
                AlertKind::SharpSwing,
                format!(
                    "Sharp glucose swing: {} -> {} mg/dL between {} and {}.",
                    format_numeric(before),
                    format_numeric(after),
                    format_instant(prev.recorded_at, offset),
                    format_instant(curr.recorded_at, offset)
                ),
            ))
        })
        .collect()
}

// Only the first decreasing triple is reported.
fn progressive_decline(window: &[&Reading], config: &AnalysisConfig) -> Vec<Alert> {
    let offset = config.local_offset();

    window
        .windows(3)
        .find_map(|triple| {
            let values = (
                triple[0].numeric_value()?,
                triple[1].numeric_value()?,
                triple[2].numeric_value()?,
            );
            if !(values.0 > values.1 && values.1 > values.2) {
                return None;
            }
            Some(Alert::new(
                AlertKind::ProgressiveDecline,
                format!(
                    "Progressive decline: {}, {}, {} mg/dL at {}, {} and {}.",
                    format_numeric(values.0),
                    format_numeric(values.1),
                    format_numeric(values.2),
                    format_instant(triple[0].recorded_at, offset),
                    format_instant(triple[1].recorded_at, offset),
                    format_instant(triple[2].recorded_at, offset)
                ),
            ))
        })
        .into_iter()
        .collect()
}

// Only the first crowded window is reported.
fn measurement_density(window: &[&Reading], config: &AnalysisConfig) -> Vec<Alert> {
    let offset = config.local_offset();
    let span = window_span(config.density_window_minutes);
    let measured: Vec<&Reading> = window
        .iter()
        .copied()
        .filter(|reading| reading.numeric_value().is_some())
        .collect();

    for (index, anchor) in measured.iter().enumerate() {
        let count = measured[index..]
            .iter()
            .take_while(|candidate| candidate.recorded_at - anchor.recorded_at <= span)
            .count();

        if count > config.density_max_readings {
            return vec![Alert::new(
                AlertKind::MeasurementDensity,
                format!(
                    "High measurement density: {count} readings within {} minutes from {}.",
                    config.density_window_minutes,
                    format_instant(anchor.recorded_at, offset)
                ),
            )];
        }
    }

    Vec::new()
}

fn extreme_values(window: &[&Reading], config: &AnalysisConfig) -> Vec<Alert> {
    let offset = config.local_offset();

    window
        .iter()
        .filter_map(|reading| {
            let value = reading.numeric_value()?;
            let at = format_instant(reading.recorded_at, offset);
            if value > config.extreme_high {
                Some(Alert::new(
                    AlertKind::ExtremeHigh,
                    format!(
                        "Extremely high glucose ({} mg/dL) at {at}.",
                        format_numeric(value)
                    ),
                ))
            } else if value < config.extreme_low {
                Some(Alert::new(
                    AlertKind::ExtremeLow,
                    format!(
                        "Extremely low glucose ({} mg/dL) at {at}.",
                        format_numeric(value)
                    ),
                ))
            } else {
                None
            }
        })
        .collect()
}
