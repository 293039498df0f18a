use std::collections::HashMap;

use glycowatch_core::{AnalysisConfig, GlucoseBand, Interval, Reading, SymptomCorrelation};

use crate::format::format_one_decimal;
use crate::sorted_window;

const NO_READINGS: &str = "No readings available to relate symptoms to glucose.";
const NO_READINGS_IN_INTERVAL: &str =
    "No readings in the selected period to relate symptoms to glucose.";
const NO_ASSOCIATION: &str = "No significant association between symptoms and glucose levels.";

/// Describe the mean glucose observed with each symptom.
pub fn correlate(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Vec<String> {
    if readings.is_empty() {
        return vec![NO_READINGS.to_string()];
    }

    let window = sorted_window(readings, interval);
    if window.is_empty() {
        return vec![NO_READINGS_IN_INTERVAL.to_string()];
    }

    let correlations = group_by_symptom(&window, config);
    if correlations.is_empty() {
        return vec![NO_ASSOCIATION.to_string()];
    }

    correlations.iter().map(describe_correlation).collect()
}

/// Mean glucose per symptom label, in order of first appearance.
pub fn symptom_correlations(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Vec<SymptomCorrelation> {
    group_by_symptom(&sorted_window(readings, interval), config)
}

fn group_by_symptom(window: &[&Reading], config: &AnalysisConfig) -> Vec<SymptomCorrelation> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();

    for reading in window {
        let Some(value) = reading.numeric_value() else {
            continue;
        };

        let mut tagged: Vec<&str> = Vec::with_capacity(reading.symptoms.len());
        for label in &reading.symptoms {
            let label = label.as_str();
            if tagged.contains(&label) {
                continue;
            }
            tagged.push(label);

            let slot = *positions.entry(label).or_insert_with(|| {
                groups.push((label, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(value);
        }
    }

    groups
        .into_iter()
        .map(|(label, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            SymptomCorrelation {
                symptom: label.to_string(),
                mean_value: mean,
                sample_count: values.len(),
                band: GlucoseBand::classify(mean, config),
            }
        })
        .collect()
}

fn describe_correlation(correlation: &SymptomCorrelation) -> String {
    let plural = if correlation.sample_count == 1 { "" } else { "s" };
    format!(
        "{}: average glucose {} mg/dL over {} reading{plural} ({}).",
        correlation.symptom,
        format_one_decimal(correlation.mean_value),
        correlation.sample_count,
        correlation.band.label()
    )
}
