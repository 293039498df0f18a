use chrono::{DateTime, Duration, TimeZone, Utc};
use glycowatch_analysis::{correlate, symptom_correlations};
use glycowatch_core::{AnalysisConfig, GlucoseBand, Interval, Reading};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn tagged(value: Option<f64>, hours: i64, symptoms: &[&str]) -> Reading {
    Reading::new(format!("r{hours}"), value, t0() + Duration::hours(hours))
        .with_symptoms(symptoms.iter().copied())
}

#[test]
fn empty_input_yields_single_message() {
    assert_eq!(correlate(&[], None, &AnalysisConfig::default()).len(), 1);
}

#[test]
fn dizziness_with_low_mean() {
    let readings = [
        tagged(Some(60.0), 0, &["Tontura"]),
        tagged(Some(65.0), 1, &["Tontura"]),
    ];

    let lines = correlate(&readings, None, &AnalysisConfig::default());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Tontura"));
    assert!(lines[0].contains("62.5"));
    assert!(lines[0].contains("low"));

    let typed = symptom_correlations(&readings, None, &AnalysisConfig::default());
    assert_eq!(typed[0].mean_value, 62.5);
    assert_eq!(typed[0].sample_count, 2);
    assert_eq!(typed[0].band, GlucoseBand::Low);
}

#[test]
fn mean_rounds_half_up_to_one_decimal() {
    let readings = [
        tagged(Some(62.0), 0, &["Tontura"]),
        tagged(Some(62.5), 1, &["Tontura"]),
    ];

    let lines = correlate(&readings, None, &AnalysisConfig::default());
    assert_eq!(
        lines,
        ["Tontura: average glucose 62.3 mg/dL over 2 readings (low)."]
    );
}

#[test]
fn multi_symptom_records_feed_every_label() {
    let readings = [
        tagged(Some(200.0), 0, &["Sede", "Fadiga"]),
        tagged(Some(220.0), 1, &["Sede"]),
        tagged(Some(100.0), 2, &["Fadiga", "Fadiga"]),
    ];

    let typed = symptom_correlations(&readings, None, &AnalysisConfig::default());
    let labels: Vec<&str> = typed.iter().map(|c| c.symptom.as_str()).collect();
    assert_eq!(labels, ["Sede", "Fadiga"]);

    assert_eq!(typed[0].mean_value, 210.0);
    assert_eq!(typed[0].band, GlucoseBand::High);
    assert_eq!(typed[1].mean_value, 150.0);
    assert_eq!(typed[1].sample_count, 2);
    assert_eq!(typed[1].band, GlucoseBand::Normal);
}

#[test]
fn no_numeric_values_means_no_association() {
    let readings = [
        tagged(None, 0, &["Tontura"]),
        tagged(Some(120.0), 1, &[]),
    ];

    let lines = correlate(&readings, None, &AnalysisConfig::default());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("No significant association"));
}

#[test]
fn interval_filter_applies() {
    let readings = [
        tagged(Some(60.0), 0, &["Tontura"]),
        tagged(Some(250.0), 5, &["Tontura"]),
    ];
    let morning = Interval::new(None, Some(t0() + Duration::hours(5)));

    let typed = symptom_correlations(&readings, Some(&morning), &AnalysisConfig::default());
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0].mean_value, 60.0);

    let outside = Interval::new(Some(t0() + Duration::days(2)), None);
    let lines = correlate(&readings, Some(&outside), &AnalysisConfig::default());
    assert_eq!(lines.len(), 1);
    assert_ne!(lines, correlate(&[], None, &AnalysisConfig::default()));
}

#[test]
fn correlation_is_idempotent() {
    let readings = [
        tagged(Some(90.0), 0, &["Cefaleia"]),
        tagged(Some(95.0), 1, &["Cefaleia"]),
    ];
    let config = AnalysisConfig::default();
    assert_eq!(
        correlate(&readings, None, &config),
        correlate(&readings, None, &config)
    );
}
