use chrono::{DateTime, Duration, TimeZone, Utc};
use glycowatch_analysis::{scan, scan_alerts};
use glycowatch_core::{AlertKind, AnalysisConfig, Interval, Reading};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn reading(value: f64, recorded_at: DateTime<Utc>) -> Reading {
    Reading::new(format!("r-{}", recorded_at.timestamp()), Some(value), recorded_at)
}

fn kinds(readings: &[Reading], interval: Option<&Interval>) -> Vec<AlertKind> {
    scan_alerts(readings, interval, &AnalysisConfig::default())
        .into_iter()
        .map(|alert| alert.kind)
        .collect()
}

#[test]
fn empty_input_yields_single_message() {
    let alerts = scan_alerts(&[], None, &AnalysisConfig::default());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::NoReadings);
}

#[test]
fn empty_interval_is_distinguishable() {
    let readings = [reading(100.0, t0())];
    let later = Interval::new(Some(t0() + Duration::days(1)), None);

    let alerts = scan_alerts(&readings, Some(&later), &AnalysisConfig::default());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::NoReadingsInInterval);

    let empty = scan(&[], None, &AnalysisConfig::default());
    let filtered = scan(&readings, Some(&later), &AnalysisConfig::default());
    assert_ne!(empty, filtered);
}

#[test]
fn quiet_readings_report_nothing_significant() {
    let readings = [
        reading(110.0, t0()),
        reading(115.0, t0() + Duration::hours(3)),
        reading(120.0, t0() + Duration::hours(6)),
    ];
    assert_eq!(kinds(&readings, None), [AlertKind::NothingSignificant]);
}

#[test]
fn swing_names_both_timestamps() {
    let readings = [
        reading(100.0, t0()),
        reading(160.0, t0() + Duration::minutes(60)),
    ];
    let alerts = scan_alerts(&readings, None, &AnalysisConfig::default());

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::SharpSwing);
    assert!(alerts[0].message.contains("2024-03-01 12:00"));
    assert!(alerts[0].message.contains("2024-03-01 13:00"));
}

#[test]
fn unordered_input_is_scanned_chronologically() {
    let readings = [
        reading(80.0, t0() + Duration::hours(2)),
        reading(120.0, t0()),
        reading(100.0, t0() + Duration::hours(1)),
    ];
    assert_eq!(kinds(&readings, None), [AlertKind::ProgressiveDecline]);
}

#[test]
fn decline_reported_once() {
    let values = [120.0, 100.0, 80.0, 75.0, 70.0];
    let readings: Vec<Reading> = values
        .iter()
        .enumerate()
        .map(|(step, value)| reading(*value, t0() + Duration::hours(3 * step as i64)))
        .collect();

    let declines = kinds(&readings, None)
        .into_iter()
        .filter(|kind| *kind == AlertKind::ProgressiveDecline)
        .count();
    assert_eq!(declines, 1);
}

#[test]
fn six_readings_in_an_hour_give_one_density_alert() {
    let readings: Vec<Reading> = (0..6)
        .map(|step| reading(120.0, t0() + Duration::minutes(step * 10)))
        .collect();
    assert_eq!(kinds(&readings, None), [AlertKind::MeasurementDensity]);
}

#[test]
fn extreme_values_name_their_timestamp() {
    let high = scan_alerts(&[reading(450.0, t0())], None, &AnalysisConfig::default());
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].kind, AlertKind::ExtremeHigh);
    assert!(high[0].message.contains("2024-03-01 12:00"));

    let low = scan_alerts(&[reading(20.0, t0())], None, &AnalysisConfig::default());
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].kind, AlertKind::ExtremeLow);
}

#[test]
fn morning_pattern_survives_other_readings() {
    let day = |n: i64| Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap() + Duration::days(n);
    let mut readings: Vec<Reading> = (0..3).map(|n| reading(60.0, day(n))).collect();
    readings.extend((0..10).map(|n| reading(130.0, day(n) + Duration::hours(6))));

    assert!(kinds(&readings, None).contains(&AlertKind::MorningHypoglycemia));
}

#[test]
fn interval_bounds_are_half_open() {
    let start = t0();
    let end = t0() + Duration::hours(1);
    let readings = [reading(450.0, start), reading(20.0, end)];
    let interval = Interval::new(Some(start), Some(end));

    assert_eq!(kinds(&readings, Some(&interval)), [AlertKind::ExtremeHigh]);
}

#[test]
fn oversized_windows_saturate() {
    let readings = [
        reading(100.0, t0()),
        reading(200.0, t0() + Duration::hours(1)),
    ];
    let unbounded = AnalysisConfig {
        swing_window_minutes: i64::MAX,
        density_window_minutes: i64::MAX,
        ..AnalysisConfig::default()
    };
    assert_eq!(
        scan_alerts(&readings, None, &unbounded)
            .into_iter()
            .map(|alert| alert.kind)
            .collect::<Vec<_>>(),
        [AlertKind::SharpSwing]
    );

    let negative = AnalysisConfig {
        swing_window_minutes: i64::MIN,
        density_window_minutes: i64::MIN,
        ..AnalysisConfig::default()
    };
    assert_eq!(
        scan_alerts(&readings, None, &negative)
            .into_iter()
            .map(|alert| alert.kind)
            .collect::<Vec<_>>(),
        [AlertKind::NothingSignificant]
    );
}

#[test]
fn scanning_is_idempotent_and_leaves_input_untouched() {
    let readings = vec![
        reading(160.0, t0() + Duration::minutes(60)),
        reading(100.0, t0()),
        Reading::new("broken", None, t0() + Duration::minutes(30)),
    ];
    let snapshot = readings.clone();
    let config = AnalysisConfig::default();

    let first = scan(&readings, None, &config);
    let second = scan(&readings, None, &config);

    assert_eq!(first, second);
    assert_eq!(readings, snapshot);
}
