//! Bridge WASM <-> JavaScript cho phân tích đường huyết.

use glycowatch_analysis::{
    correlate, daily_summaries, parse_interval, parse_readings_value, scan,
};
use glycowatch_core::{AnalysisConfig, AnalysisError, AnalysisReport, Interval, Reading};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsAnalysisConfig {
    #[serde(default)]
    utc_offset_minutes: Option<i32>,
    #[serde(default)]
    morning_start_hour: Option<u32>,
    #[serde(default)]
    morning_end_hour: Option<u32>,
    #[serde(default)]
    hypo_threshold: Option<f64>,
    #[serde(default)]
    morning_hypo_min_count: Option<usize>,
    #[serde(default)]
    swing_delta: Option<f64>,
    #[serde(default)]
    swing_window_minutes: Option<i64>,
    #[serde(default)]
    density_window_minutes: Option<i64>,
    #[serde(default)]
    density_max_readings: Option<usize>,
    #[serde(default)]
    extreme_high: Option<f64>,
    #[serde(default)]
    extreme_low: Option<f64>,
    #[serde(default)]
    target_low: Option<f64>,
    #[serde(default)]
    target_high: Option<f64>,
}

impl From<JsAnalysisConfig> for AnalysisConfig {
    fn from(cfg: JsAnalysisConfig) -> Self {
        let base = AnalysisConfig::default();
        AnalysisConfig {
            utc_offset_minutes: cfg.utc_offset_minutes.unwrap_or(base.utc_offset_minutes),
            morning_start_hour: cfg.morning_start_hour.unwrap_or(base.morning_start_hour),
            morning_end_hour: cfg.morning_end_hour.unwrap_or(base.morning_end_hour),
            hypo_threshold: cfg.hypo_threshold.unwrap_or(base.hypo_threshold),
            morning_hypo_min_count: cfg
                .morning_hypo_min_count
                .unwrap_or(base.morning_hypo_min_count),
            swing_delta: cfg.swing_delta.unwrap_or(base.swing_delta),
            swing_window_minutes: cfg.swing_window_minutes.unwrap_or(base.swing_window_minutes),
            density_window_minutes: cfg
                .density_window_minutes
                .unwrap_or(base.density_window_minutes),
            density_max_readings: cfg.density_max_readings.unwrap_or(base.density_max_readings),
            extreme_high: cfg.extreme_high.unwrap_or(base.extreme_high),
            extreme_low: cfg.extreme_low.unwrap_or(base.extreme_low),
            target_low: cfg.target_low.unwrap_or(base.target_low),
            target_high: cfg.target_high.unwrap_or(base.target_high),
        }
    }
}

#[derive(Deserialize, Default)]
struct JsInterval {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

struct Prepared {
    readings: Vec<Reading>,
    interval: Option<Interval>,
    config: AnalysisConfig,
}

/// Cảnh báo dạng văn bản (`string[]`).
#[wasm_bindgen]
pub fn scan_readings(
    records: JsValue,
    interval: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let prepared = prepare_js(records, interval, config)?;
    let alerts = scan(
        &prepared.readings,
        prepared.interval.as_ref(),
        &prepared.config,
    );
    serialize(&alerts)
}

/// Đường huyết trung bình theo triệu chứng (`string[]`).
#[wasm_bindgen]
pub fn correlate_symptoms(
    records: JsValue,
    interval: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let prepared = prepare_js(records, interval, config)?;
    let lines = correlate(
        &prepared.readings,
        prepared.interval.as_ref(),
        &prepared.config,
    );
    serialize(&lines)
}

/// Tổng hợp theo ngày.
#[wasm_bindgen]
pub fn summarize_days(
    records: JsValue,
    interval: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let prepared = prepare_js(records, interval, config)?;
    let days = daily_summaries(
        &prepared.readings,
        prepared.interval.as_ref(),
        &prepared.config,
    );
    serialize(&days)
}

/// Toàn bộ báo cáo trong một lần gọi.
#[wasm_bindgen]
pub fn analyze_readings(
    records: JsValue,
    interval: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let prepared = prepare_js(records, interval, config)?;
    let report: AnalysisReport = glycowatch_analysis::analyze(
        &prepared.readings,
        prepared.interval.as_ref(),
        &prepared.config,
    );
    serialize(&report)
}

fn prepare_js(
    records: JsValue,
    interval: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<Prepared, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let records = from_value::<serde_json::Value>(records)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách bản ghi: {err}")))?;

    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            from_value::<JsAnalysisConfig>(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?
        }
        _ => JsAnalysisConfig::default(),
    };

    let range = match interval {
        Some(js_range) if !js_range.is_undefined() && !js_range.is_null() => {
            let range: JsInterval = from_value(js_range).map_err(|err| {
                JsValue::from_str(&format!("Không đọc được khoảng thời gian: {err}"))
            })?;
            Some(range)
        }
        _ => None,
    };

    prepare(&records, range, cfg).map_err(|err| JsValue::from_str(&format_analysis_error(err)))
}

fn prepare(
    records: &serde_json::Value,
    range: Option<JsInterval>,
    cfg: JsAnalysisConfig,
) -> Result<Prepared, AnalysisError> {
    let config = AnalysisConfig::from(cfg);
    config.validate()?;

    let interval = range
        .map(|range| parse_interval(range.start.as_deref(), range.end.as_deref(), &config))
        .transpose()?;
    let readings = parse_readings_value(records, &config)?;

    Ok(Prepared {
        readings,
        interval,
        config,
    })
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn format_analysis_error(err: AnalysisError) -> String {
    format!("Analysis error: {err}")
}
