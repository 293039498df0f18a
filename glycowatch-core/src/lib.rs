//! Mô hình dữ liệu lõi cho phân tích chỉ số đường huyết.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Cấu hình các ngưỡng cảnh báo và múi giờ địa phương.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Độ lệch múi giờ (phút) so với UTC, dùng cho giờ trong ngày và ngày lịch.
    pub utc_offset_minutes: i32,
    /// Giờ bắt đầu khung buổi sáng (tính cả giờ này).
    pub morning_start_hour: u32,
    /// Giờ kết thúc khung buổi sáng (tính cả giờ này).
    pub morning_end_hour: u32,
    /// Dưới ngưỡng này (mg/dL) coi là hạ đường huyết.
    pub hypo_threshold: f64,
    /// Số lần hạ đường huyết buổi sáng tối thiểu để coi là có xu hướng.
    pub morning_hypo_min_count: usize,
    /// Chênh lệch tối thiểu giữa hai lần đo liên tiếp để coi là dao động mạnh.
    pub swing_delta: f64,
    /// Khoảng cách tối đa (phút) giữa hai lần đo của một dao động mạnh.
    pub swing_window_minutes: i64,
    /// Độ rộng cửa sổ (phút) khi đếm mật độ đo.
    pub density_window_minutes: i64,
    /// Vượt quá số lần đo này trong một cửa sổ thì cảnh báo.
    pub density_max_readings: usize,
    /// Trên ngưỡng này là giá trị cực cao.
    pub extreme_high: f64,
    /// Dưới ngưỡng này là giá trị cực thấp.
    pub extreme_low: f64,
    /// Cận dưới của khoảng mục tiêu.
    pub target_low: f64,
    /// Cận trên của khoảng mục tiêu.
    pub target_high: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            morning_start_hour: 6,
            morning_end_hour: 9,
            hypo_threshold: 70.0,
            morning_hypo_min_count: 3,
            swing_delta: 50.0,
            swing_window_minutes: 120,
            density_window_minutes: 60,
            density_max_readings: 5,
            extreme_high: 400.0,
            extreme_low: 40.0,
            target_low: 70.0,
            target_high: 180.0,
        }
    }
}

const MAX_OFFSET_MINUTES: i32 = 14 * 60;
const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

impl AnalysisConfig {
    /// Kiểm tra cấu hình trước khi phân tích.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(AnalysisError::Config(format!(
                "utc_offset_minutes {} nằm ngoài ±{MAX_OFFSET_MINUTES}",
                self.utc_offset_minutes
            )));
        }
        if self.morning_start_hour > self.morning_end_hour || self.morning_end_hour > 23 {
            return Err(AnalysisError::Config(format!(
                "khung buổi sáng {}-{} không hợp lệ",
                self.morning_start_hour, self.morning_end_hour
            )));
        }
        for (name, minutes) in [
            ("swing_window_minutes", self.swing_window_minutes),
            ("density_window_minutes", self.density_window_minutes),
        ] {
            if !(0..=MAX_WINDOW_MINUTES).contains(&minutes) {
                return Err(AnalysisError::Config(format!(
                    "{name} {minutes} nằm ngoài 0..={MAX_WINDOW_MINUTES}"
                )));
            }
        }
        if self.target_low > self.target_high {
            return Err(AnalysisError::Config(format!(
                "target_low {} lớn hơn target_high {}",
                self.target_low, self.target_high
            )));
        }
        Ok(())
    }

    /// Múi giờ cố định tương ứng với `utc_offset_minutes`.
    pub fn local_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Một lần đo đường huyết đã được chuẩn hoá.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub id: String,
    /// Giá trị mg/dL; `None` khi dữ liệu gốc không phải số.
    pub value: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl Reading {
    pub fn new(id: impl Into<String>, value: Option<f64>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            value,
            recorded_at,
            symptoms: Vec::new(),
        }
    }

    /// Gắn nhãn triệu chứng cho lần đo.
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    /// Giá trị dùng được cho các luật; bỏ qua NaN và vô cực.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.filter(|value| value.is_finite())
    }
}

/// Khoảng thời gian nửa mở `[start, end)`; thiếu cận nào thì bỏ ngỏ phía đó.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Interval {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let after_start = self.start.map_or(true, |start| instant >= start);
        let before_end = self.end.map_or(true, |end| instant < end);
        after_start && before_end
    }
}

/// Luật (hoặc thông báo) đã sinh ra cảnh báo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    MorningHypoglycemia,
    SharpSwing,
    ProgressiveDecline,
    MeasurementDensity,
    ExtremeHigh,
    ExtremeLow,
    NoReadings,
    NoReadingsInInterval,
    NothingSignificant,
}

impl AlertKind {
    /// Thông báo mang tính thông tin, không phải phát hiện của luật.
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            AlertKind::NoReadings | AlertKind::NoReadingsInInterval | AlertKind::NothingSignificant
        )
    }
}

/// Cảnh báo dạng văn bản, sẵn sàng hiển thị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Phân loại giá trị trung bình so với khoảng mục tiêu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseBand {
    Low,
    Normal,
    High,
}

impl GlucoseBand {
    pub fn classify(value: f64, config: &AnalysisConfig) -> Self {
        if value < config.target_low {
            GlucoseBand::Low
        } else if value > config.target_high {
            GlucoseBand::High
        } else {
            GlucoseBand::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GlucoseBand::Low => "low",
            GlucoseBand::Normal => "normal",
            GlucoseBand::High => "high",
        }
    }
}

/// Liên hệ giữa một triệu chứng và đường huyết trung bình.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomCorrelation {
    pub symptom: String,
    pub mean_value: f64,
    pub sample_count: usize,
    pub band: GlucoseBand,
}

/// Tổng hợp các lần đo trong một ngày lịch địa phương.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub count: usize,
    pub numeric_count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub below_range: usize,
    pub above_range: usize,
}

/// Kết quả phân tích tổng hợp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub alerts: Vec<Alert>,
    pub correlations: Vec<String>,
    pub daily: Vec<DailySummary>,
}

impl AnalysisReport {
    /// `generated_at` lấy từ đồng hồ hệ thống; hai lần phân tích cùng dữ liệu
    /// chỉ giống nhau ở các trường còn lại.
    pub fn new(alerts: Vec<Alert>, correlations: Vec<String>, daily: Vec<DailySummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            alerts,
            correlations,
            daily,
        }
    }
}

/// Lỗi tại biên nhập dữ liệu.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Dữ liệu đầu vào thiếu danh sách bản ghi")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Khoảng thời gian không hợp lệ: {0}")]
    InvalidInterval(String),
    #[error("Cấu hình không hợp lệ: {0}")]
    Config(String),
}
