use std::collections::BTreeMap;

use chrono::NaiveDate;
use glycowatch_core::{AnalysisConfig, DailySummary, Interval, Reading};

use crate::sorted_window;

/// Group readings by local calendar day, oldest first.
pub fn daily_summaries(
    readings: &[Reading],
    interval: Option<&Interval>,
    config: &AnalysisConfig,
) -> Vec<DailySummary> {
    let offset = config.local_offset();
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for reading in sorted_window(readings, interval) {
        let date = reading.recorded_at.with_timezone(&offset).date_naive();
        days.entry(date)
            .or_default()
            .push(reading.numeric_value(), config);
    }

    days.into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect()
}

#[derive(Default)]
struct DayAccumulator {
    count: usize,
    values: Vec<f64>,
    below_range: usize,
    above_range: usize,
}

impl DayAccumulator {
    fn push(&mut self, value: Option<f64>, config: &AnalysisConfig) {
        self.count += 1;
        let Some(value) = value else {
            return;
        };
        if value < config.target_low {
            self.below_range += 1;
        } else if value > config.target_high {
            self.above_range += 1;
        }
        self.values.push(value);
    }

    fn finish(self, date: NaiveDate) -> DailySummary {
        let numeric_count = self.values.len();
        let mean = (numeric_count > 0)
            .then(|| self.values.iter().sum::<f64>() / numeric_count as f64);
        let min = self.values.iter().copied().reduce(f64::min);
        let max = self.values.iter().copied().reduce(f64::max);

        DailySummary {
            date,
            count: self.count,
            numeric_count,
            mean,
            min,
            max,
            below_range: self.below_range,
            above_range: self.above_range,
        }
    }
}
