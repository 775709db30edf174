//! Trend + repeating seasonal pattern.
//!
//! The series is decomposed additively; the trend component is extrapolated
//! with a straight line and the per-phase seasonal effect is added back on.
//! With fewer than two full periods the seasonal part is zero and the model
//! degrades to a trend line.

use crate::decomposition::decompose_additive;
use crate::error::{ForecastError, ForecastResult};
use crate::models::{AccuracyMetrics, ErrorSummary, ForecastModel, ModelOutput, bounded_output, interval_z};
use crate::stats::fit_line;

#[derive(Debug, Clone)]
pub struct SeasonalDecompositionModel {
    period: usize,
    interval_level: f64,
}

impl SeasonalDecompositionModel {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            interval_level: 0.95,
        }
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }
}

impl ForecastModel for SeasonalDecompositionModel {
    fn fit_and_predict(&self, series: &[f64], periods: usize) -> ForecastResult<ModelOutput> {
        let n = series.len();
        if n < 3 {
            return Err(ForecastError::insufficient(3, n));
        }

        let (trend, pattern, strength) = match decompose_additive(series, self.period) {
            Some(d) => {
                let strength = d.seasonal_strength();
                (d.trend, d.pattern, strength)
            }
            None => (series.to_vec(), vec![0.0; self.period.max(1)], 0.0),
        };
        let line = fit_line(&trend);
        let phase = |i: usize| pattern[i % pattern.len()];

        let residuals: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, y)| y - (line.at(i as f64) + phase(i)))
            .collect();
        let summary = ErrorSummary::from_residuals(&residuals, series);

        let nf = n as f64;
        let mut raw = Vec::with_capacity(periods);
        let mut std_errors = Vec::with_capacity(periods);
        for h in 1..=periods {
            let i = n - 1 + h;
            raw.push(line.at(i as f64) + phase(i));
            std_errors.push(summary.rmse * (1.0 + h as f64 / nf).sqrt());
        }

        let mut metrics = AccuracyMetrics::new();
        summary.write_into(&mut metrics);
        metrics.insert("seasonal_strength", strength);
        metrics.insert("period", self.period as f64);
        metrics.insert("trend_slope", line.slope);

        let z = interval_z(self.interval_level)?;
        Ok(bounded_output(raw, &std_errors, z, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: [f64; 7] = [2.0, 0.0, -1.0, -1.0, 0.0, 3.0, -3.0];

    fn weekly(weeks: usize) -> Vec<f64> {
        (0..weeks * 7).map(|i| 30.0 + PATTERN[i % 7]).collect()
    }

    #[test]
    fn repeats_the_weekly_pattern() {
        let series = weekly(6);
        let out = SeasonalDecompositionModel::new(7).fit_and_predict(&series, 14).unwrap();

        for (h, p) in out.predictions.iter().enumerate() {
            let expected = 30.0 + PATTERN[(series.len() + h) % 7];
            assert!((p - expected).abs() < 1e-6, "h={h}: {p} vs {expected}");
        }
        assert!(out.metrics.get("seasonal_strength").unwrap() > 0.99);
        assert!(out.metrics.get("mae").unwrap() < 1e-6);
    }

    #[test]
    fn short_series_degrades_to_trend_line() {
        let series = [3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let out = SeasonalDecompositionModel::new(7).fit_and_predict(&series, 2).unwrap();
        assert_eq!(out.metrics.get("seasonal_strength"), Some(0.0));
        assert!((out.predictions[0] - 9.0).abs() < 1e-9);
    }
}
