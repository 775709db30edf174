//! Least-squares trend line over the time index.

use crate::error::{ForecastError, ForecastResult};
use crate::models::{AccuracyMetrics, ErrorSummary, ForecastModel, ModelOutput, bounded_output, interval_z};
use crate::stats::{fit_line, mean};

#[derive(Debug, Clone)]
pub struct LinearRegressionModel {
    interval_level: f64,
}

impl LinearRegressionModel {
    pub fn new() -> Self {
        Self {
            interval_level: 0.95,
        }
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }
}

impl Default for LinearRegressionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for LinearRegressionModel {
    fn fit_and_predict(&self, series: &[f64], periods: usize) -> ForecastResult<ModelOutput> {
        let n = series.len();
        if n < 3 {
            return Err(ForecastError::insufficient(3, n));
        }

        let line = fit_line(series);
        let residuals: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, y)| y - line.at(i as f64))
            .collect();

        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let y_mean = mean(series);
        let sst: f64 = series.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r2 = if sst <= f64::EPSILON {
            if rss <= f64::EPSILON { 1.0 } else { 0.0 }
        } else {
            1.0 - rss / sst
        };

        // Standard error of a new observation at x, with n - 2 degrees of freedom.
        let sigma = (rss / (n - 2) as f64).sqrt();
        let nf = n as f64;
        let x_mean = (nf - 1.0) / 2.0;
        let sxx = nf * (nf * nf - 1.0) / 12.0;

        let mut raw = Vec::with_capacity(periods);
        let mut std_errors = Vec::with_capacity(periods);
        for h in 1..=periods {
            let x = (n - 1 + h) as f64;
            raw.push(line.at(x));
            std_errors.push(sigma * (1.0 + 1.0 / nf + (x - x_mean).powi(2) / sxx).sqrt());
        }

        let mut metrics = AccuracyMetrics::new();
        ErrorSummary::from_residuals(&residuals, series).write_into(&mut metrics);
        metrics.insert("r2_score", r2);
        metrics.insert("slope", line.slope);
        metrics.insert("intercept", line.intercept);

        let z = interval_z(self.interval_level)?;
        Ok(bounded_output(raw, &std_errors, z, metrics))
    }
}
