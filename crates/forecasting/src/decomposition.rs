//! Classical additive decomposition and period detection.

use crate::stats::{autocorrelation, fit_line, mean, variance};

/// Minimum autocorrelation for a lag to count as a seasonal period.
const PERIOD_ACF_THRESHOLD: f64 = 0.3;

/// `values[i] == trend[i] + seasonal[i] + residual[i]` for every `i`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decomposition {
    pub period: usize,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    /// Mean-zero seasonal effect per phase (`pattern[i % period]`).
    pub pattern: Vec<f64>,
}

impl Decomposition {
    /// Share of the total series variance explained by the seasonal component, in \[0, 1\].
    pub fn seasonal_strength(&self) -> f64 {
        let total = variance(&self.values());
        if total <= f64::EPSILON {
            return 0.0;
        }
        (variance(&self.seasonal) / total).clamp(0.0, 1.0)
    }

    /// The series rebuilt from its components.
    fn values(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .map(|((t, s), r)| t + s + r)
            .collect()
    }
}

/// Decompose `values` with a centered moving-average trend.
///
/// Needs at least two full periods; returns `None` otherwise.
pub(crate) fn decompose_additive(values: &[f64], period: usize) -> Option<Decomposition> {
    let n = values.len();
    if period < 2 || n < period * 2 {
        return None;
    }

    let trend = centered_moving_average(values, period);

    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (v, t)) in values.iter().zip(trend.iter()).enumerate() {
        sums[i % period] += v - t;
        counts[i % period] += 1;
    }
    let raw: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .map(|(s, c)| if *c == 0 { 0.0 } else { s / *c as f64 })
        .collect();
    // Effects must cancel over one cycle, otherwise they leak level into the trend.
    let offset = mean(&raw);
    let pattern: Vec<f64> = raw.iter().map(|e| e - offset).collect();

    let seasonal: Vec<f64> = (0..n).map(|i| pattern[i % period]).collect();
    let residual: Vec<f64> = values
        .iter()
        .zip(trend.iter())
        .zip(seasonal.iter())
        .map(|((v, t), s)| v - t - s)
        .collect();

    Some(Decomposition {
        period,
        trend,
        seasonal,
        residual,
        pattern,
    })
}

/// Centered moving average of width `period` (2×`period` for even periods).
///
/// The `period / 2` edge points on each side have no full window; they are
/// extended along a line fitted to the nearest `period` defined values.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![0.0; n];

    for i in half..n - half {
        trend[i] = if period % 2 == 1 {
            values[i - half..=i + half].iter().sum::<f64>() / period as f64
        } else {
            let inner: f64 = values[i + 1 - half..i + half].iter().sum();
            (0.5 * values[i - half] + inner + 0.5 * values[i + half]) / period as f64
        };
    }

    let head = fit_line(&trend[half..half + period]);
    for (i, t) in trend.iter_mut().enumerate().take(half) {
        *t = head.at(i as f64 - half as f64);
    }
    let tail_start = n - half - period;
    let tail = fit_line(&trend[tail_start..n - half]);
    for (i, t) in trend.iter_mut().enumerate().skip(n - half) {
        *t = tail.at((i - tail_start) as f64);
    }
    trend
}

/// Lag in `2..=max_period` with the highest autocorrelation above 0.3.
pub(crate) fn detect_period(values: &[f64], max_period: usize) -> Option<usize> {
    let n = values.len();
    if max_period < 2 || n < max_period * 2 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in 2..=max_period.min(n / 2) {
        let acf = autocorrelation(values, lag);
        if acf > PERIOD_ACF_THRESHOLD && best.is_none_or(|(_, b)| acf > b) {
            best = Some((lag, acf));
        }
    }
    best.map(|(lag, _)| lag)
}
