//! Seasonality analysis over a prepared series.

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::decomposition::{decompose_additive, detect_period};
use crate::result::SeasonalityAnalysis;
use crate::series::TimeSeries;
use crate::stats::{fit_line, mean, variance};

/// Longest lag considered by period detection.
const MAX_DETECTED_PERIOD: usize = 31;

#[derive(Debug, Clone, Copy)]
pub struct SeasonalityAnalyzer {
    period: usize,
    threshold: f64,
}

impl SeasonalityAnalyzer {
    pub fn new(period: usize, threshold: f64) -> Self {
        Self { period, threshold }
    }

    /// Decompose `series` over the configured period.
    ///
    /// Histories shorter than two periods, or with no variance, yield
    /// [`SeasonalityAnalysis::none`].
    pub fn analyze(&self, series: &TimeSeries) -> SeasonalityAnalysis {
        let values = series.values();
        let item_id = series.item_id();

        if variance(values) <= f64::EPSILON {
            return SeasonalityAnalysis::none(item_id);
        }
        let Some(decomposition) = decompose_additive(values, self.period) else {
            return SeasonalityAnalysis::none(item_id);
        };

        let strength = decomposition.seasonal_strength();
        let level = mean(values);
        let weekly = decomposition.period == 7;
        let start_weekday = series.start().weekday().number_from_monday();

        let seasonal_factors: BTreeMap<u32, f64> = decomposition
            .pattern
            .iter()
            .enumerate()
            .map(|(phase, effect)| {
                let key = if weekly {
                    (start_weekday - 1 + phase as u32) % 7 + 1
                } else {
                    phase as u32
                };
                let factor = if level.abs() > f64::EPSILON {
                    (level + effect) / level
                } else {
                    1.0
                };
                (key, factor)
            })
            .collect();

        let analysis = SeasonalityAnalysis {
            item_id,
            has_seasonality: strength > self.threshold,
            seasonal_strength: strength,
            seasonal_factors,
            trend_component: fit_line(&decomposition.trend).slope,
            residual_variance: variance(&decomposition.residual),
            detected_period: detect_period(values, MAX_DETECTED_PERIOD.min(values.len() / 2)),
        };

        debug!(
            item_id = %item_id,
            strength,
            has_seasonality = analysis.has_seasonality,
            "analyzed seasonality"
        );

        analysis
    }
}

impl Default for SeasonalityAnalyzer {
    fn default() -> Self {
        Self::new(7, 0.3)
    }
}
