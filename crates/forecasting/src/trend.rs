//! Trend direction, strength and compound growth.

use serde::{Deserialize, Serialize};

use crate::stats::fit_line;

/// |r| above which a trend is reported as directional.
const DIRECTIONAL_STRENGTH: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl core::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction plus strength in \[0, 1\].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub strength: f64,
}

impl Trend {
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            strength: 0.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrendEstimator;

impl TrendEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Correlate values against their index.
    ///
    /// Strength is |r|; fewer than two points or a constant series is `stable`
    /// with strength 0.
    pub fn detect_trend(&self, values: &[f64]) -> Trend {
        if values.len() < 2 {
            return Trend::stable();
        }

        let r = fit_line(values).r;
        if !r.is_finite() {
            return Trend::stable();
        }

        let strength = r.abs().min(1.0);
        let direction = if strength > DIRECTIONAL_STRENGTH {
            if r > 0.0 {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            }
        } else {
            TrendDirection::Stable
        };

        Trend { direction, strength }
    }

    /// Compound per-period growth between the first and last value, in percent.
    ///
    /// Returns 0.0 for fewer than two points or a zero/negative starting value.
    pub fn calculate_growth_rate(&self, values: &[f64]) -> f64 {
        let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
            return 0.0;
        };
        if values.len() < 2 || first <= 0.0 || !first.is_finite() || !last.is_finite() {
            return 0.0;
        }
        if last <= 0.0 {
            return -100.0;
        }

        let periods = (values.len() - 1) as f64;
        let rate = ((last / first).powf(1.0 / periods) - 1.0) * 100.0;
        if rate.is_finite() { rate } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increasing_series_is_detected() {
        let t = TrendEstimator::new().detect_trend(&[1.0, 2.0, 3.0, 5.0, 8.0, 13.0]);
        assert_eq!(t.direction, TrendDirection::Increasing);
        assert!(t.strength > 0.8);
    }

    #[test]
    fn decreasing_series_is_detected() {
        let t = TrendEstimator::new().detect_trend(&[20.0, 18.0, 15.0, 11.0, 6.0, 1.0]);
        assert_eq!(t.direction, TrendDirection::Decreasing);
        assert!(t.strength > 0.8);
    }

    #[test]
    fn noisy_flat_series_is_stable() {
        let t = TrendEstimator::new().detect_trend(&[10.0, 10.4, 9.7, 10.2, 9.8, 10.3, 9.9, 10.0]);
        assert_eq!(t.direction, TrendDirection::Stable);
        assert!(t.strength < 0.5);
    }

    #[test]
    fn degenerate_inputs_are_stable() {
        let est = TrendEstimator::new();
        assert_eq!(est.detect_trend(&[]), Trend::stable());
        assert_eq!(est.detect_trend(&[4.0]), Trend::stable());
        assert_eq!(est.detect_trend(&[4.0, 4.0, 4.0]), Trend::stable());
    }

    #[test]
    fn growth_rate_guards_zero_division() {
        let est = TrendEstimator::new();
        assert_eq!(est.calculate_growth_rate(&[100.0]), 0.0);
        assert_eq!(est.calculate_growth_rate(&[0.0, 50.0, 100.0]), 0.0);
        assert_eq!(est.calculate_growth_rate(&[]), 0.0);
    }

    #[test]
    fn growth_rate_is_compound() {
        // 100 -> 121 over two periods is 10% per period.
        let rate = TrendEstimator::new().calculate_growth_rate(&[100.0, 105.0, 121.0]);
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn direction_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TrendDirection::Increasing).unwrap(),
            "\"increasing\""
        );
    }
}
