//! Forecast confidence scoring.

use crate::models::AccuracyMetrics;

/// Maps accuracy metrics and history length to a score in \[0, 1\].
///
/// Score = accuracy factor × sample-size factor:
/// - accuracy: `1 / (1 + e)` where `e` is the first available of
///   `normalized_rmse`, `normalized_mae`, `rmse`, `mae`
/// - sample size: `min(1, sqrt(n / saturation))`
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    saturation_points: usize,
}

impl ConfidenceScorer {
    pub fn new(saturation_points: usize) -> Self {
        Self {
            saturation_points: saturation_points.max(1),
        }
    }

    pub fn score(&self, metrics: &AccuracyMetrics, sample_size: usize) -> f64 {
        let Some(error) = ["normalized_rmse", "normalized_mae", "rmse", "mae"]
            .iter()
            .find_map(|key| metrics.get(key))
        else {
            return 0.0;
        };
        if !(error.is_finite() && error >= 0.0) {
            return 0.0;
        }

        let accuracy = 1.0 / (1.0 + error);
        let score = accuracy * self.sample_factor(sample_size);
        score.clamp(0.0, 1.0)
    }

    /// Monotone in `sample_size`, reaching 1 at the saturation point.
    pub fn sample_factor(&self, sample_size: usize) -> f64 {
        (sample_size as f64 / self.saturation_points as f64).sqrt().min(1.0)
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(nrmse: f64) -> AccuracyMetrics {
        AccuracyMetrics::new()
            .with("normalized_rmse", nrmse)
            .with("normalized_mae", nrmse * 0.8)
    }

    #[test]
    fn perfect_fit_on_saturated_history_scores_one() {
        let s = ConfidenceScorer::default().score(&metrics(0.0), 365);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_or_invalid_metrics_score_zero() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.score(&AccuracyMetrics::new(), 100), 0.0);
        assert_eq!(scorer.score(&metrics(f64::NAN), 100), 0.0);
        assert_eq!(scorer.score(&metrics(0.1), 0), 0.0);
    }

    #[test]
    fn falls_back_to_raw_mae() {
        let m = AccuracyMetrics::new().with("mae", 1.0);
        let s = ConfidenceScorer::new(10).score(&m, 10);
        assert!((s - 0.5).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: same history length, smaller error scores strictly higher.
        #[test]
        fn smaller_error_scores_higher(
            a in 0.0f64..10.0,
            b in 0.0f64..10.0,
            n in 1usize..500,
        ) {
            prop_assume!((a - b).abs() > 1e-9);
            let scorer = ConfidenceScorer::default();
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(scorer.score(&metrics(lo), n) > scorer.score(&metrics(hi), n));
        }

        /// Property: same metrics, more history never scores lower.
        #[test]
        fn more_history_never_scores_lower(
            e in 0.0f64..10.0,
            n1 in 0usize..500,
            n2 in 0usize..500,
        ) {
            let scorer = ConfidenceScorer::default();
            let (few, many) = if n1 <= n2 { (n1, n2) } else { (n2, n1) };
            prop_assert!(scorer.score(&metrics(e), many) >= scorer.score(&metrics(e), few));
        }

        #[test]
        fn score_is_a_probability(e in 0.0f64..1e6, n in 0usize..10_000) {
            let s = ConfidenceScorer::default().score(&metrics(e), n);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
