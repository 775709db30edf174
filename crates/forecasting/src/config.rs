//! Engine configuration.
//!
//! All thresholds live in one immutable struct handed to the façade at
//! construction time, so tests can vary them per case.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use stockcast_core::validate::{non_negative, open_unit_interval};

use crate::error::{ForecastError, ForecastResult};

/// Thresholds and model bounds used by every component of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastingConfig {
    /// Minimum dense daily points required by `forecast_demand`.
    pub min_history_points: usize,
    /// Minimum dense daily points required by `calculate_safety_stock`.
    pub min_safety_stock_points: usize,
    /// Decomposition period, in days.
    pub seasonal_period: usize,
    /// Seasonal strength above which a series is reported as seasonal.
    pub seasonality_threshold: f64,
    /// Two-sided confidence level of prediction intervals.
    pub interval_level: f64,
    /// Sample size at which the confidence sample-size factor reaches 1.
    pub confidence_saturation_points: usize,
    /// Upper bound of the ARIMA autoregressive order search.
    pub max_ar_order: usize,
    /// Upper bound of the ARIMA differencing order search.
    pub max_diff_order: usize,
    /// Upper bound of the ARIMA moving-average order search.
    pub max_ma_order: usize,
    /// Holding cost per currency unit of stock value, used for `cost_impact`.
    pub holding_cost_rate: f64,
    /// Lead time assumed when an item has no metadata.
    pub default_lead_time_days: u32,
}

impl Default for ForecastingConfig {
    fn default() -> Self {
        Self {
            min_history_points: 10,
            min_safety_stock_points: 7,
            seasonal_period: 7,
            seasonality_threshold: 0.3,
            interval_level: 0.95,
            confidence_saturation_points: 90,
            max_ar_order: 2,
            max_diff_order: 1,
            max_ma_order: 1,
            holding_cost_rate: 0.25,
            default_lead_time_days: 7,
        }
    }
}

impl ForecastingConfig {
    /// Defaults overlaid with `STOCKCAST_*` environment variables.
    ///
    /// Unparsable values are ignored (with a warning) so a typo never takes the
    /// engine down; the result is validated before being returned.
    pub fn from_env() -> ForecastResult<Self> {
        let mut cfg = Self::default();
        overlay("STOCKCAST_MIN_HISTORY_POINTS", &mut cfg.min_history_points);
        overlay("STOCKCAST_MIN_SAFETY_STOCK_POINTS", &mut cfg.min_safety_stock_points);
        overlay("STOCKCAST_SEASONAL_PERIOD", &mut cfg.seasonal_period);
        overlay("STOCKCAST_SEASONALITY_THRESHOLD", &mut cfg.seasonality_threshold);
        overlay("STOCKCAST_INTERVAL_LEVEL", &mut cfg.interval_level);
        overlay(
            "STOCKCAST_CONFIDENCE_SATURATION_POINTS",
            &mut cfg.confidence_saturation_points,
        );
        overlay("STOCKCAST_MAX_AR_ORDER", &mut cfg.max_ar_order);
        overlay("STOCKCAST_MAX_DIFF_ORDER", &mut cfg.max_diff_order);
        overlay("STOCKCAST_MAX_MA_ORDER", &mut cfg.max_ma_order);
        overlay("STOCKCAST_HOLDING_COST_RATE", &mut cfg.holding_cost_rate);
        overlay("STOCKCAST_DEFAULT_LEAD_TIME_DAYS", &mut cfg.default_lead_time_days);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_min_history_points(mut self, points: usize) -> Self {
        self.min_history_points = points;
        self
    }

    pub fn with_min_safety_stock_points(mut self, points: usize) -> Self {
        self.min_safety_stock_points = points;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_seasonality_threshold(mut self, threshold: f64) -> Self {
        self.seasonality_threshold = threshold;
        self
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }

    pub fn with_confidence_saturation_points(mut self, points: usize) -> Self {
        self.confidence_saturation_points = points;
        self
    }

    pub fn with_arima_bounds(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_ar_order = max_p;
        self.max_diff_order = max_d;
        self.max_ma_order = max_q;
        self
    }

    pub fn with_holding_cost_rate(mut self, rate: f64) -> Self {
        self.holding_cost_rate = rate;
        self
    }

    pub fn with_default_lead_time_days(mut self, days: u32) -> Self {
        self.default_lead_time_days = days;
        self
    }

    /// Reject configurations no component can work with.
    pub fn validate(&self) -> ForecastResult<()> {
        if self.min_history_points < 2 {
            return Err(ForecastError::invalid("min_history_points must be >= 2"));
        }
        if self.min_safety_stock_points < 2 {
            return Err(ForecastError::invalid("min_safety_stock_points must be >= 2"));
        }
        if self.seasonal_period < 2 {
            return Err(ForecastError::invalid("seasonal_period must be >= 2"));
        }
        if !(self.seasonality_threshold.is_finite() && (0.0..1.0).contains(&self.seasonality_threshold)) {
            return Err(ForecastError::invalid("seasonality_threshold must be in [0, 1)"));
        }
        open_unit_interval("interval_level", self.interval_level)?;
        if self.confidence_saturation_points == 0 {
            return Err(ForecastError::invalid("confidence_saturation_points must be > 0"));
        }
        non_negative("holding_cost_rate", self.holding_cost_rate)?;
        if self.default_lead_time_days == 0 {
            return Err(ForecastError::invalid("default_lead_time_days must be > 0"));
        }
        Ok(())
    }
}

fn overlay<T: FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => warn!(key, value = %raw, "ignoring unparsable configuration value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ForecastingConfig::default().validate().unwrap();
    }

    #[test]
    fn builders_override_fields() {
        let cfg = ForecastingConfig::default()
            .with_min_history_points(30)
            .with_seasonal_period(12)
            .with_arima_bounds(1, 0, 0);

        assert_eq!(cfg.min_history_points, 30);
        assert_eq!(cfg.seasonal_period, 12);
        assert_eq!((cfg.max_ar_order, cfg.max_diff_order, cfg.max_ma_order), (1, 0, 0));
    }

    #[test]
    fn rejects_out_of_range_interval_level() {
        let err = ForecastingConfig::default()
            .with_interval_level(1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(msg) if msg.contains("interval_level")));
    }

    #[test]
    fn rejects_degenerate_period() {
        assert!(ForecastingConfig::default().with_seasonal_period(1).validate().is_err());
    }
}
