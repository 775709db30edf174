//! Safety stock sizing from demand variability and lead time.
//!
//! Model:
//! - Daily demand ~ (mean, σ) estimated from the dense history.
//! - Lead-time demand σ_L = σ·√L.
//! - Recommended stock = max(0, Φ⁻¹(service_level)·σ_L).
//! - Stockout probability is evaluated at the stock actually held once the
//!   recommendation is applied without reducing existing stock:
//!   `1 − Φ(max(current, recommended) / σ_L)`.

use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use stockcast_core::validate::open_unit_interval;

use crate::error::{ForecastError, ForecastResult};
use crate::observation::ItemMetadata;
use crate::result::SafetyStockRecommendation;
use crate::series::TimeSeries;
use crate::stats::{clamp_non_negative, mean, stddev_sample};

#[derive(Debug, Clone, Copy)]
pub struct SafetyStockCalculator {
    holding_cost_rate: f64,
    min_points: usize,
}

impl SafetyStockCalculator {
    pub fn new(holding_cost_rate: f64, min_points: usize) -> Self {
        Self {
            holding_cost_rate,
            min_points: min_points.max(2),
        }
    }

    pub fn calculate(
        &self,
        series: &TimeSeries,
        metadata: &ItemMetadata,
        unit_cost: f64,
        service_level: f64,
    ) -> ForecastResult<SafetyStockRecommendation> {
        open_unit_interval("service_level", service_level)?;
        if metadata.lead_time_days == 0 {
            return Err(ForecastError::invalid("lead_time_days must be > 0"));
        }
        if series.len() < self.min_points {
            return Err(ForecastError::insufficient(self.min_points, series.len()));
        }

        let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Internal(e.to_string()))?;

        let values = series.values();
        let daily_mean = mean(values);
        let sigma = stddev_sample(values);
        let lead_time = f64::from(metadata.lead_time_days);
        let sigma_lead = sigma * lead_time.sqrt();

        let z = normal.inverse_cdf(service_level);
        let recommended = clamp_non_negative(z * sigma_lead);

        let current = clamp_non_negative(metadata.current_safety_stock);
        let stockout_probability = if sigma_lead <= f64::EPSILON {
            0.0
        } else {
            (1.0 - normal.cdf(current.max(recommended) / sigma_lead)).clamp(0.0, 1.0)
        };

        let cost_impact = round_cents((recommended - current) * unit_cost * self.holding_cost_rate);
        let reorder_point = daily_mean * lead_time + recommended;

        debug!(
            item_id = %series.item_id(),
            service_level,
            z,
            sigma,
            recommended,
            "calculated safety stock"
        );

        Ok(SafetyStockRecommendation {
            item_id: series.item_id(),
            service_level,
            current_safety_stock: current,
            recommended_safety_stock: recommended,
            lead_time_days: metadata.lead_time_days,
            stockout_probability,
            cost_impact,
            reorder_point,
            demand_std_dev: sigma,
        })
    }
}

impl Default for SafetyStockCalculator {
    fn default() -> Self {
        Self::new(0.25, 7)
    }
}

fn round_cents(amount: f64) -> f64 {
    if amount.is_finite() {
        (amount * 100.0).round() / 100.0
    } else {
        0.0
    }
}
