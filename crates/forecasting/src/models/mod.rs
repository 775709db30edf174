//! Forecast model bank.
//!
//! Three interchangeable strategies behind one trait. Callers select a strategy
//! with [`ModelKind`]; the bank owns the per-model parameters derived from
//! [`ForecastingConfig`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::warn;

use stockcast_core::validate::open_unit_interval;

use crate::config::ForecastingConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::stats::{clamp_non_negative, mean};

pub mod arima;
pub mod linear;
pub mod seasonal;

pub use arima::ArimaModel;
pub use linear::LinearRegressionModel;
pub use seasonal::SeasonalDecompositionModel;

/// Forecasting strategy selector.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Arima,
    LinearRegression,
    SeasonalDecomposition,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Arima => "arima",
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::SeasonalDecomposition => "seasonal_decomposition",
        }
    }

    /// Resolve a caller-supplied model name.
    ///
    /// Unrecognized names fall back to [`ModelKind::Arima`]. This is not an error:
    /// the forecast's `model_used` reports the model actually applied, which is
    /// how callers detect the substitution.
    pub fn parse_or_default(name: &str) -> Self {
        match name.parse::<ModelKind>() {
            Ok(kind) => kind,
            Err(_) => {
                warn!(
                    requested = name,
                    fallback = %ModelKind::Arima,
                    "unknown model type; falling back"
                );
                ModelKind::Arima
            }
        }
    }
}

impl core::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arima" => Ok(ModelKind::Arima),
            "linear_regression" | "linear" => Ok(ModelKind::LinearRegression),
            "seasonal_decomposition" | "seasonal_decompose" | "seasonal" => {
                Ok(ModelKind::SeasonalDecomposition)
            }
            other => Err(ForecastError::invalid(format!("unknown model type: {other}"))),
        }
    }
}

/// Model-specific accuracy figures, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccuracyMetrics(BTreeMap<String, f64>);

impl AccuracyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

/// Raw model output before dates are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Point forecasts, one per period, all `>= 0`.
    pub predictions: Vec<f64>,
    /// `(lower, upper)` per period, `0 <= lower <= upper`.
    pub intervals: Vec<(f64, f64)>,
    pub metrics: AccuracyMetrics,
}

/// A forecasting strategy: series in, predictions + intervals + metrics out.
pub trait ForecastModel: Send + Sync {
    fn fit_and_predict(&self, series: &[f64], periods: usize) -> ForecastResult<ModelOutput>;
}

/// Holds one configured instance of each strategy.
#[derive(Debug, Clone)]
pub struct ForecastModelBank {
    arima: ArimaModel,
    linear: LinearRegressionModel,
    seasonal: SeasonalDecompositionModel,
}

impl ForecastModelBank {
    pub fn new(config: &ForecastingConfig) -> Self {
        Self {
            arima: ArimaModel::new(config.max_ar_order, config.max_diff_order, config.max_ma_order)
                .with_interval_level(config.interval_level),
            linear: LinearRegressionModel::new().with_interval_level(config.interval_level),
            seasonal: SeasonalDecompositionModel::new(config.seasonal_period)
                .with_interval_level(config.interval_level),
        }
    }

    pub fn model(&self, kind: ModelKind) -> &dyn ForecastModel {
        match kind {
            ModelKind::Arima => &self.arima,
            ModelKind::LinearRegression => &self.linear,
            ModelKind::SeasonalDecomposition => &self.seasonal,
        }
    }

    pub fn fit_and_predict(
        &self,
        kind: ModelKind,
        series: &[f64],
        periods: usize,
    ) -> ForecastResult<ModelOutput> {
        if periods == 0 {
            return Err(ForecastError::invalid("periods must be > 0"));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::invalid("series contains non-finite values"));
        }
        self.model(kind).fit_and_predict(series, periods)
    }
}

/// Two-sided standard-normal quantile for `level` (e.g. 1.96 for 0.95).
pub(crate) fn interval_z(level: f64) -> ForecastResult<f64> {
    open_unit_interval("interval_level", level)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Internal(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

/// In-sample error summary over aligned `actual`/`fitted` pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ErrorSummary {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub normalized_mae: f64,
    pub normalized_rmse: f64,
}

impl ErrorSummary {
    pub fn from_residuals(residuals: &[f64], actual: &[f64]) -> Self {
        let n = residuals.len().max(1) as f64;
        let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;
        let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n;
        let rmse = mse.sqrt();

        // Scale-free versions; an all-zero history keeps the raw figures.
        let scale = mean(&actual.iter().map(|a| a.abs()).collect::<Vec<_>>());
        let (normalized_mae, normalized_rmse) = if scale > f64::EPSILON {
            (mae / scale, rmse / scale)
        } else {
            (mae, rmse)
        };

        Self {
            mae,
            mse,
            rmse,
            normalized_mae,
            normalized_rmse,
        }
    }

    pub fn write_into(&self, metrics: &mut AccuracyMetrics) {
        metrics.insert("mae", self.mae);
        metrics.insert("mse", self.mse);
        metrics.insert("rmse", self.rmse);
        metrics.insert("normalized_mae", self.normalized_mae);
        metrics.insert("normalized_rmse", self.normalized_rmse);
    }
}

/// Clamp point forecasts to `>= 0` and build `[lower, upper]` around them from
/// per-horizon standard errors.
pub(crate) fn bounded_output(
    raw: Vec<f64>,
    std_errors: &[f64],
    z: f64,
    metrics: AccuracyMetrics,
) -> ModelOutput {
    let predictions: Vec<f64> = raw.into_iter().map(clamp_non_negative).collect();
    let intervals = predictions
        .iter()
        .zip(std_errors.iter())
        .map(|(p, se)| {
            let margin = if se.is_finite() { (z * se).abs() } else { 0.0 };
            let lower = clamp_non_negative(p - margin);
            let upper = (p + margin).max(lower);
            (lower, upper)
        })
        .collect();

    ModelOutput {
        predictions,
        intervals,
        metrics,
    }
}
