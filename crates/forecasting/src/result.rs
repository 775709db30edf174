//! Result value objects handed back to callers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::{ItemId, ValueObject};

use crate::models::{AccuracyMetrics, ModelKind};

/// One forecast day.
///
/// Invariant: `0 <= confidence_lower <= confidence_upper`, `predicted_demand >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub predicted_demand: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

/// Demand forecast for one item.
///
/// Created fresh per call; the engine never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub item_id: ItemId,
    pub predictions: Vec<Prediction>,
    /// The model actually applied (differs from the request on fallback).
    pub model_used: ModelKind,
    pub confidence_score: f64,
    pub accuracy_metrics: AccuracyMetrics,
    pub forecast_period_start: NaiveDate,
    pub forecast_period_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityAnalysis {
    pub item_id: ItemId,
    pub has_seasonality: bool,
    pub seasonal_strength: f64,
    /// Multiplicative index per seasonal position (ISO weekday for weekly periods).
    pub seasonal_factors: BTreeMap<u32, f64>,
    /// Slope of the trend component, in units per day.
    pub trend_component: f64,
    pub residual_variance: f64,
    /// Strongest autocorrelation period found in the history, if any.
    pub detected_period: Option<usize>,
}

impl SeasonalityAnalysis {
    /// Result for histories too short or too flat to decompose.
    pub fn none(item_id: ItemId) -> Self {
        Self {
            item_id,
            has_seasonality: false,
            seasonal_strength: 0.0,
            seasonal_factors: BTreeMap::new(),
            trend_component: 0.0,
            residual_variance: 0.0,
            detected_period: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyStockRecommendation {
    pub item_id: ItemId,
    pub service_level: f64,
    pub current_safety_stock: f64,
    pub recommended_safety_stock: f64,
    pub lead_time_days: u32,
    pub stockout_probability: f64,
    /// Holding cost of moving from current to recommended stock (negative = saving).
    pub cost_impact: f64,
    /// Expected lead-time demand plus the recommended safety stock.
    pub reorder_point: f64,
    /// Sample standard deviation of daily demand.
    pub demand_std_dev: f64,
}

impl ValueObject for Prediction {}
impl ValueObject for DemandForecast {}
impl ValueObject for SeasonalityAnalysis {}
impl ValueObject for SafetyStockRecommendation {}

/// Output of a scheduled job.
///
/// This is an insight that higher layers persist or display; it carries no
/// instructions to mutate stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Insight {
    DemandForecast(DemandForecast),
    Seasonality(SeasonalityAnalysis),
    SafetyStock(SafetyStockRecommendation),
}

impl Insight {
    pub fn item_id(&self) -> ItemId {
        match self {
            Insight::DemandForecast(f) => f.item_id,
            Insight::Seasonality(s) => s.item_id,
            Insight::SafetyStock(r) => r.item_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Insight::DemandForecast(_) => "demand_forecast",
            Insight::Seasonality(_) => "seasonality",
            Insight::SafetyStock(_) => "safety_stock",
        }
    }
}

impl ValueObject for Insight {}
