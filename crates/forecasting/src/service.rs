//! Forecasting façade.
//!
//! `ForecastingService` is constructed once with its readers and an immutable
//! [`ForecastingConfig`]. Every method takes `&self` and keeps no state
//! between calls, so one instance can be shared across threads.

use chrono::{Days, NaiveDate, Utc};
use tracing::{debug, warn};

use stockcast_core::ItemId;
use stockcast_core::validate::open_unit_interval;

use crate::confidence::ConfidenceScorer;
use crate::config::ForecastingConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::models::{ForecastModelBank, ModelKind};
use crate::observation::{ItemMetadata, ItemMetadataProvider, SalesHistoryReader, SalesObservation};
use crate::result::{DemandForecast, Prediction, SafetyStockRecommendation, SeasonalityAnalysis};
use crate::safety_stock::SafetyStockCalculator;
use crate::seasonality::SeasonalityAnalyzer;
use crate::series::{TimeSeries, TimeSeriesPreparer};
use crate::trend::TrendEstimator;

#[derive(Debug)]
pub struct ForecastingService<R, M> {
    reader: R,
    metadata: M,
    config: ForecastingConfig,
    preparer: TimeSeriesPreparer,
    trend: TrendEstimator,
    bank: ForecastModelBank,
    scorer: ConfidenceScorer,
    analyzer: SeasonalityAnalyzer,
    calculator: SafetyStockCalculator,
}

impl<R, M> ForecastingService<R, M>
where
    R: SalesHistoryReader,
    M: ItemMetadataProvider,
{
    pub fn new(reader: R, metadata: M, config: ForecastingConfig) -> ForecastResult<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            metadata,
            preparer: TimeSeriesPreparer::new(),
            trend: TrendEstimator::new(),
            bank: ForecastModelBank::new(&config),
            scorer: ConfidenceScorer::new(config.confidence_saturation_points),
            analyzer: SeasonalityAnalyzer::new(config.seasonal_period, config.seasonality_threshold),
            calculator: SafetyStockCalculator::new(
                config.holding_cost_rate,
                config.min_safety_stock_points,
            ),
            config,
        })
    }

    pub fn config(&self) -> &ForecastingConfig {
        &self.config
    }

    /// Forecast daily demand for the `periods` days following today (UTC).
    ///
    /// `model_type` is matched leniently; unknown names fall back to ARIMA and
    /// the returned `model_used` reports the substitution.
    pub fn forecast_demand(
        &self,
        item_id: ItemId,
        periods: usize,
        model_type: &str,
    ) -> ForecastResult<DemandForecast> {
        self.forecast_demand_as_of(item_id, periods, model_type, Utc::now().date_naive())
    }

    /// Same as [`forecast_demand`](Self::forecast_demand) with an explicit
    /// "today". Prediction `i` is dated `as_of + 1 + i` days.
    pub fn forecast_demand_as_of(
        &self,
        item_id: ItemId,
        periods: usize,
        model_type: &str,
        as_of: NaiveDate,
    ) -> ForecastResult<DemandForecast> {
        if periods == 0 {
            return Err(ForecastError::invalid("periods must be > 0"));
        }
        let kind = ModelKind::parse_or_default(model_type);
        let start = shift(as_of, 1)?;
        let end = shift(start, periods as u64 - 1)?;

        let series = self.load_series(item_id, self.config.min_history_points)?;
        let output = self.bank.fit_and_predict(kind, series.values(), periods)?;

        let predictions = output
            .predictions
            .iter()
            .zip(output.intervals.iter())
            .enumerate()
            .map(|(offset, (demand, (lower, upper)))| {
                Ok(Prediction {
                    date: shift(start, offset as u64)?,
                    predicted_demand: *demand,
                    confidence_lower: *lower,
                    confidence_upper: *upper,
                })
            })
            .collect::<ForecastResult<Vec<_>>>()?;

        let confidence_score = self.scorer.score(&output.metrics, series.len());
        let trend = self.trend.detect_trend(series.values());

        debug!(
            item_id = %item_id,
            model = %kind,
            periods,
            history = series.len(),
            trend = %trend.direction,
            confidence_score,
            "forecasted demand"
        );

        Ok(DemandForecast {
            item_id,
            predictions,
            model_used: kind,
            confidence_score,
            accuracy_metrics: output.metrics,
            forecast_period_start: start,
            forecast_period_end: end,
        })
    }

    /// Seasonality of caller-supplied history.
    ///
    /// Histories too short or too flat to decompose yield the degenerate
    /// analysis; an empty slice carries no item and is rejected.
    pub fn analyze_seasonality(
        &self,
        historical_data: &[SalesObservation],
    ) -> ForecastResult<SeasonalityAnalysis> {
        let series = self.preparer.prepare(historical_data)?;
        Ok(self.analyzer.analyze(&series))
    }

    /// Seasonality of an item's stored history.
    pub fn analyze_item_seasonality(&self, item_id: ItemId) -> ForecastResult<SeasonalityAnalysis> {
        let observations = self.reader.get_sales_observations(item_id)?;
        if observations.is_empty() {
            return Ok(SeasonalityAnalysis::none(item_id));
        }
        self.analyze_seasonality(&observations)
    }

    pub fn calculate_safety_stock(
        &self,
        item_id: ItemId,
        service_level: f64,
    ) -> ForecastResult<SafetyStockRecommendation> {
        open_unit_interval("service_level", service_level)?;

        let observations = self.reader.get_sales_observations(item_id)?;
        let series = self.prepare_checked(item_id, &observations, self.config.min_safety_stock_points)?;

        let metadata = match self.metadata.get_item_metadata(item_id)? {
            Some(metadata) => metadata,
            None => {
                warn!(
                    item_id = %item_id,
                    lead_time_days = self.config.default_lead_time_days,
                    "item metadata missing; using default lead time and zero current stock"
                );
                ItemMetadata::new(self.config.default_lead_time_days, 0.0)
            }
        };
        let unit_cost = metadata
            .unit_cost
            .unwrap_or_else(|| weighted_average_price(&observations));

        self.calculator
            .calculate(&series, &metadata, unit_cost, service_level)
    }

    fn load_series(&self, item_id: ItemId, min_points: usize) -> ForecastResult<TimeSeries> {
        let observations = self.reader.get_sales_observations(item_id)?;
        self.prepare_checked(item_id, &observations, min_points)
    }

    fn prepare_checked(
        &self,
        item_id: ItemId,
        observations: &[SalesObservation],
        min_points: usize,
    ) -> ForecastResult<TimeSeries> {
        if observations.is_empty() {
            return Err(ForecastError::insufficient(min_points, 0));
        }
        if let Some(other) = observations.iter().find(|o| o.item_id != item_id) {
            return Err(ForecastError::source(format!(
                "reader returned observations for {} when asked for {item_id}",
                other.item_id
            )));
        }
        let series = self.preparer.prepare(observations)?;
        if series.len() < min_points {
            return Err(ForecastError::insufficient(min_points, series.len()));
        }
        Ok(series)
    }
}

fn shift(date: NaiveDate, days: u64) -> ForecastResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| ForecastError::invalid("forecast horizon exceeds the calendar range"))
}

/// Quantity-weighted average selling price; 0 when nothing was sold.
fn weighted_average_price(observations: &[SalesObservation]) -> f64 {
    let (value, quantity) = observations
        .iter()
        .fold((0.0, 0.0), |(v, q), o| (v + o.total_value, q + o.quantity));
    if quantity > 0.0 { value / quantity } else { 0.0 }
}
