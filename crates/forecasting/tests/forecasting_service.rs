use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Days, NaiveDate, Utc};
use proptest::prelude::*;

use stockcast_core::ItemId;
use stockcast_forecasting::{
    DemandForecastJob, ForecastError, ForecastResult, ForecastingConfig, ForecastingService, Insight,
    ItemMetadata, ItemMetadataProvider, JobScheduler, LocalScheduler, ModelKind, SafetyStockJob,
    SalesHistoryReader, SalesObservation, SeasonalityJob, TimeSeriesPreparer, TrendDirection,
    TrendEstimator,
};

#[derive(Default)]
struct Store {
    sales: RwLock<HashMap<ItemId, Vec<SalesObservation>>>,
    metadata: RwLock<HashMap<ItemId, ItemMetadata>>,
}

impl Store {
    fn seed(&self, item_id: ItemId, quantities: &[f64]) {
        let observations = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| SalesObservation::new(item_id, day(i as u64), *q, q * 2.5))
            .collect();
        self.sales.write().unwrap().insert(item_id, observations);
    }
}

impl SalesHistoryReader for Store {
    fn get_sales_observations(&self, item_id: ItemId) -> ForecastResult<Vec<SalesObservation>> {
        Ok(self.sales.read().unwrap().get(&item_id).cloned().unwrap_or_default())
    }
}

impl ItemMetadataProvider for Store {
    fn get_item_metadata(&self, item_id: ItemId) -> ForecastResult<Option<ItemMetadata>> {
        Ok(self.metadata.read().unwrap().get(&item_id).cloned())
    }
}

type Service = ForecastingService<Arc<Store>, Arc<Store>>;

fn day(n: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(n)
}

fn service() -> (Arc<Store>, Service) {
    let store = Arc::new(Store::default());
    let service = ForecastingService::new(store.clone(), store.clone(), ForecastingConfig::default()).unwrap();
    (store, service)
}

/// Eight weeks of weekday/weekend demand with a mild upward drift.
fn retail_history() -> Vec<f64> {
    (0..56)
        .map(|i| {
            let weekend = if i % 7 >= 5 { 12.0 } else { 0.0 };
            let wobble = [0.0, 1.0, -1.0, 2.0, -2.0, 1.0, 0.0][(i * 3) % 7];
            20.0 + 0.1 * i as f64 + weekend + wobble
        })
        .collect()
}

const MODELS: [&str; 3] = ["arima", "linear_regression", "seasonal_decomposition"];

#[test]
fn forecasts_are_deterministic_per_model() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());
    let as_of = day(60);

    for model in MODELS {
        let a = service.forecast_demand_as_of(item, 14, model, as_of).unwrap();
        let b = service.forecast_demand_as_of(item, 14, model, as_of).unwrap();
        assert_eq!(a, b, "{model} is not reproducible");
    }
}

#[test]
fn predictions_and_intervals_are_never_negative() {
    let (store, service) = service();
    let item = ItemId::new();
    // Steep decline: unclamped extrapolation would go far below zero.
    let declining: Vec<f64> = (0..30).map(|i| (60.0 - 2.5 * i as f64).max(0.0)).collect();
    store.seed(item, &declining);

    for model in MODELS {
        let forecast = service.forecast_demand(item, 30, model).unwrap();
        for p in &forecast.predictions {
            assert!(p.predicted_demand >= 0.0, "{model}");
            assert!(p.confidence_lower >= 0.0, "{model}");
            assert!(p.confidence_upper >= p.confidence_lower, "{model}");
        }
    }
}

#[test]
fn unknown_model_falls_back_to_arima() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());

    let forecast = service.forecast_demand(item, 7, "bogus").unwrap();
    assert_eq!(forecast.model_used, ModelKind::Arima);

    let json = serde_json::to_value(&forecast).unwrap();
    assert_eq!(json["model_used"], "arima");
}

#[test]
fn short_history_is_rejected() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &[4.0; 9]);

    let err = service.forecast_demand(item, 7, "arima").unwrap_err();
    assert_eq!(err, ForecastError::InsufficientData { required: 10, actual: 9 });
}

#[test]
fn threshold_comes_from_config() {
    let store = Arc::new(Store::default());
    let item = ItemId::new();
    store.seed(item, &[4.0, 5.0, 6.0, 5.0, 4.0, 5.0, 6.0, 5.0, 4.0, 5.0, 6.0, 5.0]);
    let strict = ForecastingService::new(
        store.clone(),
        store,
        ForecastingConfig::default().with_min_history_points(30),
    )
    .unwrap();

    let err = strict.forecast_demand(item, 7, "linear").unwrap_err();
    assert_eq!(err, ForecastError::InsufficientData { required: 30, actual: 12 });
}

#[test]
fn safety_stock_is_monotone_in_service_level() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());
    store
        .metadata
        .write()
        .unwrap()
        .insert(item, ItemMetadata::new(5, 20.0));

    let recs: Vec<_> = [0.90, 0.95, 0.99]
        .into_iter()
        .map(|level| service.calculate_safety_stock(item, level).unwrap())
        .collect();

    for pair in recs.windows(2) {
        assert!(pair[1].recommended_safety_stock >= pair[0].recommended_safety_stock);
        assert!(pair[1].stockout_probability <= pair[0].stockout_probability);
    }
    assert!(recs.iter().all(|r| r.lead_time_days == 5 && r.current_safety_stock == 20.0));
}

#[test]
fn growth_rate_degenerate_inputs_are_zero() {
    let trend = TrendEstimator::new();
    assert_eq!(trend.calculate_growth_rate(&[100.0]), 0.0);
    assert_eq!(trend.calculate_growth_rate(&[0.0, 50.0, 100.0]), 0.0);
    assert_eq!(trend.calculate_growth_rate(&[]), 0.0);
}

#[test]
fn fourteen_day_forecast_starts_tomorrow() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());

    let before = Utc::now().date_naive();
    let forecast = service.forecast_demand(item, 14, "seasonal").unwrap();
    let after = Utc::now().date_naive();

    let start = forecast.forecast_period_start;
    assert!(start == before + Days::new(1) || start == after + Days::new(1));
    assert_eq!(forecast.forecast_period_end, start + Days::new(13));
    assert_eq!(forecast.predictions.len(), 14);
    for (offset, p) in forecast.predictions.iter().enumerate() {
        assert_eq!(p.date, start + Days::new(offset as u64));
    }
}

#[test]
fn gaps_between_sales_are_zero_filled() {
    let item = ItemId::new();
    let series = TimeSeriesPreparer::new()
        .prepare(&[
            SalesObservation::new(item, day(0), 5.0, 10.0),
            SalesObservation::new(item, day(4), 7.0, 14.0),
        ])
        .unwrap();
    assert_eq!(series.values(), &[5.0, 0.0, 0.0, 0.0, 7.0]);
}

#[test]
fn trend_direction_and_strength() {
    let trend = TrendEstimator::new();

    let up = trend.detect_trend(&[3.0, 4.0, 6.0, 7.0, 9.0, 12.0, 13.0]);
    assert_eq!(up.direction, TrendDirection::Increasing);
    assert!(up.strength > 0.8);

    let down = trend.detect_trend(&[13.0, 12.0, 9.0, 7.0, 6.0, 4.0, 3.0]);
    assert_eq!(down.direction, TrendDirection::Decreasing);
    assert!(down.strength > 0.8);

    let flat = trend.detect_trend(&[5.0, 5.2, 4.9, 5.1, 4.8, 5.2, 5.0, 4.9]);
    assert_eq!(flat.direction, TrendDirection::Stable);
    assert!(flat.strength < 0.5);
}

#[test]
fn weekly_retail_pattern_is_seasonal() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());

    let analysis = service.analyze_item_seasonality(item).unwrap();
    assert!(analysis.has_seasonality);
    assert_eq!(analysis.seasonal_factors.len(), 7);
    assert!(analysis.trend_component > 0.0);
}

#[test]
fn scheduler_runs_every_job_kind() {
    let (store, service) = service();
    let item = ItemId::new();
    store.seed(item, &retail_history());

    let scheduler = LocalScheduler::for_items([item]);
    let forecast = scheduler
        .run(DemandForecastJob::new(&service, item, 7, "linear"))
        .unwrap();
    let seasonality = scheduler.run(SeasonalityJob::new(&service, item)).unwrap();
    let safety = scheduler.run(SafetyStockJob::new(&service, item, 0.95)).unwrap();

    assert!(matches!(forecast, Insight::DemandForecast(ref f) if f.predictions.len() == 7));
    assert!(matches!(seasonality, Insight::Seasonality(_)));
    assert!(matches!(safety, Insight::SafetyStock(_)));
    assert!([forecast, seasonality, safety].iter().all(|i| i.item_id() == item));
}

#[test]
fn batch_forecasts_many_items_independently() {
    let (store, service) = service();
    let healthy: Vec<ItemId> = (0..6).map(|_| ItemId::new()).collect();
    for item in &healthy {
        store.seed(*item, &retail_history());
    }
    let sparse = ItemId::new();
    store.seed(sparse, &[1.0, 2.0]);

    let mut items = healthy.clone();
    items.insert(3, sparse);
    let jobs: Vec<_> = items
        .iter()
        .map(|item| DemandForecastJob::new(&service, *item, 7, "arima"))
        .collect();
    let results = LocalScheduler::default().run_batch(jobs);

    assert_eq!(results.len(), items.len());
    for (item, result) in items.iter().zip(&results) {
        if *item == sparse {
            assert!(matches!(result, Err(ForecastError::InsufficientData { .. })));
        } else {
            assert_eq!(result.as_ref().unwrap().item_id(), *item);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: every model keeps forecasts and bounds non-negative on any
    /// non-negative history.
    #[test]
    fn forecasts_stay_non_negative(
        history in prop::collection::vec(0.0f64..200.0, 10..60),
        periods in 1usize..45,
        model in 0usize..3,
    ) {
        let (store, service) = service();
        let item = ItemId::new();
        store.seed(item, &history);

        let forecast = service.forecast_demand_as_of(item, periods, MODELS[model], day(100)).unwrap();
        prop_assert_eq!(forecast.predictions.len(), periods);
        prop_assert!((0.0..=1.0).contains(&forecast.confidence_score));
        for p in &forecast.predictions {
            prop_assert!(p.predicted_demand >= 0.0);
            prop_assert!(p.confidence_lower >= 0.0);
            prop_assert!(p.confidence_upper >= p.confidence_lower);
        }
    }

    /// Property: the dense series spans first..=last sale and preserves the
    /// total quantity.
    #[test]
    fn gap_filling_preserves_totals(
        sales in prop::collection::vec((0u64..90, 0.0f64..50.0), 1..40),
    ) {
        let item = ItemId::new();
        let observations: Vec<_> = sales
            .iter()
            .map(|(d, q)| SalesObservation::new(item, day(*d), *q, *q))
            .collect();
        let series = TimeSeriesPreparer::new().prepare(&observations).unwrap();

        let first = sales.iter().map(|(d, _)| *d).min().unwrap();
        let last = sales.iter().map(|(d, _)| *d).max().unwrap();
        prop_assert_eq!(series.len() as u64, last - first + 1);
        prop_assert_eq!(series.start(), day(first));

        let total: f64 = sales.iter().map(|(_, q)| q).sum();
        let dense: f64 = series.values().iter().sum();
        prop_assert!((total - dense).abs() < 1e-6);
    }
}
