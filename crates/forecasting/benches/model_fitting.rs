use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Days, NaiveDate};
use stockcast_core::ItemId;
use stockcast_forecasting::{
    ForecastModelBank, ForecastingConfig, ModelKind, SalesObservation, SeasonalityAnalyzer, TimeSeries,
    TimeSeriesPreparer,
};

/// Weekly retail demand with drift and a little deterministic jitter.
fn synthetic_demand(days: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..days)
        .map(|i| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let jitter = ((state >> 33) as f64 / (1u64 << 31) as f64 - 0.5) * 4.0;
            let weekend = if i % 7 >= 5 { 8.0 } else { 0.0 };
            (25.0 + 0.05 * i as f64 + weekend + jitter).max(0.0)
        })
        .collect()
}

fn prepared(days: usize) -> TimeSeries {
    let item = ItemId::new();
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let observations: Vec<SalesObservation> = synthetic_demand(days)
        .into_iter()
        .enumerate()
        .map(|(i, q)| SalesObservation::new(item, start + Days::new(i as u64), q, q * 3.0))
        .collect();
    TimeSeriesPreparer::new().prepare(&observations).unwrap()
}

fn bench_model_fit(c: &mut Criterion) {
    let bank = ForecastModelBank::new(&ForecastingConfig::default());
    let mut group = c.benchmark_group("model_fit_and_predict");

    for days in [30usize, 90, 365].iter() {
        let series = synthetic_demand(*days);
        group.throughput(Throughput::Elements(*days as u64));

        for kind in [
            ModelKind::Arima,
            ModelKind::LinearRegression,
            ModelKind::SeasonalDecomposition,
        ] {
            group.bench_with_input(BenchmarkId::new(kind.as_str(), days), &series, |b, s| {
                b.iter(|| black_box(bank.fit_and_predict(kind, black_box(s), 30).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_series_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_preparation");

    for days in [90usize, 365, 1825].iter() {
        let item = ItemId::new();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        // Every third day has no sale.
        let observations: Vec<SalesObservation> = synthetic_demand(*days)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 3 != 2)
            .map(|(i, q)| SalesObservation::new(item, start + Days::new(i as u64), q, q))
            .collect();

        group.throughput(Throughput::Elements(observations.len() as u64));
        group.bench_with_input(BenchmarkId::new("prepare", days), &observations, |b, obs| {
            b.iter(|| black_box(TimeSeriesPreparer::new().prepare(black_box(obs)).unwrap()));
        });
    }

    group.finish();
}

fn bench_seasonality(c: &mut Criterion) {
    let series = prepared(365);
    let analyzer = SeasonalityAnalyzer::default();

    c.bench_function("seasonality_analyze_365d", |b| {
        b.iter(|| black_box(analyzer.analyze(black_box(&series))));
    });
}

criterion_group!(
    benches,
    bench_model_fit,
    bench_series_preparation,
    bench_seasonality
);
criterion_main!(benches);
