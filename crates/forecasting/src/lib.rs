//! `stockcast-forecasting`
//!
//! **Responsibility:** demand forecasting and inventory-risk analytics.
//!
//! - Turns sparse daily sales observations into dense series.
//! - Forecasts demand with ARIMA, linear regression or seasonal decomposition.
//! - Scores forecast confidence, detects seasonality and sizes safety stock.
//!
//! The crate is storage-agnostic: history and item metadata come in through
//! [`SalesHistoryReader`] and [`ItemMetadataProvider`]. It emits results
//! ([`Insight`]s), never stock movements.

pub mod confidence;
pub mod config;
mod decomposition;
pub mod error;
pub mod job;
pub mod models;
pub mod observation;
pub mod result;
pub mod safety_stock;
pub mod scheduler;
pub mod seasonality;
pub mod series;
pub mod service;
mod stats;
pub mod trend;

pub use confidence::ConfidenceScorer;
pub use config::ForecastingConfig;
pub use error::{ForecastError, ForecastResult};
pub use job::{DemandForecastJob, ForecastJob, SafetyStockJob, SeasonalityJob};
pub use models::{AccuracyMetrics, ForecastModel, ForecastModelBank, ModelKind, ModelOutput};
pub use observation::{ItemMetadata, ItemMetadataProvider, SalesHistoryReader, SalesObservation};
pub use result::{DemandForecast, Insight, Prediction, SafetyStockRecommendation, SeasonalityAnalysis};
pub use safety_stock::SafetyStockCalculator;
pub use scheduler::{ItemScope, JobScheduler, LocalScheduler};
pub use seasonality::SeasonalityAnalyzer;
pub use series::{TimeSeries, TimeSeriesPreparer};
pub use service::ForecastingService;
pub use trend::{Trend, TrendDirection, TrendEstimator};
