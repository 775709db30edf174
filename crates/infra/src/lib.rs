//! Infrastructure layer: storage adapters and background execution for the
//! forecasting engine.

pub mod read_model;
pub mod runner;

pub use read_model::InMemorySalesHistory;
pub use runner::{
    ForecastRunner, ForecastRunnerConfig, ForecastRunnerHandle, InMemoryInsightSink, InsightSink, RunnerError,
};
