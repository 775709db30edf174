//! Background forecasting runners.

pub mod forecast_runner;

pub use forecast_runner::{
    ForecastRunner, ForecastRunnerConfig, ForecastRunnerHandle, InMemoryInsightSink, InsightSink, RunnerError,
};
