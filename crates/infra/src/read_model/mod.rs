//! Read-side storage adapters feeding the forecasting engine.

pub mod sales_history;

pub use sales_history::InMemorySalesHistory;
