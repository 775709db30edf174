//! Inputs consumed from the surrounding application.
//!
//! The engine is storage-agnostic: sales history and item metadata are provided
//! by callers (infra adapters, persistence layers) through the traits below.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::ItemId;

use crate::error::ForecastResult;

/// One day of recorded sales for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub item_id: ItemId,
    pub date: NaiveDate,
    /// Units sold (non-negative).
    pub quantity: f64,
    /// Revenue for the day.
    pub total_value: f64,
    pub avg_price: f64,
}

impl SalesObservation {
    pub fn new(item_id: ItemId, date: NaiveDate, quantity: f64, total_value: f64) -> Self {
        let avg_price = if quantity > 0.0 { total_value / quantity } else { 0.0 };
        Self {
            item_id,
            date,
            quantity,
            total_value,
            avg_price,
        }
    }
}

/// Replenishment attributes of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub lead_time_days: u32,
    pub current_safety_stock: f64,
    /// Unit cost used to value holding cost; falls back to the sales-weighted
    /// average price when absent.
    pub unit_cost: Option<f64>,
}

impl ItemMetadata {
    pub fn new(lead_time_days: u32, current_safety_stock: f64) -> Self {
        Self {
            lead_time_days,
            current_safety_stock,
            unit_cost: None,
        }
    }

    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }
}

/// Historical-sales reader owned by the persistence layer.
pub trait SalesHistoryReader: Send + Sync {
    fn get_sales_observations(&self, item_id: ItemId) -> ForecastResult<Vec<SalesObservation>>;
}

/// Item metadata lookup owned by the persistence layer.
///
/// `Ok(None)` means the item has no replenishment metadata recorded.
pub trait ItemMetadataProvider: Send + Sync {
    fn get_item_metadata(&self, item_id: ItemId) -> ForecastResult<Option<ItemMetadata>>;
}

impl<S> SalesHistoryReader for Arc<S>
where
    S: SalesHistoryReader + ?Sized,
{
    fn get_sales_observations(&self, item_id: ItemId) -> ForecastResult<Vec<SalesObservation>> {
        (**self).get_sales_observations(item_id)
    }
}

impl<S> ItemMetadataProvider for Arc<S>
where
    S: ItemMetadataProvider + ?Sized,
{
    fn get_item_metadata(&self, item_id: ItemId) -> ForecastResult<Option<ItemMetadata>> {
        (**self).get_item_metadata(item_id)
    }
}
