use std::collections::HashMap;
use std::sync::RwLock;

use stockcast_core::ItemId;
use stockcast_forecasting::{
    ForecastError, ForecastResult, ItemMetadata, ItemMetadataProvider, SalesHistoryReader, SalesObservation,
};

/// In-memory sales history and item metadata for tests/dev.
///
/// Observations are kept per item in date order; readers get a snapshot copy.
#[derive(Debug, Default)]
pub struct InMemorySalesHistory {
    sales: RwLock<HashMap<ItemId, Vec<SalesObservation>>>,
    metadata: RwLock<HashMap<ItemId, ItemMetadata>>,
}

impl InMemorySalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sale(&self, observation: SalesObservation) {
        if let Ok(mut map) = self.sales.write() {
            let history = map.entry(observation.item_id).or_default();
            // Stable insert keeps same-day observations in arrival order.
            let at = history.partition_point(|o| o.date <= observation.date);
            history.insert(at, observation);
        }
    }

    pub fn set_item_metadata(&self, item_id: ItemId, metadata: ItemMetadata) {
        if let Ok(mut map) = self.metadata.write() {
            map.insert(item_id, metadata);
        }
    }

    /// Items with at least one recorded sale.
    pub fn items(&self) -> Vec<ItemId> {
        let map = match self.sales.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut items: Vec<ItemId> = map.keys().copied().collect();
        items.sort();
        items
    }
}

impl SalesHistoryReader for InMemorySalesHistory {
    fn get_sales_observations(&self, item_id: ItemId) -> ForecastResult<Vec<SalesObservation>> {
        let map = self
            .sales
            .read()
            .map_err(|_| ForecastError::source("sales history lock poisoned"))?;
        Ok(map.get(&item_id).cloned().unwrap_or_default())
    }
}

impl ItemMetadataProvider for InMemorySalesHistory {
    fn get_item_metadata(&self, item_id: ItemId) -> ForecastResult<Option<ItemMetadata>> {
        let map = self
            .metadata
            .read()
            .map_err(|_| ForecastError::source("item metadata lock poisoned"))?;
        Ok(map.get(&item_id).cloned())
    }
}
