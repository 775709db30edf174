use stockcast_core::ItemId;

use crate::error::ForecastResult;
use crate::observation::{ItemMetadataProvider, SalesHistoryReader};
use crate::result::Insight;
use crate::service::ForecastingService;

/// An item-scoped unit of forecasting work.
///
/// Jobs read history through the service they borrow and return an
/// [`Insight`]. They never mutate stock or any other domain state.
pub trait ForecastJob: Send + Sync {
    /// The item this job computes an insight for.
    fn item_id(&self) -> ItemId;

    fn run(&self) -> ForecastResult<Insight>;
}

impl<J> ForecastJob for Box<J>
where
    J: ForecastJob + ?Sized,
{
    fn item_id(&self) -> ItemId {
        (**self).item_id()
    }

    fn run(&self) -> ForecastResult<Insight> {
        (**self).run()
    }
}

/// Demand forecast over the next `periods` days.
#[derive(Debug)]
pub struct DemandForecastJob<'a, R, M> {
    service: &'a ForecastingService<R, M>,
    item_id: ItemId,
    periods: usize,
    model_type: String,
}

impl<'a, R, M> DemandForecastJob<'a, R, M> {
    pub fn new(
        service: &'a ForecastingService<R, M>,
        item_id: ItemId,
        periods: usize,
        model_type: impl Into<String>,
    ) -> Self {
        Self {
            service,
            item_id,
            periods,
            model_type: model_type.into(),
        }
    }
}

impl<R, M> ForecastJob for DemandForecastJob<'_, R, M>
where
    R: SalesHistoryReader,
    M: ItemMetadataProvider,
{
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn run(&self) -> ForecastResult<Insight> {
        self.service
            .forecast_demand(self.item_id, self.periods, &self.model_type)
            .map(Insight::DemandForecast)
    }
}

/// Seasonality of the item's stored history.
#[derive(Debug)]
pub struct SeasonalityJob<'a, R, M> {
    service: &'a ForecastingService<R, M>,
    item_id: ItemId,
}

impl<'a, R, M> SeasonalityJob<'a, R, M> {
    pub fn new(service: &'a ForecastingService<R, M>, item_id: ItemId) -> Self {
        Self { service, item_id }
    }
}

impl<R, M> ForecastJob for SeasonalityJob<'_, R, M>
where
    R: SalesHistoryReader,
    M: ItemMetadataProvider,
{
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn run(&self) -> ForecastResult<Insight> {
        self.service
            .analyze_item_seasonality(self.item_id)
            .map(Insight::Seasonality)
    }
}

/// Safety stock recommendation at a target service level.
#[derive(Debug)]
pub struct SafetyStockJob<'a, R, M> {
    service: &'a ForecastingService<R, M>,
    item_id: ItemId,
    service_level: f64,
}

impl<'a, R, M> SafetyStockJob<'a, R, M> {
    pub fn new(service: &'a ForecastingService<R, M>, item_id: ItemId, service_level: f64) -> Self {
        Self {
            service,
            item_id,
            service_level,
        }
    }
}

impl<R, M> ForecastJob for SafetyStockJob<'_, R, M>
where
    R: SalesHistoryReader,
    M: ItemMetadataProvider,
{
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn run(&self) -> ForecastResult<Insight> {
        self.service
            .calculate_safety_stock(self.item_id, self.service_level)
            .map(Insight::SafetyStock)
    }
}
