//! Dense daily series preparation.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stockcast_core::ItemId;
use stockcast_core::validate::non_negative;

use crate::error::{ForecastError, ForecastResult};
use crate::observation::SalesObservation;

/// Gap-free daily quantities for one item over `[start, start + len - 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    item_id: ItemId,
    start: NaiveDate,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last covered day.
    pub fn end(&self) -> NaiveDate {
        self.date_at(self.values.len().saturating_sub(1))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Days::new(index as u64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (self.date_at(i), *v))
    }
}

/// Turns sparse, possibly unordered observations into a [`TimeSeries`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeSeriesPreparer;

impl TimeSeriesPreparer {
    pub fn new() -> Self {
        Self
    }

    /// Build the dense series.
    ///
    /// - Days without observations are filled with zero.
    /// - Observations sharing a date are summed.
    /// - Observations for more than one item, or with negative/non-finite
    ///   quantities, are rejected.
    pub fn prepare(&self, observations: &[SalesObservation]) -> ForecastResult<TimeSeries> {
        let Some(first) = observations.first() else {
            return Err(ForecastError::insufficient(1, 0));
        };
        let item_id = first.item_id;

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for obs in observations {
            if obs.item_id != item_id {
                return Err(ForecastError::invalid(format!(
                    "observations mix items {} and {}",
                    item_id, obs.item_id
                )));
            }
            non_negative(&format!("quantity on {}", obs.date), obs.quantity)?;
            *by_day.entry(obs.date).or_insert(0.0) += obs.quantity;
        }

        // Non-empty: at least one entry was inserted above.
        let (start, end) = match (by_day.keys().next(), by_day.keys().next_back()) {
            (Some(s), Some(e)) => (*s, *e),
            _ => return Err(ForecastError::insufficient(1, 0)),
        };

        let days = (end - start).num_days() as usize + 1;
        let mut values = vec![0.0; days];
        for (date, qty) in by_day {
            let idx = (date - start).num_days() as usize;
            values[idx] = qty;
        }

        debug!(
            item_id = %item_id,
            observations = observations.len(),
            days,
            "prepared daily demand series"
        );

        Ok(TimeSeries {
            item_id,
            start,
            values,
        })
    }
}
