use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::thread;

use tracing::warn;

use stockcast_core::ItemId;

use crate::error::{ForecastError, ForecastResult};
use crate::job::ForecastJob;
use crate::result::Insight;

/// Item scope for execution.
///
/// - `Any`: run jobs for any item (shared workers).
/// - `Items`: only accept jobs for the listed items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemScope {
    #[default]
    Any,
    Items(BTreeSet<ItemId>),
}

impl ItemScope {
    pub fn allows(&self, item_id: ItemId) -> bool {
        match self {
            ItemScope::Any => true,
            ItemScope::Items(items) => items.contains(&item_id),
        }
    }
}

/// Scheduler/executor for forecasting jobs.
pub trait JobScheduler: Send + Sync {
    fn scope(&self) -> &ItemScope;

    fn run<J: ForecastJob>(&self, job: J) -> ForecastResult<Insight> {
        if !self.scope().allows(job.item_id()) {
            return Err(ForecastError::invalid(format!(
                "item {} is outside the scheduler scope",
                job.item_id()
            )));
        }
        job.run()
    }

    /// Run independent jobs on scoped worker threads.
    ///
    /// At most `available_parallelism` jobs run at once. Results come back in
    /// input order; a panicking job yields `ForecastError::Internal` for its
    /// slot only.
    fn run_batch<J: ForecastJob>(&self, jobs: Vec<J>) -> Vec<ForecastResult<Insight>> {
        let width = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        let mut results = Vec::with_capacity(jobs.len());
        let mut pending = jobs.into_iter().peekable();
        while pending.peek().is_some() {
            let wave: Vec<J> = pending.by_ref().take(width).collect();
            thread::scope(|s| {
                let handles: Vec<_> = wave
                    .into_iter()
                    .map(|job| {
                        let item_id = job.item_id();
                        (item_id, s.spawn(move || self.run(job)))
                    })
                    .collect();

                for (item_id, handle) in handles {
                    results.push(handle.join().unwrap_or_else(|_| {
                        warn!(item_id = %item_id, "forecast job panicked");
                        Err(ForecastError::Internal(format!(
                            "forecast job for item {item_id} panicked"
                        )))
                    }));
                }
            });
        }
        results
    }
}

/// Synchronous scheduler that runs jobs in-process.
#[derive(Debug, Clone, Default)]
pub struct LocalScheduler {
    scope: ItemScope,
}

impl LocalScheduler {
    pub fn new(scope: ItemScope) -> Self {
        Self { scope }
    }

    pub fn for_items(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self::new(ItemScope::Items(items.into_iter().collect()))
    }
}

impl JobScheduler for LocalScheduler {
    fn scope(&self) -> &ItemScope {
        &self.scope
    }
}
