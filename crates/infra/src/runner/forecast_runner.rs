use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use stockcast_core::ItemId;
use stockcast_forecasting::{
    DemandForecastJob, ForecastingService, Insight, ItemMetadataProvider, JobScheduler, LocalScheduler,
    SalesHistoryReader,
};

/// Sink for forecasting insights.
///
/// Insights are advisory output; emitting one never changes stock.
pub trait InsightSink: Send + Sync + 'static {
    fn emit(&self, insight: Insight);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInsightSink {
    inner: Mutex<Vec<Insight>>,
}

impl InMemoryInsightSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Insight> {
        match self.inner.lock() {
            Ok(v) => v.clone(),
            Err(_) => vec![],
        }
    }

    pub fn for_item(&self, item_id: ItemId) -> Vec<Insight> {
        self.all().into_iter().filter(|i| i.item_id() == item_id).collect()
    }
}

impl InsightSink for InMemoryInsightSink {
    fn emit(&self, insight: Insight) {
        if let Ok(mut v) = self.inner.lock() {
            v.push(insight);
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn runner thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Config for the demand forecast runner.
#[derive(Debug, Clone)]
pub struct ForecastRunnerConfig {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    /// Forecast horizon in days.
    pub periods: usize,
    pub model_type: String,
}

impl Default for ForecastRunnerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
            periods: 30,
            model_type: "arima".to_string(),
        }
    }
}

/// Periodically forecasts demand for a fixed set of items.
#[derive(Debug, Clone, Default)]
pub struct ForecastRunner {
    config: ForecastRunnerConfig,
}

/// Handle for the running forecast runner (shutdown + trigger hook).
#[derive(Debug)]
pub struct ForecastRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ForecastRunnerHandle {
    /// Request a pass now, e.g. after new sales were recorded.
    ///
    /// Triggers are coalesced: if a pass is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl ForecastRunner {
    pub fn new(config: ForecastRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastRunnerConfig {
        &self.config
    }

    /// Spawn a runner over `items`.
    ///
    /// - Schedule: one pass on startup, then every `interval`
    /// - Trigger: `handle.trigger()` requests an extra pass
    /// - Failures: logged; transient ones are retried with bounded
    ///   exponential backoff, insufficient history is not retried
    pub fn spawn<R, M, S>(
        &self,
        name: &'static str,
        service: Arc<ForecastingService<R, M>>,
        items: Vec<ItemId>,
        sink: Arc<S>,
    ) -> Result<ForecastRunnerHandle, RunnerError>
    where
        R: SalesHistoryReader + 'static,
        M: ItemMetadataProvider + 'static,
        S: InsightSink,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.config.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runner_loop(name, cfg, shutdown_rx, trigger_rx, service, items, sink))?;

        Ok(ForecastRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

fn runner_loop<R, M, S>(
    name: &'static str,
    cfg: ForecastRunnerConfig,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    service: Arc<ForecastingService<R, M>>,
    items: Vec<ItemId>,
    sink: Arc<S>,
) where
    R: SalesHistoryReader + 'static,
    M: ItemMetadataProvider + 'static,
    S: InsightSink,
{
    info!(runner = name, items = items.len(), "forecast runner started");

    let scheduler = LocalScheduler::for_items(items.iter().copied());

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = true; // run once on startup
    let mut retry: Vec<ItemId> = Vec::new();
    let mut failures: u32 = 0;
    let mut backoff_until: Option<Instant> = None;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if let Some(until) = backoff_until {
            if Instant::now() < until {
                thread::sleep(Duration::from_millis(10));
                continue;
            }
            backoff_until = None;
        }

        if !pending && retry.is_empty() {
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(250));
            thread::sleep(sleep_for);
            continue;
        }

        // A full pass supersedes any outstanding retries.
        let targets = if pending {
            retry.clear();
            items.clone()
        } else {
            std::mem::take(&mut retry)
        };
        pending = false;

        let jobs: Vec<_> = targets
            .iter()
            .map(|item| DemandForecastJob::new(&*service, *item, cfg.periods, cfg.model_type.as_str()))
            .collect();
        let results = scheduler.run_batch(jobs);

        let mut failed = Vec::new();
        for (item_id, result) in targets.into_iter().zip(results) {
            match result {
                Ok(insight) => sink.emit(insight),
                Err(e) if e.is_transient() => {
                    warn!(runner = name, item_id = %item_id, error = %e, "forecast failed; will retry");
                    failed.push(item_id);
                }
                Err(e) => {
                    warn!(runner = name, item_id = %item_id, error = %e, "forecast failed; not retrying");
                }
            }
        }

        if failed.is_empty() {
            failures = 0;
            continue;
        }

        failures += 1;
        if failures <= cfg.max_retries {
            retry = failed;
            backoff_until = Some(Instant::now() + backoff(cfg.base_backoff, failures));
        } else {
            warn!(runner = name, items = failed.len(), "retries exhausted; waiting for next pass");
            failures = 0;
        }
    }

    info!(runner = name, "forecast runner stopped");
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}
