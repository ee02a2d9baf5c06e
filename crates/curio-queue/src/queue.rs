//! Categorization queue state machine and scheduler.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use curio_core::traits::{OutcomeNotifier, QueueStore, RecordStore, SettingsProvider};
use curio_core::usage::{compute_usage, CategoryUsage};
use curio_core::{
    defaults, CategorizationNotice, CategorizationUpdate, ContentRecord, Error, RecordId, Result,
    UNCATEGORIZED,
};
use curio_inference::{Classifier, ProviderEndpoints, RateLimiter};

/// Configuration for the categorization queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Records attempted per drain cycle.
    pub batch_size: usize,
    /// Delay between drain cycles while work remains.
    pub drain_delay: Duration,
    /// Periodic drain trigger interval.
    pub period: Duration,
    /// Delay before the one-shot startup drain.
    pub startup_delay: Duration,
    /// Whether the periodic scheduler runs at all.
    pub scheduler_enabled: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::QUEUE_BATCH_SIZE,
            drain_delay: Duration::from_millis(defaults::QUEUE_DRAIN_DELAY_MS),
            period: Duration::from_secs(defaults::QUEUE_PERIOD_SECS),
            startup_delay: Duration::from_secs(defaults::QUEUE_STARTUP_DELAY_SECS),
            scheduler_enabled: true,
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `CURIO_QUEUE_ENABLED` | `true` | Enable/disable the periodic scheduler |
    /// | `CURIO_QUEUE_BATCH_SIZE` | `5` | Records attempted per cycle |
    /// | `CURIO_QUEUE_DRAIN_DELAY_MS` | `2000` | Delay between cycles |
    /// | `CURIO_QUEUE_PERIOD_SECS` | `300` | Periodic trigger interval |
    /// | `CURIO_QUEUE_STARTUP_DELAY_SECS` | `5` | Startup drain delay |
    pub fn from_env() -> Self {
        let base = Self::default();

        let scheduler_enabled = std::env::var("CURIO_QUEUE_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            batch_size: std::env::var("CURIO_QUEUE_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(base.batch_size)
                .max(1),
            drain_delay: std::env::var("CURIO_QUEUE_DRAIN_DELAY_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(base.drain_delay),
            period: std::env::var("CURIO_QUEUE_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.period),
            startup_delay: std::env::var("CURIO_QUEUE_STARTUP_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.startup_delay),
            scheduler_enabled,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_drain_delay(mut self, delay: Duration) -> Self {
        self.drain_delay = delay;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_scheduler_enabled(mut self, enabled: bool) -> Self {
        self.scheduler_enabled = enabled;
        self
    }
}

/// Drain execution state. Owned by the queue instance, never by the
/// module, so independent queues (e.g. under test) cannot interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Idle,
    Draining,
}

/// Event emitted by the categorization queue.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// A drain pass began.
    DrainStarted,
    /// One cycle finished; `attempted` records were handled.
    CycleCompleted { attempted: usize },
    /// A record's categorization attempt completed and was persisted.
    ItemCategorized {
        id: RecordId,
        categories: Vec<String>,
    },
    /// A record's attempt aborted (storage failure).
    ItemFailed { id: RecordId, error: String },
    /// The drain pass finished and the queue went idle.
    DrainFinished,
}

/// Handle for controlling a running queue scheduler.
pub struct QueueHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<QueueEvent>,
}

impl QueueHandle {
    /// Signal the scheduler to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Queue("failed to send shutdown signal".into()))
    }

    /// Get a receiver for queue events.
    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_rx.resubscribe()
    }
}

/// The background categorization queue.
///
/// At most one drain runs per instance at any time; a trigger while a
/// drain is in flight is a silent no-op, and newly added work is picked
/// up by the next trigger. Items within a cycle are processed strictly
/// sequentially so rate-limiter accounting stays deterministic.
pub struct CategorizeQueue {
    records: Arc<dyn RecordStore>,
    queue: Arc<dyn QueueStore>,
    settings: Arc<dyn SettingsProvider>,
    notifier: Arc<dyn OutcomeNotifier>,
    endpoints: ProviderEndpoints,
    limiter: Arc<RateLimiter>,
    config: QueueConfig,
    state: Mutex<DrainState>,
    event_tx: broadcast::Sender<QueueEvent>,
}

impl CategorizeQueue {
    pub fn new(
        records: Arc<dyn RecordStore>,
        queue: Arc<dyn QueueStore>,
        settings: Arc<dyn SettingsProvider>,
        notifier: Arc<dyn OutcomeNotifier>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::QUEUE_EVENT_CAPACITY);
        Self {
            records,
            queue,
            settings,
            notifier,
            endpoints: ProviderEndpoints::from_env(),
            limiter: Arc::new(RateLimiter::with_defaults()),
            config: QueueConfig::default(),
            state: Mutex::new(DrainState::Idle),
            event_tx,
        }
    }

    pub fn with_config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Current drain state.
    pub fn state(&self) -> DrainState {
        *self.lock_state()
    }

    /// Get a receiver for queue events.
    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.event_tx.subscribe()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DrainState> {
        // The guarded sections never panic, but stay total anyway.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_begin_drain(&self) -> bool {
        let mut state = self.lock_state();
        if *state == DrainState::Draining {
            return false;
        }
        *state = DrainState::Draining;
        true
    }

    fn finish_drain(&self) {
        *self.lock_state() = DrainState::Idle;
    }

    /// Queue a freshly saved record for categorization and kick off a
    /// drain. Returns `Ok(false)` without queueing when the record is
    /// an import and the import-skip setting is on. Saving never waits
    /// on categorization: the drain runs in the background.
    pub async fn enqueue_on_save(self: &Arc<Self>, record: &ContentRecord) -> Result<bool> {
        let settings = self.settings.load().await?;
        if record.is_import() && settings.skip_ai_for_imports {
            debug!(record_id = %record.id, "import-skip enabled, not queueing");
            return Ok(false);
        }

        self.queue.push_unique(&record.id).await?;
        self.process_now();
        Ok(true)
    }

    /// Start a drain in the background. A no-op when one is running.
    pub fn process_now(self: &Arc<Self>) {
        let queue = self.clone();
        tokio::spawn(async move {
            queue.drain().await;
        });
    }

    /// Run one complete drain pass to quiescence.
    ///
    /// Cycles through the persisted queue in batches until it is empty,
    /// sleeping `drain_delay` between cycles. Re-entrant calls return
    /// immediately.
    pub async fn drain(&self) {
        if !self.try_begin_drain() {
            debug!("drain already in progress, ignoring trigger");
            return;
        }

        let _ = self.event_tx.send(QueueEvent::DrainStarted);
        self.run_drain().await;
        self.finish_drain();
        let _ = self.event_tx.send(QueueEvent::DrainFinished);
    }

    async fn run_drain(&self) {
        loop {
            let pending = match self.queue.load().await {
                Ok(pending) => pending,
                Err(e) => {
                    error!(error = %e, "failed to load categorization queue");
                    return;
                }
            };
            if pending.is_empty() {
                debug!("categorization queue is empty");
                return;
            }

            // Fresh settings every cycle so credential changes apply
            // without a restart.
            let settings = match self.settings.load().await {
                Ok(settings) => settings,
                Err(e) => {
                    error!(error = %e, "failed to load settings");
                    return;
                }
            };
            let classifier =
                match Classifier::from_settings(&settings, &self.endpoints, self.limiter.clone()) {
                    Ok(classifier) => classifier,
                    Err(e) => {
                        error!(error = %e, "failed to build classifier");
                        return;
                    }
                };

            let usage = match self.records.list_all().await {
                Ok(records) => compute_usage(&records),
                Err(e) => {
                    warn!(error = %e, "failed to load records for usage context");
                    Vec::new()
                }
            };

            info!(
                queue_len = pending.len(),
                categories = usage.len(),
                "processing categorization queue"
            );

            let batch: Vec<RecordId> = pending
                .iter()
                .take(self.config.batch_size)
                .cloned()
                .collect();

            for id in &batch {
                self.process_item(id, &classifier, &usage).await;
            }

            let _ = self.event_tx.send(QueueEvent::CycleCompleted {
                attempted: batch.len(),
            });

            // Attempted ids leave the queue whether they succeeded or
            // not: attempt once per cycle, never auto-retry.
            if let Err(e) = self.queue.remove(&batch).await {
                error!(error = %e, "failed to remove attempted ids from queue");
                return;
            }

            let remaining = match self.queue.load().await {
                Ok(remaining) => remaining,
                Err(e) => {
                    error!(error = %e, "failed to reload categorization queue");
                    return;
                }
            };
            if remaining.is_empty() {
                info!("categorization queue drained");
                return;
            }

            debug!(
                remaining = remaining.len(),
                delay_ms = self.config.drain_delay.as_millis() as u64,
                "scheduling next drain cycle"
            );
            sleep(self.config.drain_delay).await;
        }
    }

    async fn process_item(&self, id: &RecordId, classifier: &Classifier, usage: &[CategoryUsage]) {
        let record = match self.records.fetch(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(record_id = %id, "record missing, marking handled");
                return;
            }
            Err(e) => {
                warn!(record_id = %id, error = %e, "failed to fetch record");
                return;
            }
        };

        if record.ai_processed {
            debug!(record_id = %id, "record already processed, skipping");
            return;
        }

        let outcome = classifier.classify(&record, usage).await;
        let success = outcome.is_success();

        match self
            .records
            .apply_categorization(id, CategorizationUpdate::completed(&outcome))
            .await
        {
            Ok(()) => {
                info!(
                    record_id = %id,
                    success,
                    categories = ?outcome.categories,
                    "record categorized"
                );
                let _ = self.event_tx.send(QueueEvent::ItemCategorized {
                    id: id.clone(),
                    categories: outcome.categories.clone(),
                });
                self.notifier
                    .notify(
                        &record,
                        CategorizationNotice {
                            success,
                            categories: outcome.categories,
                            ai_processed: success,
                            ai_failure_reason: outcome.failure_reason,
                            interaction_type: record.interaction_type,
                            platform: record.platform,
                        },
                    )
                    .await;
            }
            Err(e) => {
                // The batch keeps going: mark the record as not
                // processed so a future enqueue can retry it.
                error!(record_id = %id, error = %e, "failed to persist categorization");
                let reason = e.to_string();
                if let Err(e2) = self
                    .records
                    .apply_categorization(id, CategorizationUpdate::failed(reason.clone()))
                    .await
                {
                    warn!(record_id = %id, error = %e2, "failed to record failure reason");
                }
                let _ = self.event_tx.send(QueueEvent::ItemFailed {
                    id: id.clone(),
                    error: reason.clone(),
                });
                self.notifier
                    .notify(
                        &record,
                        CategorizationNotice {
                            success: false,
                            categories: vec![UNCATEGORIZED.to_string()],
                            ai_processed: false,
                            ai_failure_reason: Some(reason),
                            interaction_type: record.interaction_type,
                            platform: record.platform,
                        },
                    )
                    .await;
            }
        }
    }

    /// Start the periodic scheduler and return a handle for control.
    ///
    /// Runs one startup drain after `startup_delay`, then a drain every
    /// `period` until shut down.
    pub fn start(self: Arc<Self>) -> QueueHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        let queue = self.clone();
        tokio::spawn(async move {
            queue.run_scheduler(&mut shutdown_rx).await;
        });

        QueueHandle {
            shutdown_tx,
            event_rx,
        }
    }

    #[instrument(skip(self, shutdown_rx))]
    async fn run_scheduler(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.scheduler_enabled {
            info!("queue scheduler is disabled, not starting");
            return;
        }

        info!(
            period_secs = self.config.period.as_secs(),
            startup_delay_secs = self.config.startup_delay.as_secs(),
            "categorization queue scheduler started"
        );

        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("queue scheduler stopped before startup drain");
                return;
            }
            _ = sleep(self.config.startup_delay) => {}
        }
        self.drain().await;

        let mut ticker = tokio::time::interval(self.config.period);
        ticker.tick().await; // the first tick fires immediately

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("queue scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    debug!("periodic drain tick");
                    self.drain().await;
                }
            }
        }
    }
}

impl std::fmt::Debug for CategorizeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorizeQueue")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_config_default() {
        let config = QueueConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.drain_delay, Duration::from_secs(2));
        assert_eq!(config.period, Duration::from_secs(300));
        assert_eq!(config.startup_delay, Duration::from_secs(5));
        assert!(config.scheduler_enabled);
    }

    #[test]
    fn test_queue_config_builders() {
        let config = QueueConfig::default()
            .with_batch_size(3)
            .with_drain_delay(Duration::from_millis(10))
            .with_period(Duration::from_secs(60))
            .with_startup_delay(Duration::ZERO)
            .with_scheduler_enabled(false);

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.drain_delay, Duration::from_millis(10));
        assert_eq!(config.period, Duration::from_secs(60));
        assert_eq!(config.startup_delay, Duration::ZERO);
        assert!(!config.scheduler_enabled);
    }

    #[test]
    fn test_batch_size_clamped_to_one() {
        let config = QueueConfig::default().with_batch_size(0);
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn test_queue_event_clone_and_debug() {
        let event = QueueEvent::CycleCompleted { attempted: 5 };
        let cloned = event.clone();
        assert!(format!("{:?}", cloned).contains("CycleCompleted"));
    }
}
