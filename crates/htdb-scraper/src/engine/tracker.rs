//! Run metadata lifecycle, progress reporting, and checkpoint snapshots.

use std::collections::HashMap;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use htdb_core::{RunStatus, RunType};

use crate::dedup::DuplicateDetector;
use crate::engine::{lock, Checkpoint, CheckpointHook, Progress, ScrapeCounters, ScraperEngine, Statistics};
use crate::error::ScraperError;
use crate::queue::JobQueue;

impl ScraperEngine {
    /// Creates run metadata in storage and attaches it to the engine.
    /// Returns the run id.
    ///
    /// # Errors
    ///
    /// Propagates the storage error; without run metadata the run cannot be
    /// tracked and should not start.
    pub async fn initialize_operation(&self, run_type: RunType) -> Result<i64, ScraperError> {
        let metadata = self.store.create_run(run_type).await?;
        let run_id = metadata.id;
        info!(run_id, run_type = run_type.as_str(), "scrape run started");
        *lock(&self.operation) = Some(metadata);
        Ok(run_id)
    }

    /// Flushes final counters and transitions the active run to `completed`.
    /// A missing active run is logged and ignored, so double completion (or
    /// completion after `fail_operation`) is harmless.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the terminal transition itself.
    pub async fn complete_operation(&self) -> Result<(), ScraperError> {
        let Some(run_id) = self.active_run_id() else {
            warn!("complete_operation called with no active run");
            return Ok(());
        };

        self.flush_run_counters().await;
        self.store.complete_run(run_id).await?;
        self.detach_run(RunStatus::Completed);
        let counters = *lock(&self.counters);
        info!(
            run_id,
            brands = counters.brands_processed,
            products = counters.products_processed,
            duplicates = counters.duplicates_skipped,
            failed = counters.failed,
            "scrape run completed"
        );
        Ok(())
    }

    /// Flushes final counters and transitions the active run to `failed`
    /// with a reason. Missing active run is logged and ignored.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the terminal transition itself.
    pub async fn fail_operation(&self, reason: &str) -> Result<(), ScraperError> {
        let Some(run_id) = self.active_run_id() else {
            warn!(reason, "fail_operation called with no active run");
            return Ok(());
        };

        self.flush_run_counters().await;
        self.store.fail_run(run_id, reason).await?;
        self.detach_run(RunStatus::Failed);
        warn!(run_id, reason, "scrape run failed");
        Ok(())
    }

    fn active_run_id(&self) -> Option<i64> {
        lock(&self.operation).as_ref().map(|op| op.id)
    }

    /// Detaches the active run after its terminal transition landed.
    fn detach_run(&self, status: RunStatus) {
        let mut guard = lock(&self.operation);
        if let Some(metadata) = guard.as_mut() {
            metadata.status = status;
            metadata.completed_at = Some(Utc::now());
        }
        guard.take();
    }

    /// Current progress, derived from the counters.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let counters = *lock(&self.counters);
        let total_discovered = counters.brands_discovered + counters.products_discovered;
        let total_processed = counters.brands_processed + counters.products_processed;
        let percentage = if total_discovered == 0 {
            0.0
        } else {
            // Catalog sizes are thousands, far below f64's integer range.
            #[allow(clippy::cast_precision_loss)]
            let pct = (total_processed as f64 / total_discovered as f64) * 100.0;
            pct.min(100.0)
        };
        Progress {
            iteration: counters.iteration,
            total_discovered,
            total_processed,
            total_failed: counters.failed,
            percentage,
        }
    }

    /// Counter snapshot plus detector and queue sizes.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let counters = *lock(&self.counters);
        let detector = lock(&self.detector);
        Statistics {
            counters,
            known_brands: detector.brand_count(),
            known_products: detector.product_count(),
            detector_total: detector.total_count(),
            brand_jobs: lock(&self.brand_jobs).len(),
            product_jobs: lock(&self.product_jobs).len(),
        }
    }

    /// Emits a one-line progress summary at info level.
    pub fn log_progress(&self) {
        let progress = self.progress();
        info!(
            iteration = progress.iteration,
            discovered = progress.total_discovered,
            processed = progress.total_processed,
            failed = progress.total_failed,
            percent = format!("{:.1}", progress.percentage),
            "scrape progress"
        );
    }

    /// Builds a checkpoint snapshot of the current run state.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            operation_id: lock(&self.operation).as_ref().map(|op| op.id),
            counters: *lock(&self.counters),
            cursors: lock(&self.cursors).clone(),
            captured_at: Utc::now(),
        }
    }

    /// Registers the callback invoked at each checkpoint interval.
    pub fn set_checkpoint_hook(&self, hook: CheckpointHook) {
        *lock(&self.checkpoint_hook) = Some(hook);
    }

    /// Snapshots state and hands it to the registered hook, if any. Always
    /// logs progress so long runs leave a trail even without a hook.
    pub(crate) fn emit_checkpoint(&self) {
        self.log_progress();
        let hook = lock(&self.checkpoint_hook).clone();
        if let Some(hook) = hook {
            hook(self.checkpoint());
        }
    }

    /// Returns the engine to a pristine state: counters, detector, queues,
    /// cursors, and run metadata cleared, cancellation re-armed. The
    /// checkpoint hook survives a reset.
    pub fn reset(&self) {
        *lock(&self.counters) = ScrapeCounters::default();
        *lock(&self.detector) = DuplicateDetector::new();
        *lock(&self.brand_jobs) = JobQueue::new("brand");
        *lock(&self.product_jobs) = JobQueue::new("product");
        *lock(&self.cursors) = HashMap::new();
        *lock(&self.operation) = None;
        *lock(&self.cancel) = CancellationToken::new();
        info!("engine state reset");
    }
}
