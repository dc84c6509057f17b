//! Scraping orchestration engine.
//!
//! One `ScraperEngine` owns the duplicate detector, job queues, counters,
//! and pagination cursors for the lifetime of a process; `reset()` detaches
//! and replaces them so the same instance can serve independent runs.
//! Collaborators (fetch, parse, storage) come in as trait objects built by
//! the caller — there is no ambient/global state.
//!
//! Discovery, extraction, queue execution, and operation tracking live in
//! sibling modules as `impl` blocks on the engine.

mod discovery;
mod extract;
mod queue_exec;
mod tracker;


use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use htdb_core::{AppConfig, CatalogStore, OperationMetadata, RunType};

use crate::dedup::DuplicateDetector;
use crate::error::ScraperError;
use crate::fetch::Fetcher;
use crate::pagination::PageCursor;
use crate::parse::CatalogParser;
use crate::queue::JobQueue;
use crate::retry::RetryPolicy;

/// Engine knobs, usually derived from [`AppConfig`]. Defaults are fully
/// sequential (batch width 1) to respect the site's implicit rate limits.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub page_size: u64,
    pub inter_request_delay_ms: u64,
    pub max_concurrent_brands: usize,
    pub max_concurrent_products: usize,
    /// A checkpoint snapshot is emitted every this many discovery iterations.
    pub checkpoint_interval: u64,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://htreviews.org".to_string(),
            page_size: 25,
            inter_request_delay_ms: 0,
            max_concurrent_brands: 1,
            max_concurrent_products: 1,
            checkpoint_interval: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            page_size: u64::from(config.scraper_page_size),
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
            max_concurrent_brands: config.scraper_max_concurrent_brands,
            max_concurrent_products: config.scraper_max_concurrent_products,
            checkpoint_interval: config.scraper_checkpoint_interval,
            retry: RetryPolicy::from_config(
                config.scraper_job_max_retries,
                config.scraper_job_retry_delay_ms,
            ),
        }
    }
}

/// Running counters for one scraping run.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct ScrapeCounters {
    /// Discovery iterations (listing pages processed) so far.
    pub iteration: u64,
    pub brands_discovered: u64,
    pub products_discovered: u64,
    pub brands_processed: u64,
    pub products_processed: u64,
    pub duplicates_skipped: u64,
    pub failed: u64,
}

/// Derived, read-only progress snapshot; recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub iteration: u64,
    pub total_discovered: u64,
    pub total_processed: u64,
    pub total_failed: u64,
    /// `processed / discovered * 100`, `0.0` when nothing is discovered yet.
    pub percentage: f64,
}

/// Counter snapshot plus detector and queue sizes, for end-of-run reporting.
#[derive(Debug, Clone, Copy)]
pub struct Statistics {
    pub counters: ScrapeCounters,
    pub known_brands: usize,
    pub known_products: usize,
    pub detector_total: usize,
    pub brand_jobs: usize,
    pub product_jobs: usize,
}

/// Serializable snapshot from which a crashed run could resume: iteration
/// counters plus the last pagination cursor per listing endpoint.
/// Persistence of the snapshot is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub operation_id: Option<i64>,
    pub counters: ScrapeCounters,
    pub cursors: HashMap<String, PageCursor>,
    pub captured_at: DateTime<Utc>,
}

/// Callback invoked with each checkpoint snapshot.
pub type CheckpointHook = Arc<dyn Fn(Checkpoint) + Send + Sync>;

/// Payload of a queued brand-extraction job.
#[derive(Debug, Clone)]
pub struct BrandJob {
    pub slug: String,
}

/// Payload of a queued product-extraction job.
#[derive(Debug, Clone)]
pub struct ProductJob {
    pub slug: String,
    pub brand_slug: String,
}

/// Outcome of one extraction pipeline pass.
#[derive(Debug, Clone)]
pub enum ExtractOutcome<T> {
    /// Record made it through the full pipeline and was persisted.
    Persisted(T),
    /// Already seen this run; skipped before any persistence call.
    Duplicate,
}

pub struct ScraperEngine {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) parser: Arc<dyn CatalogParser>,
    pub(crate) store: Arc<dyn CatalogStore>,
    pub(crate) config: EngineConfig,

    pub(crate) detector: Mutex<DuplicateDetector>,
    pub(crate) brand_jobs: Mutex<JobQueue<BrandJob>>,
    pub(crate) product_jobs: Mutex<JobQueue<ProductJob>>,
    pub(crate) counters: Mutex<ScrapeCounters>,
    pub(crate) cursors: Mutex<HashMap<String, PageCursor>>,
    pub(crate) operation: Mutex<Option<OperationMetadata>>,
    pub(crate) checkpoint_hook: Mutex<Option<CheckpointHook>>,
    pub(crate) cancel: Mutex<CancellationToken>,
}

impl ScraperEngine {
    /// Builds an engine owning fresh state. Collaborators are shared
    /// handles; everything mutable is exclusive to this instance.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn CatalogParser>,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            store,
            config,
            detector: Mutex::new(DuplicateDetector::new()),
            brand_jobs: Mutex::new(JobQueue::new("brand")),
            product_jobs: Mutex::new(JobQueue::new("product")),
            counters: Mutex::new(ScrapeCounters::default()),
            cursors: Mutex::new(HashMap::new()),
            operation: Mutex::new(None),
            checkpoint_hook: Mutex::new(None),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Requests cooperative cancellation; discovery and batch loops stop at
    /// the next iteration/wave boundary.
    pub fn cancel(&self) {
        lock(&self.cancel).cancel();
    }

    /// Token handle for wiring the engine into an external shutdown path.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        lock(&self.cancel).clone()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        lock(&self.cancel).is_cancelled()
    }

    /// Runs the whole catalog end to end: discover brands, extract them,
    /// then — per successfully extracted brand — discover and extract its
    /// products. Metadata lifecycle bookends the run.
    ///
    /// # Errors
    ///
    /// Propagates failures that leave no meaningful partial result: run
    /// initialization and a first-page brand discovery failure. Per-item
    /// and per-brand failures are contained and show up in the statistics.
    pub async fn run_full_catalog(&self, run_type: RunType) -> Result<Statistics, ScraperError> {
        self.initialize_operation(run_type).await?;

        match self.run_phases().await {
            Ok(()) => {
                self.complete_operation().await?;
                Ok(self.statistics())
            }
            Err(e) => {
                if let Err(fail_err) = self.fail_operation(&e.to_string()).await {
                    tracing::error!(error = %fail_err, "failed to mark run as failed");
                }
                Err(e)
            }
        }
    }

    async fn run_phases(&self) -> Result<(), ScraperError> {
        let brand_items = self.discover_brands().await?;
        for item in &brand_items {
            if let Some(slug) = item_slug(item) {
                self.queue_brand(&slug);
            } else {
                tracing::warn!(name = %item.name, url = %item.url, "skipping listing item with no derivable slug");
            }
        }
        self.process_brand_queue().await;

        // Products per brand, only for brands that actually made it into
        // storage this run. Sequential macro-phases: a brand's products are
        // discovered after the brand itself has been extracted.
        let extracted: Vec<String> = {
            let queue = lock(&self.brand_jobs);
            queue
                .jobs()
                .iter()
                .filter(|j| j.status == crate::queue::JobStatus::Completed)
                .map(|j| j.payload.slug.clone())
                .collect()
        };

        for brand_slug in extracted {
            if self.is_cancelled() {
                tracing::warn!("cancellation requested — stopping before next brand");
                break;
            }
            let products = match self.discover_products(&brand_slug).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        brand = %brand_slug,
                        error = %e,
                        "product discovery failed — continuing with next brand"
                    );
                    lock(&self.counters).failed += 1;
                    continue;
                }
            };
            for item in &products {
                if let Some(slug) = item_slug(item) {
                    self.queue_product(&slug, &brand_slug);
                }
            }
            self.process_product_queue().await;
        }

        Ok(())
    }
}

/// Derives a job slug from a listing item: URL path segment first, slugified
/// name as fallback.
pub(crate) fn item_slug(item: &crate::types::ListingItem) -> Option<String> {
    if let Some(slug) = htdb_core::slug_from_url(&item.url) {
        return Some(slug);
    }
    // Listing URLs are usually relative; lean on the path directly.
    let path = item
        .url
        .split(['?', '#'])
        .next()
        .unwrap_or("");
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");
    let from_path = htdb_core::slugify(segment);
    if !from_path.is_empty() {
        return Some(from_path);
    }
    let from_name = htdb_core::slugify(&item.name);
    if from_name.is_empty() {
        None
    } else {
        Some(from_name)
    }
}

/// Poison-recovering lock helper: detector/counter state stays usable even
/// if a prior panic poisoned the mutex.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
