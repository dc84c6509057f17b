//! Queue draining in bounded batch waves.
//!
//! Jobs run in waves of at most `max_concurrent_*` futures joined together;
//! the next wave starts only when the whole previous wave has settled, so
//! the concurrency bound holds as a hard high-water mark. Each job gets up
//! to `retry.max_attempts` total attempts before it is marked failed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::engine::{lock, BrandJob, ProductJob, ScraperEngine};
use crate::error::ScraperError;
use crate::queue::JobQueue;

type JobFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ScraperError>> + 'a>>;

impl ScraperEngine {
    /// Enqueues a brand-extraction job; returns the job id.
    pub fn queue_brand(&self, slug: &str) -> String {
        lock(&self.brand_jobs).push(
            slug,
            BrandJob {
                slug: slug.to_string(),
            },
        )
    }

    /// Enqueues a product-extraction job; returns the job id.
    pub fn queue_product(&self, slug: &str, brand_slug: &str) -> String {
        let key = format!("{brand_slug}/{slug}");
        lock(&self.product_jobs).push(
            &key,
            ProductJob {
                slug: slug.to_string(),
                brand_slug: brand_slug.to_string(),
            },
        )
    }

    /// Drains all queued brand jobs; returns how many completed.
    pub async fn process_brand_queue(&self) -> usize {
        let completed = self
            .drain_queue(
                &self.brand_jobs,
                self.config.max_concurrent_brands,
                |engine, job: BrandJob| {
                    Box::pin(async move { engine.extract_brand_data(&job.slug).await.map(|_| ()) })
                },
            )
            .await;
        info!(completed, "brand queue drained");
        completed
    }

    /// Drains all queued product jobs; returns how many completed.
    pub async fn process_product_queue(&self) -> usize {
        let completed = self
            .drain_queue(
                &self.product_jobs,
                self.config.max_concurrent_products,
                |engine, job: ProductJob| {
                    Box::pin(async move {
                        engine
                            .extract_product_data(&job.slug, &job.brand_slug)
                            .await
                            .map(|_| ())
                    })
                },
            )
            .await;
        info!(completed, "product queue drained");
        completed
    }

    async fn drain_queue<T, F>(
        &self,
        queue: &Mutex<JobQueue<T>>,
        max_concurrent: usize,
        run: F,
    ) -> usize
    where
        T: Clone,
        F: for<'a> Fn(&'a Self, T) -> JobFuture<'a>,
    {
        let queued = lock(queue).queued_ids();
        if queued.is_empty() {
            return 0;
        }
        debug!(jobs = queued.len(), max_concurrent, "draining queue");

        let mut completed = 0;
        for wave in queued.chunks(max_concurrent.max(1)) {
            if self.is_cancelled() {
                warn!("cancellation requested — leaving remaining jobs queued");
                break;
            }

            let wave_jobs: Vec<(String, T)> = {
                let mut guard = lock(queue);
                wave.iter()
                    .filter_map(|id| {
                        let payload = guard.payload(id).cloned()?;
                        guard.mark_processing(id);
                        Some((id.clone(), payload))
                    })
                    .collect()
            };

            let run = &run;
            let futures = wave_jobs.into_iter().map(|(id, payload)| async move {
                let result = self.run_with_retries(queue, &id, payload, run).await;
                (id, result)
            });
            let results = join_all(futures).await;

            let mut guard = lock(queue);
            for (id, result) in results {
                match result {
                    Ok(()) => {
                        guard.mark_completed(&id);
                        completed += 1;
                    }
                    Err(e) => {
                        warn!(job_id = %id, error = %e, "job exhausted its attempts");
                        guard.mark_failed(&id, &e.to_string());
                    }
                }
            }
        }
        completed
    }

    async fn run_with_retries<T, F>(
        &self,
        queue: &Mutex<JobQueue<T>>,
        id: &str,
        payload: T,
        run: &F,
    ) -> Result<(), ScraperError>
    where
        T: Clone,
        F: for<'a> Fn(&'a Self, T) -> JobFuture<'a>,
    {
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match run(self, payload.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt >= max_attempts {
                        return Err(e);
                    }
                    debug!(job_id = %id, attempt, max_attempts, error = %e, "job attempt failed — requeueing");
                    lock(queue).mark_requeued(id, &e.to_string());
                    let delay = self.config.retry.backoff.delay(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    lock(queue).mark_processing(id);
                }
            }
        }
    }
}
