//! In-memory job records for queued extraction work.
//!
//! The queue is plain ordered storage plus status bookkeeping; batch
//! execution and retry scheduling live in the engine, which drives these
//! transitions. Lifecycle: `Queued → Processing → Completed`, or
//! `Processing → Queued` (retry, bounded) and finally `Failed` once
//! attempts are exhausted.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Job<T> {
    pub id: String,
    pub payload: T,
    pub status: JobStatus,
    pub retry_count: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Ordered collection of jobs for one category of work.
#[derive(Debug)]
pub struct JobQueue<T> {
    category: &'static str,
    jobs: Vec<Job<T>>,
}

impl<T> JobQueue<T> {
    #[must_use]
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            jobs: Vec::new(),
        }
    }

    /// Appends a queued job and returns its id. Ids combine the category,
    /// the payload's natural key, a timestamp, and a process-wide sequence
    /// number so re-queuing the same key never collides.
    pub fn push(&mut self, natural_key: &str, payload: T) -> String {
        let seq = JOB_SEQ.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{}:{}:{}:{}",
            self.category,
            natural_key,
            Utc::now().timestamp_millis(),
            seq
        );
        self.jobs.push(Job {
            id: id.clone(),
            payload,
            status: JobStatus::Queued,
            retry_count: 0,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        });
        id
    }

    /// Ids of all jobs currently in `Queued` status, in insertion order.
    #[must_use]
    pub fn queued_ids(&self) -> Vec<String> {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Queued)
            .map(|j| j.id.clone())
            .collect()
    }

    pub fn mark_processing(&mut self, id: &str) {
        if let Some(job) = self.find_mut(id) {
            job.status = JobStatus::Processing;
        }
    }

    /// Failed attempt with retries remaining: bump the retry count, stash
    /// the error, and put the job back in `Queued`.
    pub fn mark_requeued(&mut self, id: &str, error: &str) {
        if let Some(job) = self.find_mut(id) {
            job.retry_count += 1;
            job.error = Some(error.to_owned());
            job.status = JobStatus::Queued;
        }
    }

    pub fn mark_completed(&mut self, id: &str) {
        if let Some(job) = self.find_mut(id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(Utc::now());
        }
    }

    /// Terminal failure after retry exhaustion.
    pub fn mark_failed(&mut self, id: &str, error: &str) {
        if let Some(job) = self.find_mut(id) {
            job.retry_count += 1;
            job.status = JobStatus::Failed;
            job.error = Some(error.to_owned());
            job.completed_at = Some(Utc::now());
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Job<T>> {
        self.jobs.iter().find(|j| j.id == id)
    }

    #[must_use]
    pub fn payload(&self, id: &str) -> Option<&T> {
        self.get(id).map(|j| &j.payload)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[must_use]
    pub fn count_with_status(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    #[must_use]
    pub fn jobs(&self) -> &[Job<T>] {
        &self.jobs
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Job<T>> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_creates_queued_job_with_unique_id() {
        let mut queue: JobQueue<String> = JobQueue::new("brand");
        let a = queue.push("al-fakher", "al-fakher".to_string());
        let b = queue.push("al-fakher", "al-fakher".to_string());
        assert_ne!(a, b, "same natural key must still get distinct job ids");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.count_with_status(JobStatus::Queued), 2);
        assert!(a.starts_with("brand:al-fakher:"));
    }

    #[test]
    fn queued_ids_preserve_insertion_order() {
        let mut queue: JobQueue<u32> = JobQueue::new("brand");
        let a = queue.push("a", 1);
        let b = queue.push("b", 2);
        let c = queue.push("c", 3);
        queue.mark_processing(&b);
        assert_eq!(queue.queued_ids(), vec![a, c]);
    }

    #[test]
    fn requeue_bumps_retry_count_and_restores_queued() {
        let mut queue: JobQueue<u32> = JobQueue::new("product");
        let id = queue.push("mint", 1);
        queue.mark_processing(&id);
        queue.mark_requeued(&id, "fetch timed out");
        let job = queue.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.retry_count, 1);
        assert_eq!(job.error.as_deref(), Some("fetch timed out"));
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn completed_jobs_get_a_completion_timestamp() {
        let mut queue: JobQueue<u32> = JobQueue::new("brand");
        let id = queue.push("a", 1);
        queue.mark_completed(&id);
        let job = queue.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn failed_jobs_keep_last_error() {
        let mut queue: JobQueue<u32> = JobQueue::new("brand");
        let id = queue.push("a", 1);
        queue.mark_requeued(&id, "first");
        queue.mark_failed(&id, "second");
        let job = queue.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retry_count, 2);
        assert_eq!(job.error.as_deref(), Some("second"));
    }

    #[test]
    fn clear_empties_the_queue() {
        let mut queue: JobQueue<u32> = JobQueue::new("brand");
        queue.push("a", 1);
        queue.clear();
        assert!(queue.is_empty());
    }
}
