//! Fetch collaborator seam.

use async_trait::async_trait;

use crate::error::ScraperError;

/// Fetches raw page content for the engine.
///
/// All failure is reported as data through the `Result`; implementations
/// must not panic on network conditions. The engine treats a fetch error as
/// a per-iteration or per-item failure boundary, never as a crash.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}
