pub mod client;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pagination;
pub mod parse;
pub mod queue;
pub mod retry;
pub mod types;

pub use client::HttpFetcher;
pub use dedup::DuplicateDetector;
pub use engine::{Checkpoint, EngineConfig, ExtractOutcome, Progress, ScraperEngine, Statistics};
pub use error::ScraperError;
pub use fetch::Fetcher;
pub use parse::{CatalogParser, JsonCatalogParser, ListingPage};
pub use pagination::PageCursor;
pub use queue::{Job, JobStatus};
pub use retry::{Backoff, RetryPolicy};
pub use types::ListingItem;
