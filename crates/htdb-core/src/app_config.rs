#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,

    /// Root URL of the review site being crawled.
    pub base_url: String,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Page size requested from listing endpoints.
    pub scraper_page_size: u32,
    /// Delay between listing page requests within one discovery call.
    pub scraper_inter_request_delay_ms: u64,
    /// HTTP-level retries on transient errors (429, network), on top of the
    /// job-level retry below.
    pub scraper_http_max_retries: u32,
    pub scraper_http_backoff_base_secs: u64,

    /// Batch width for brand extraction jobs; 1 = fully sequential.
    pub scraper_max_concurrent_brands: usize,
    /// Batch width for product extraction jobs; 1 = fully sequential.
    pub scraper_max_concurrent_products: usize,
    /// A checkpoint snapshot is emitted every this many discovery iterations.
    pub scraper_checkpoint_interval: u64,
    /// Total attempts per queued extraction job before it is marked failed.
    pub scraper_job_max_retries: u32,
    /// Delay between job retry attempts; 0 keeps the original immediate-retry
    /// behavior.
    pub scraper_job_retry_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("base_url", &self.base_url)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_page_size", &self.scraper_page_size)
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("scraper_http_max_retries", &self.scraper_http_max_retries)
            .field(
                "scraper_http_backoff_base_secs",
                &self.scraper_http_backoff_base_secs,
            )
            .field(
                "scraper_max_concurrent_brands",
                &self.scraper_max_concurrent_brands,
            )
            .field(
                "scraper_max_concurrent_products",
                &self.scraper_max_concurrent_products,
            )
            .field(
                "scraper_checkpoint_interval",
                &self.scraper_checkpoint_interval,
            )
            .field("scraper_job_max_retries", &self.scraper_job_max_retries)
            .field(
                "scraper_job_retry_delay_ms",
                &self.scraper_job_retry_delay_ms,
            )
            .finish()
    }
}
