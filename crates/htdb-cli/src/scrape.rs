//! Scrape command handlers.
//!
//! These are called from `main` after the database pool and config are
//! established. Per-item failures are contained inside the engine; the
//! handlers only decide run scope, wire Ctrl-C into cooperative
//! cancellation, and report the final statistics.

use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use sqlx::PgPool;

use htdb_core::{AppConfig, RunType};
use htdb_db::PgCatalogStore;
use htdb_scraper::{
    EngineConfig, HttpFetcher, JsonCatalogParser, ScraperEngine, Statistics,
};

/// Sub-commands available under `scrape`.
#[derive(Debug, Subcommand)]
pub enum ScrapeCommands {
    /// Scrape the full catalog: all brands, then each brand's products
    Full {
        /// Crawl for additions only; records already seen this run are
        /// skipped before persistence
        #[arg(long)]
        incremental: bool,

        /// Preview what would be scraped without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Discover and extract brands only
    Brands {
        /// Preview what would be scraped without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Discover and extract one brand's products
    Products {
        /// Brand slug whose products to scrape
        #[arg(long)]
        brand: String,

        /// Preview what would be scraped without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run(
    command: ScrapeCommands,
    pool: &PgPool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    match command {
        ScrapeCommands::Full {
            incremental,
            dry_run,
        } => run_full(pool, config, run_type_for(incremental), dry_run).await,
        ScrapeCommands::Brands { dry_run } => run_brands(pool, config, dry_run).await,
        ScrapeCommands::Products { brand, dry_run } => {
            run_products(pool, config, &brand, dry_run).await
        }
    }
}

fn run_type_for(incremental: bool) -> RunType {
    if incremental {
        RunType::IncrementalUpdate
    } else {
        RunType::FullRefresh
    }
}

fn build_engine(pool: &PgPool, config: &AppConfig) -> anyhow::Result<ScraperEngine> {
    let fetcher = HttpFetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_http_max_retries,
        config.scraper_http_backoff_base_secs,
    )
    .context("failed to build HTTP client")?;

    Ok(ScraperEngine::new(
        EngineConfig::from_app(config),
        Arc::new(fetcher),
        Arc::new(JsonCatalogParser),
        Arc::new(PgCatalogStore::new(pool.clone())),
    ))
}

/// Cancels the engine on Ctrl-C; the run then stops at the next wave or
/// iteration boundary instead of mid-write.
fn wire_interrupt(engine: &ScraperEngine) {
    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received — finishing the current batch, then stopping");
            cancel.cancel();
        }
    });
}

async fn run_full(
    pool: &PgPool,
    config: &AppConfig,
    run_type: RunType,
    dry_run: bool,
) -> anyhow::Result<()> {
    let engine = build_engine(pool, config)?;

    if dry_run {
        let brands = engine.discover_brands().await?;
        let names: Vec<&str> = brands.iter().map(|b| b.name.as_str()).collect();
        println!(
            "dry-run: would scrape {} brands and their products: [{}]",
            brands.len(),
            names.join(", ")
        );
        return Ok(());
    }

    wire_interrupt(&engine);
    let stats = engine.run_full_catalog(run_type).await?;
    print_statistics(&stats);
    Ok(())
}

async fn run_brands(pool: &PgPool, config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let engine = build_engine(pool, config)?;

    let brands = engine.discover_brands().await?;
    if dry_run {
        let names: Vec<&str> = brands.iter().map(|b| b.name.as_str()).collect();
        println!(
            "dry-run: would extract {} brands: [{}]",
            brands.len(),
            names.join(", ")
        );
        return Ok(());
    }
    if brands.is_empty() {
        println!("no brands discovered; skipping run creation");
        return Ok(());
    }

    wire_interrupt(&engine);
    engine.initialize_operation(RunType::IncrementalUpdate).await?;
    for item in &brands {
        if let Some(slug) = htdb_core::slug_from_url(&item.url)
            .or_else(|| non_empty(htdb_core::slugify(&item.name)))
        {
            engine.queue_brand(&slug);
        }
    }
    let completed = engine.process_brand_queue().await;
    if let Err(e) = engine.complete_operation().await {
        fail_operation_best_effort(&engine, &format!("{e:#}")).await;
        return Err(e.into());
    }

    println!("extracted {completed} of {} discovered brands", brands.len());
    print_statistics(&engine.statistics());
    Ok(())
}

async fn run_products(
    pool: &PgPool,
    config: &AppConfig,
    brand_slug: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    // The parent brand must already be stored or every product insert would
    // fail its parent lookup.
    let brand = htdb_db::get_brand_by_slug(pool, brand_slug)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!("brand '{brand_slug}' not found; run `scrape brands` first")
        })?;

    let engine = build_engine(pool, config)?;
    let products = engine.discover_products(&brand.slug).await?;
    if dry_run {
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        println!(
            "dry-run: would extract {} products for '{}': [{}]",
            products.len(),
            brand.slug,
            names.join(", ")
        );
        return Ok(());
    }
    if products.is_empty() {
        println!("no products discovered for '{}'; skipping run creation", brand.slug);
        return Ok(());
    }

    wire_interrupt(&engine);
    engine.initialize_operation(RunType::IncrementalUpdate).await?;
    for item in &products {
        if let Some(slug) = htdb_core::slug_from_url(&item.url)
            .or_else(|| non_empty(htdb_core::slugify(&item.name)))
        {
            engine.queue_product(&slug, &brand.slug);
        }
    }
    let completed = engine.process_product_queue().await;
    if let Err(e) = engine.complete_operation().await {
        fail_operation_best_effort(&engine, &format!("{e:#}")).await;
        return Err(e.into());
    }

    println!(
        "extracted {completed} of {} discovered products for '{}'",
        products.len(),
        brand.slug
    );
    print_statistics(&engine.statistics());
    Ok(())
}

/// Marks the run failed, logging rather than propagating so the original
/// error stays the one reported to the user.
async fn fail_operation_best_effort(engine: &ScraperEngine, message: &str) {
    if let Err(e) = engine.fail_operation(message).await {
        tracing::error!(error = %e, "additionally failed to mark the run as failed");
    }
}

fn print_statistics(stats: &Statistics) {
    let c = &stats.counters;
    println!(
        "processed {} brands and {} products ({} duplicates skipped, {} failures) \
         across {} listing pages",
        c.brands_processed, c.products_processed, c.duplicates_skipped, c.failed, c.iteration
    );
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
