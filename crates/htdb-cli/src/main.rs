use clap::{Parser, Subcommand};

mod scrape;

#[cfg(test)]
mod tests;

use scrape::ScrapeCommands;

#[derive(Debug, Parser)]
#[command(name = "htdb-cli")]
#[command(about = "Hookah tobacco database command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the review site catalog into the database
    Scrape {
        #[command(subcommand)]
        command: ScrapeCommands,
    },
    /// Inspect scrape runs
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum RunsCommands {
    /// List recent scrape runs, newest first
    List {
        /// Maximum number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("htdb-cli: run with --help to list commands");
        return Ok(());
    };

    let config = htdb_core::load_app_config()?;
    let pool_config = htdb_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = htdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Scrape { command } => scrape::run(command, &pool, &config).await,
        Commands::Runs {
            command: RunsCommands::List { limit },
        } => list_runs(&pool, limit).await,
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            htdb_db::health_check(&pool).await?;
            println!("database connection ok");
            Ok(())
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = htdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
    }
}

async fn list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = htdb_db::list_scrape_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no scrape runs recorded");
        return Ok(());
    }

    println!(
        "{:>5}  {:<19}  {:<11}  {:>6}  {:>8}  {:>6}  {}",
        "id", "run_type", "status", "brands", "products", "errors", "started_at"
    );
    for run in runs {
        println!(
            "{:>5}  {:<19}  {:<11}  {:>6}  {:>8}  {:>6}  {}",
            run.id,
            run.run_type,
            run.status,
            run.brands_processed,
            run.products_processed,
            run.error_count,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
        );
        if let Some(message) = run.error_message {
            println!("       error: {message}");
        }
    }
    Ok(())
}
