use clap::Parser;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["htdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["htdb-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["htdb-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_scrape_full_defaults() {
    let cli = Cli::try_parse_from(["htdb-cli", "scrape", "full"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            command: ScrapeCommands::Full {
                incremental: false,
                dry_run: false
            }
        })
    ));
}

#[test]
fn parses_scrape_full_incremental_dry_run() {
    let cli =
        Cli::try_parse_from(["htdb-cli", "scrape", "full", "--incremental", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            command: ScrapeCommands::Full {
                incremental: true,
                dry_run: true
            }
        })
    ));
}

#[test]
fn parses_scrape_products_with_brand() {
    let cli = Cli::try_parse_from(["htdb-cli", "scrape", "products", "--brand", "al-fakher"])
        .unwrap();
    match cli.command {
        Some(Commands::Scrape {
            command: ScrapeCommands::Products { brand, dry_run },
        }) => {
            assert_eq!(brand, "al-fakher");
            assert!(!dry_run);
        }
        other => panic!("expected scrape products, got: {other:?}"),
    }
}

#[test]
fn scrape_products_requires_brand() {
    let result = Cli::try_parse_from(["htdb-cli", "scrape", "products"]);
    assert!(result.is_err(), "--brand should be required");
}

#[test]
fn parses_runs_list_with_limit() {
    let cli = Cli::try_parse_from(["htdb-cli", "runs", "list", "--limit", "5"]).unwrap();
    match cli.command {
        Some(Commands::Runs {
            command: RunsCommands::List { limit },
        }) => assert_eq!(limit, 5),
        other => panic!("expected runs list, got: {other:?}"),
    }
}

#[test]
fn runs_list_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["htdb-cli", "runs", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Runs {
            command: RunsCommands::List { limit: 20 }
        })
    ));
}
