//! qna-harvest main entry point
//!
//! This is the command-line interface for the question-and-answer harvester.

use anyhow::Context;
use clap::Parser;
use qna_harvest::config::{load_config_with_hash, Config};
use qna_harvest::crawler::{Coordinator, HttpFetcher};
use qna_harvest::output::{print_statistics, write_json_document};
use qna_harvest::HarvestError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// qna-harvest: a question-and-answer harvester
///
/// Walks every page of a paginated listing site, visits each question's
/// detail page, and writes the questions, answers and sources as JSON.
#[derive(Parser, Debug)]
#[command(name = "qna-harvest")]
#[command(version)]
#[command(about = "Harvests question-and-answer records from a listing site", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the JSON document here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Visit at most this many listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Fetch listing page 1, show the page plan, and exit without harvesting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context(format!("loading {}", cli.config.display()));
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(output) = &cli.output {
        config.output.json_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config).await?;
    } else {
        handle_harvest(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("qna_harvest=info,warn"),
            1 => EnvFilter::new("qna_harvest=debug,info"),
            2 => EnvFilter::new("qna_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the pages a harvest would visit
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)
        .map_err(HarvestError::from)?;
    let coordinator = Coordinator::new(config, fetcher)?;
    let plan = coordinator.preview_plan().await?;

    println!("=== qna-harvest Dry Run ===\n");
    println!("Category: {}", config.site.category_label);
    println!("User agent: {}", config.user_agent.header_value());
    println!("Output: {}", config.output.json_path);
    println!("\nListing pages ({}):", plan.total_pages());

    let limit = match config.crawler.max_pages {
        0 => plan.total_pages(),
        n => n.min(plan.total_pages()),
    };
    for (index, url) in plan.pages().take(limit as usize) {
        match url {
            Ok(url) => println!("  {:>4}  {}", index, url),
            Err(e) => println!("  {:>4}  (skipped: {})", index, e),
        }
    }
    if limit < plan.total_pages() {
        println!("  ... {} more not visited (max-pages)", plan.total_pages() - limit);
    }

    Ok(())
}

/// Handles the main harvest and writes the output document
async fn handle_harvest(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting '{}' from {} (config {})",
        config.site.category_label,
        config.site.listing_url,
        &config_hash[..config_hash.len().min(12)]
    );

    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)
        .map_err(HarvestError::from)?;

    let outcome = match Coordinator::new(config, fetcher)?.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    let output_path = Path::new(&config.output.json_path);
    if let Err(e) = write_json_document(&outcome.records, &config.site.category_label, output_path)
    {
        let e = HarvestError::from(e);
        tracing::error!("{}", e);
        return Err(e.into());
    }

    print_statistics(&outcome.stats);
    Ok(())
}
