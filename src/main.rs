//! job-harvest main entry point
//!
//! This is the command-line interface for the job-board harvester and
//! filing exporter.

use anyhow::Context;
use clap::Parser;
use job_harvest::config::{load_config_with_hash, Config};
use job_harvest::output::print_summary;
use job_harvest::page::{HttpPageSource, PageSource};
use job_harvest::pipeline::{run_harvest, RunOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// job-harvest: job posting scraper and filing exporter
///
/// Collects postings matching a title keyword from LinkedIn and Indeed
/// search pages into one JSON document per source, and exports submission
/// and compensation data for a list of companies.
#[derive(Parser, Debug)]
#[command(name = "job-harvest")]
#[command(version)]
#[command(about = "Job posting scraper and filing exporter", long_about = None)]
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

    /// Ignore checkpoints left by an interrupted run
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with_all = ["jobs_only", "filings_only"])]
    dry_run: bool,

    /// Run the job sources only
    #[arg(long, conflicts_with_all = ["dry_run", "filings_only"])]
    jobs_only: bool,

    /// Run the filing fetcher only
    #[arg(long, conflicts_with_all = ["dry_run", "jobs_only"])]
    filings_only: bool,

    /// Harvest only the named source (repeatable)
    #[arg(long = "source", value_name = "NAME")]
    sources: Vec<String>,

    /// Render pages in headless Chrome
    #[cfg(feature = "browser")]
    #[arg(long)]
    browser: bool,

    /// Show the browser window (with --browser)
    #[cfg(feature = "browser")]
    #[arg(long, requires = "browser")]
    headful: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let options = RunOptions {
        fresh: cli.fresh,
        jobs: !cli.filings_only,
        filings: !cli.jobs_only,
        only_sources: cli.sources.clone(),
    };

    #[cfg(feature = "browser")]
    if cli.browser {
        let pages = job_harvest::page::ChromePageSource::launch(!cli.headful)
            .context("Failed to launch headless Chrome")?;
        return handle_harvest(&config, &config_hash, Arc::new(pages), &options).await;
    }

    let pages = HttpPageSource::from_config(&config.user_agent)
        .context("Failed to build HTTP client")?;
    handle_harvest(&config, &config_hash, Arc::new(pages), &options).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_harvest=info,warn"),
            1 => EnvFilter::new("job_harvest=debug,info"),
            2 => EnvFilter::new("job_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== job-harvest Dry Run ===\n");

    println!("User Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput directory: {}", config.output.directory);

    println!("\nJob Sources ({}):", config.sources.len());
    for source in &config.sources {
        let filter = source
            .keyword_filter()
            .map(|f| f.to_string())
            .unwrap_or_default();
        println!("  - {} [{}] matching {}", source.name, source.site, filter);
        println!("    * {}", source.search_url);
        println!(
            "    * up to {} page(s), wait {}ms, {} concurrent",
            source.max_pages, source.max_wait_ms, source.max_concurrent_pages
        );
    }

    match &config.filings {
        Some(filings) => {
            let endpoints: Vec<String> = filings.endpoints.iter().map(|e| e.to_string()).collect();
            println!(
                "\nFilings ({}) for {} companies:",
                endpoints.join(", "),
                filings.companies.len()
            );
            for company in &filings.companies {
                println!("  - {} (CIK {}) -> {}", company.name, company.cik, company.slug());
            }
            if filings
                .endpoints
                .iter()
                .any(|e| filings.template(*e).contains("{token}"))
            {
                println!("  Token read from ${}", filings.token_env);
            }
        }
        None => println!("\nFilings: not configured"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest<S: PageSource>(
    config: &Config,
    config_hash: &str,
    pages: Arc<S>,
    options: &RunOptions,
) -> anyhow::Result<()> {
    if options.fresh {
        tracing::info!("Starting fresh harvest (ignoring checkpoints)");
    } else {
        tracing::info!("Starting harvest (will resume from checkpoints)");
    }

    let summary = match run_harvest(config, config_hash, pages, options).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&summary);

    if summary.total_failures() > 0 {
        tracing::warn!("Harvest finished with {} failures", summary.total_failures());
    } else {
        tracing::info!("Harvest completed successfully");
    }

    Ok(())
}
