//! CLI commands implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;

use crate::batch::BatchRunner;
use crate::config::Settings;
use crate::models::{AttemptOutcome, SiteConfig};
use crate::repository::{AttemptRepository, ListingRepository, SiteConfigRepository};
use crate::scrapers::HttpFetcher;
use crate::server;

#[derive(Parser)]
#[command(name = "autolista")]
#[command(about = "Vehicle listing acquisition and extraction engine")]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, global = true, env = "AUTOLISTA_DB")]
    db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Run the HTTP job interface
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value = "8920")]
        port: u16,
    },

    /// Scrape a batch of listing URLs for one site
    Scrape {
        /// Site ID with an active configuration
        site: String,
        /// Listing URLs to fetch
        urls: Vec<String>,
    },

    /// Manage site configurations
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },

    /// Show recent attempt log entries for a site
    Attempts {
        /// Site ID
        site: String,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// List configured sites
    List,
    /// Import site configurations from a JSON file
    Import {
        /// Path to a JSON file with one config or an array of configs
        path: PathBuf,
    },
}

/// Parse arguments and dispatch.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.db_path.clone());
    settings.ensure_dirs()?;

    match cli.command {
        Commands::Init => init(&settings),
        Commands::Serve { host, port } => server::serve(&settings, &host, port).await,
        Commands::Scrape { site, urls } => scrape(&settings, &site, &urls).await,
        Commands::Site { command } => match command {
            SiteCommands::List => list_sites(&settings),
            SiteCommands::Import { path } => import_sites(&settings, &path),
        },
        Commands::Attempts { site, limit } => show_attempts(&settings, &site, limit),
    }
}

fn init(settings: &Settings) -> anyhow::Result<()> {
    ListingRepository::new(&settings.db_path)?;
    AttemptRepository::new(&settings.db_path)?;
    SiteConfigRepository::new(&settings.db_path)?;
    println!("Initialized database at {}", settings.db_path.display());
    Ok(())
}

async fn scrape(settings: &Settings, site: &str, urls: &[String]) -> anyhow::Result<()> {
    anyhow::ensure!(!urls.is_empty(), "no URLs given");

    let listings = Arc::new(ListingRepository::new(&settings.db_path)?);
    let attempts = Arc::new(AttemptRepository::new(&settings.db_path)?);
    let sites = Arc::new(SiteConfigRepository::new(&settings.db_path)?);
    let runner = BatchRunner::new(Arc::new(HttpFetcher::new()), listings, attempts, sites);

    let progress = ProgressBar::new_spinner();
    progress.set_message(format!("Scraping {} URLs from {}", urls.len(), site));
    progress.enable_steady_tick(Duration::from_millis(120));

    let summary = runner.run(site, urls).await?;
    progress.finish_and_clear();

    println!(
        "{} {} processed, {} failed",
        style("done:").green().bold(),
        summary.processed,
        summary.failed
    );
    for result in &summary.results {
        println!(
            "  {} {} (score {}, {} ms)",
            style("ok").green(),
            result.url,
            result.quality_score,
            result.latency_ms
        );
    }
    for failure in &summary.errors {
        println!(
            "  {} {} - {}",
            style("err").red(),
            failure.url,
            failure.error
        );
    }

    Ok(())
}

fn list_sites(settings: &Settings) -> anyhow::Result<()> {
    let repo = SiteConfigRepository::new(&settings.db_path)?;
    let sites = repo.get_all()?;

    if sites.is_empty() {
        println!("No sites configured. Use `autolista site import <file>`.");
        return Ok(());
    }

    for site in sites {
        let last_run = site
            .last_run_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{}  delay={}s rpm={}  last run: {}",
            style(&site.site_id).cyan(),
            site.delay_seconds,
            site.max_requests_per_minute,
            last_run
        );
    }

    Ok(())
}

fn import_sites(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;

    // Accept either a single config object or an array of them.
    let configs: Vec<SiteConfig> = match serde_json::from_str::<Vec<SiteConfig>>(&content) {
        Ok(configs) => configs,
        Err(_) => vec![serde_json::from_str::<SiteConfig>(&content)?],
    };

    let repo = SiteConfigRepository::new(&settings.db_path)?;
    for config in &configs {
        repo.save(config)?;
        println!("{} {}", style("imported").green(), config.site_id);
    }

    Ok(())
}

fn show_attempts(settings: &Settings, site: &str, limit: usize) -> anyhow::Result<()> {
    let repo = AttemptRepository::new(&settings.db_path)?;
    let attempts = repo.recent(site, limit)?;

    if attempts.is_empty() {
        println!("No attempts recorded for {}", site);
        return Ok(());
    }

    for attempt in attempts {
        let outcome = match attempt.outcome {
            AttemptOutcome::Success => style(attempt.outcome.as_str()).green(),
            AttemptOutcome::Blocked => style(attempt.outcome.as_str()).yellow(),
            _ => style(attempt.outcome.as_str()).red(),
        };
        let message = attempt
            .message
            .as_deref()
            .map(|m| format!("  ({})", m))
            .unwrap_or_default();
        println!(
            "{}  {:>8}  {:>6} ms  {}{}",
            attempt.created_at.format("%Y-%m-%d %H:%M:%S"),
            outcome,
            attempt.latency_ms,
            attempt.url,
            message
        );
    }

    Ok(())
}
