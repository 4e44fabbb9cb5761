use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use na_core::{NewsConfig, StatsSink};
use na_scrapers::{handle_command, init_logging, HttpFetcher, ScraperArgs, ScraperCommands, ScraperManager, DEFAULT_CONCURRENCY};
use na_stats::{create_stats, render_report, StatsBackend, DEFAULT_STATS_FILE};
use na_web::{create_app, AppState};
use tracing::{error, info};

/// Durations such as `1h15m`, `30s` or `90` (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut digits = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            let value: u64 = digits
                .parse()
                .map_err(|_| format!("Missing number before '{}'", c))?;
            total_seconds += value * unit;
            digits.clear();
            seen_number = true;
        }

        if !digits.is_empty() {
            total_seconds += digits.parse::<u64>().map_err(|e| e.to_string())?;
            seen_number = true;
        }
        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be positive".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "newsagg", author, version, about = "Scrape news listing pages and serve them as JSON")]
struct Cli {
    /// JSON source catalog; the built-in catalog is used when omitted
    #[arg(long, global = true, env = "NEWSAGG_SOURCES")]
    sources: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = StatsBackend::File)]
    stats_backend: StatsBackend,
    #[arg(long, global = true, default_value = DEFAULT_STATS_FILE)]
    stats_file: PathBuf,
    /// Per-request fetch timeout
    #[arg(long, global = true, default_value_t = 15)]
    timeout_secs: u64,
    /// Sources fetched in parallel; 1 scrapes sequentially
    #[arg(long, global = true, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the news API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
        /// Directory served for paths outside /api
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Scrape from the command line
    Scrape {
        /// Repeat periodically (e.g. 30m, 1h15m, 1d)
        #[arg(long)]
        interval: Option<HumanDuration>,
        #[command(subcommand)]
        command: ScraperCommands,
    },
    /// Print the statistics report
    Stats,
}

fn load_config(path: Option<&Path>) -> Result<NewsConfig> {
    match path {
        Some(path) => NewsConfig::from_file(path).with_context(|| format!("loading sources from {}", path.display())),
        None => Ok(NewsConfig::builtin()),
    }
}

fn build_manager(cli: &Cli, stats: Arc<dyn StatsSink>) -> Result<ScraperManager> {
    let config = load_config(cli.sources.as_deref())?;
    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout_secs)).context("building HTTP client")?;
    info!(
        "🦗 {} sources in {} categories",
        config.source_count(),
        config.categories.len()
    );
    Ok(ScraperManager::new(config, Arc::new(fetcher), stats).with_concurrency(cli.concurrency))
}

async fn serve(manager: ScraperManager, stats: Arc<dyn StatsSink>, host: &str, port: u16, static_dir: Option<PathBuf>) -> Result<()> {
    let mut state = AppState::new(Arc::new(manager), stats);
    if let Some(dir) = static_dir {
        info!("📁 Serving static files from {}", dir.display());
        state = state.with_static_dir(dir);
    }

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {}:{}", host, port))?;
    info!("🚀 News API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await.context("serving HTTP")?;
    Ok(())
}

async fn scrape(manager: &ScraperManager, command: ScraperCommands, interval: Option<HumanDuration>) -> Result<()> {
    let args = ScraperArgs { command };
    let Some(interval) = interval else {
        handle_command(&args, manager).await?;
        return Ok(());
    };

    info!("⏱️ Running in periodic mode every {}s", interval.0.as_secs());
    loop {
        info!("Starting scrape cycle");
        if let Err(e) = handle_command(&args, manager).await {
            error!("❌ Error during scrape: {}", e);
        }
        info!("Waiting {}s before next scrape", interval.0.as_secs());
        tokio::time::sleep(interval.0).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let stats = create_stats(cli.stats_backend, Some(cli.stats_file.as_path()))
        .await
        .with_context(|| format!("opening {:?} stats backend", cli.stats_backend))?;

    match &cli.command {
        Commands::Stats => {
            let record = stats.snapshot().await?;
            println!("{}", render_report(&record));
        }
        Commands::Serve { host, port, static_dir } => {
            let manager = build_manager(&cli, stats.clone())?;
            serve(manager, stats, host, *port, static_dir.clone()).await?;
        }
        Commands::Scrape { interval, command } => {
            let manager = build_manager(&cli, stats)?;
            scrape(&manager, command.clone(), *interval).await?;
        }
    }
    Ok(())
}
