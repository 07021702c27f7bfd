// Copyright 2026 Form4 Watch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use form4_watch::feed::ScrapeOptions;
use form4_watch::{HttpClient, JsonlPersister, LogPersister, Persister, ScrapeConfig, Scraper};

#[derive(Parser)]
#[command(
    name = "form4-watch",
    about = "Form4 Watch — surface material insider trades from the ownership feed",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG overrides it.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON objects
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed once and process every entry
    Scrape(ScrapeArgs),
    /// Scrape repeatedly, remembering recent filings between polls
    Watch {
        #[command(flatten)]
        args: ScrapeArgs,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Args)]
struct ScrapeArgs {
    /// Feed endpoint (defaults to FORM4_WATCH_BASE_URL or the public feed)
    #[arg(long)]
    base_url: Option<String>,
    /// Number of feed entries to request
    #[arg(long)]
    count: Option<u32>,
    /// Extra feed option as key=value. Can be repeated.
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
    /// Append material transactions as JSON lines to this file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Maximum entries processed concurrently
    #[arg(long)]
    max_in_flight: Option<usize>,
    /// User-Agent sent to the feed host
    #[arg(long)]
    user_agent: Option<String>,
}

impl ScrapeArgs {
    fn config(&self) -> ScrapeConfig {
        let mut cfg = ScrapeConfig::from_env();
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(n) = self.max_in_flight {
            cfg.max_in_flight = n.max(1);
        }
        if let Some(ua) = &self.user_agent {
            cfg.user_agent = ua.clone();
        }
        cfg
    }

    fn scrape_options(&self) -> Result<ScrapeOptions> {
        let mut options = ScrapeOptions::new();
        for raw in &self.options {
            let Some((key, value)) = raw.split_once('=') else {
                bail!("invalid --option {raw:?}, expected KEY=VALUE");
            };
            options.insert(key.trim().to_string(), value.trim().to_string());
        }
        if let Some(count) = self.count {
            options.insert("count".to_string(), count.to_string());
        }
        Ok(options)
    }

    async fn scraper(&self, cfg: &ScrapeConfig) -> Result<Scraper> {
        let fetcher = Arc::new(HttpClient::new(&cfg.user_agent, cfg.timeout_ms)?);
        let persister: Arc<dyn Persister> = match &self.output {
            Some(path) => {
                tracing::info!("writing material transactions to {}", path.display());
                Arc::new(JsonlPersister::open(path).await?)
            }
            None => Arc::new(LogPersister),
        };
        Ok(Scraper::new(fetcher, persister, cfg))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Scrape(args) => {
            let cfg = args.config();
            let options = args.scrape_options()?;
            let scraper = args.scraper(&cfg).await?;
            let report = scraper.scrape(&options, &cfg.base_url).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Watch { args, interval } => {
            let mut cfg = args.config();
            if let Some(secs) = interval {
                cfg.poll_interval = Duration::from_secs(secs.max(1));
            }
            let options = args.scrape_options()?;
            let scraper = args.scraper(&cfg).await?;
            scraper
                .watch(&options, &cfg.base_url, cfg.poll_interval)
                .await;
        }
    }

    Ok(())
}
