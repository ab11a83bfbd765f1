use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use energy_events::api;
use energy_events::config::AppConfig;
use energy_events::db::Store;
use energy_events::email::{self, SendEmail, StdoutSender};
use energy_events::feed::FeedFilter;
use energy_events::scraping::{sources, HttpFetcher};

#[derive(Parser)]
#[command(name = "energy-events", version, about = "Aggregate energy and climate event listings into one feed")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every configured source and upsert the results
    Scrape,
    /// Print the current feed as JSON
    List {
        /// Source slug, or "all"
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text search over title, description, host, location
        #[arg(long)]
        search: Option<String>,
        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = api::DEFAULT_LIMIT)]
        limit: usize,
    },
    /// List the configured sources
    Sources,
    /// Render the upcoming-events digest and send (or print) it
    Digest {
        /// Recipient address; without one the digest goes to stdout
        #[arg(long)]
        to: Option<String>,
    },
    /// Assign synthetic dates to stored dateless events (requires config opt-in)
    Backfill,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load();
    let store = Store::open_default().context("opening event store")?;

    match cli.command {
        Command::Scrape => {
            let fetcher = Arc::new(HttpFetcher::new(&config)?);
            let summary = api::scrape(fetcher, &store, sources::all(), Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if !summary.success {
                anyhow::bail!("scrape completed but the store write failed");
            }
        }
        Command::List {
            source,
            category,
            search,
            from,
            to,
            limit,
        } => {
            let filter = FeedFilter {
                source,
                category,
                search,
                from,
                to,
            };
            let events = api::read_feed(&store, &filter, Utc::now().date_naive(), limit)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Command::Sources => {
            for config in sources::all() {
                println!("{:<24} {}", config.slug, config.url);
            }
        }
        Command::Digest { to } => {
            let now = Utc::now().date_naive();
            let events = api::read_feed(&store, &FeedFilter::default(), now, api::DEFAULT_LIMIT)?;
            let digest = email::build_digest(&events, now);
            let recipient = to.as_deref().unwrap_or("stdout");
            StdoutSender
                .send(recipient, &digest.subject, &digest.body)
                .await?;
        }
        Command::Backfill => {
            let updated = api::backfill_synthetic_dates(&store, &config, Utc::now().date_naive())?;
            println!("backfilled {updated} event(s)");
        }
    }
    Ok(())
}
