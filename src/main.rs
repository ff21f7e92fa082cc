//! HeadlineTrader - Main Entry Point
//!
//! Runs one trading pass over the batch owned by the current session
//! window, or queues scored headlines into a batch.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use headline_trader::config::load_config;
use headline_trader::signals;
use headline_trader::{
    AlpacaClient, AppConfig, Brokerage, CsvBatchStore, MarketCalendar, OrderOutcome, PaperBroker,
    PassOutcome, SessionClassifier, StaticCalendar, TradingPass,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size and dispatch the batch of the current session window
    Run {
        /// Capital for this pass; defaults to config, then account buying power
        #[arg(long, env = "HEADLINE_TRADER_CAPITAL")]
        capital: Option<Decimal>,

        /// Read this batch instead of the window's own
        #[arg(long)]
        batch: Option<PathBuf>,

        /// Record orders in memory instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Aggregate scored headlines and append recommendations to a batch
    Enqueue {
        /// CSV of ticker,headline,published_at,score rows
        #[arg(long)]
        scores: PathBuf,

        /// Only use today's headlines inside this session window
        #[arg(long)]
        window: Option<String>,

        /// Batch to append to; defaults to the window's batch
        #[arg(long)]
        batch: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = load_config(Some(args.config.as_str())).context("failed to load configuration")?;

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.settings.log_level.clone());
    init_logging(&log_level, args.log_format)?;

    info!("Starting HeadlineTrader");
    info!("Configuration file: {}", args.config);

    match args.command {
        Command::Run {
            capital,
            batch,
            dry_run,
        } => run_pass(&config, capital, batch, dry_run).await,
        Command::Enqueue {
            scores,
            window,
            batch,
        } => enqueue(&config, scores, window, batch),
    }
}

fn init_logging(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

async fn run_pass(
    config: &AppConfig,
    capital: Option<Decimal>,
    batch: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let classifier = SessionClassifier::from_config(&config.sessions)?;
    let alpaca = AlpacaClient::new(&config.alpaca, &config.settings)?;
    let store = CsvBatchStore::new();
    let capital = capital.or(config.settings.capital);

    let paper;
    let offline_calendar;
    let (broker, calendar): (&dyn Brokerage, &dyn MarketCalendar) = if dry_run {
        let buying_power = match capital {
            Some(capital) => capital,
            None => alpaca.buying_power().await?,
        };
        paper = PaperBroker::new(buying_power);
        offline_calendar = StaticCalendar::new(config.sessions.holidays.iter().copied());
        warn!("Dry run: orders are recorded in memory only");
        (
            &paper as &dyn Brokerage,
            &offline_calendar as &dyn MarketCalendar,
        )
    } else {
        (
            &alpaca as &dyn Brokerage,
            &alpaca as &dyn MarketCalendar,
        )
    };

    let mut pass = TradingPass::new(&classifier, calendar, &alpaca, broker, &store);
    if let Some(batch) = batch {
        pass = pass.with_batch(batch);
    }

    let outcome = pass
        .run(Utc::now(), capital)
        .await
        .context("trading pass failed")?;

    match outcome {
        PassOutcome::Skipped { state, reason } => {
            info!(%state, %reason, "Pass skipped");
        }
        PassOutcome::Completed(summary) => {
            for rejected in &summary.allocation.rejected {
                info!(
                    ticker = %rejected.ticker,
                    price = %rejected.price,
                    budget = %rejected.budget,
                    "Rejected: price above per-share budget"
                );
            }
            for dropped in &summary.allocation.dropped {
                info!(ticker = %dropped.ticker, reason = %dropped.reason, "Dropped");
            }
            for outcome in &summary.dispatch.outcomes {
                if let OrderOutcome::Failed { order, reason } = outcome {
                    warn!(ticker = %order.ticker, %reason, "Order failed");
                }
            }
            info!(
                window = %summary.window,
                batch = %summary.batch.display(),
                submitted = summary.dispatch.submitted(),
                failed = summary.dispatch.failed(),
                capital_after = %summary.allocation.capital_after,
                "Done"
            );
        }
    }
    Ok(())
}

fn enqueue(
    config: &AppConfig,
    scores: PathBuf,
    window: Option<String>,
    batch: Option<PathBuf>,
) -> Result<()> {
    let classifier = SessionClassifier::from_config(&config.sessions)?;
    let mut headlines = signals::read_scores(&scores)?;

    let window = match window {
        Some(name) => match config.sessions.windows.iter().find(|w| w.name == name) {
            Some(window) => Some(window),
            None => bail!("unknown session window '{}'", name),
        },
        None => None,
    };

    if let Some(window) = window {
        headlines = signals::filter_window(headlines, classifier.timezone(), window, Utc::now());
    }

    let Some(batch) = batch.or_else(|| window.map(|w| w.batch.clone())) else {
        bail!("either --window or --batch is required");
    };

    let recommendations = signals::aggregate(&headlines);
    let queued = signals::enqueue(&CsvBatchStore::new(), &batch, &recommendations)?;
    info!(
        headlines = headlines.len(),
        tickers = recommendations.len(),
        queued,
        batch = %batch.display(),
        "Enqueued recommendations"
    );
    Ok(())
}
