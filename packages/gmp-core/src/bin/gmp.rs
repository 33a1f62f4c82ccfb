//! GMP CLI - Command line interface for the portfolio analytics engine.
//!
//! Prints JSON envelopes on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gmp_core::{
    align, analyze, horizon_years_between, AnalyticsReport, ApiResponse, PriceSnapshot, Universe,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gmp")]
#[command(about = "Global market portfolio analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analytics pipeline over a price snapshot
    Analyze {
        /// JSON file with `{"assets": [...]}` price histories
        #[arg(short, long)]
        prices: PathBuf,
        /// Take weights and tickers from the universe file
        #[arg(short, long)]
        universe: bool,
        /// Return periods per year
        #[arg(long)]
        periods_per_year: Option<u32>,
        /// Rolling volatility window in periods
        #[arg(short, long)]
        window: Option<usize>,
        /// History span in years (derived from the aligned dates when omitted)
        #[arg(long)]
        horizon_years: Option<f64>,
        /// Investment amount to break down across the assets
        #[arg(short, long)]
        amount: Option<f64>,
    },
    /// Show the configured asset universe
    Universe {
        /// Universe file (defaults to ~/.gmp/universe.json)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Analyze {
            prices,
            universe,
            periods_per_year,
            window,
            horizon_years,
            amount,
        } => respond(handle_analyze(
            &prices,
            universe,
            periods_per_year,
            window,
            horizon_years,
            amount,
        )),
        Commands::Universe { file } => respond(handle_universe(file)),
    };

    println!("{}", output);
}

fn respond<T: Serialize>(result: anyhow::Result<T>) -> String {
    let rendered = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data)),
        Err(e) => {
            tracing::error!("{:#}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e)))
        }
    };

    rendered.unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}

fn handle_analyze(
    prices: &Path,
    use_universe: bool,
    periods_per_year: Option<u32>,
    window: Option<usize>,
    horizon_years: Option<f64>,
    amount: Option<f64>,
) -> anyhow::Result<AnalyticsReport> {
    let content = fs::read_to_string(prices)
        .with_context(|| format!("failed to read {}", prices.display()))?;
    let mut snapshot: PriceSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", prices.display()))?;

    let universe = Universe::load().context("failed to load universe")?;
    if use_universe {
        universe.apply_to(&mut snapshot.assets)?;
    }

    let mut config = universe.analytics;
    if let Some(periods) = periods_per_year {
        config.periods_per_year = periods;
    }
    if let Some(window) = window {
        config.window = window;
    }
    config.horizon_years = match horizon_years {
        Some(years) => years,
        None => {
            let aligned = align(&snapshot.assets)?;
            let (start, end) = aligned
                .span()
                .context("aligned price history is empty")?;
            horizon_years_between(start, end)
        }
    };

    tracing::info!(
        "Analyzing {} assets from {} (horizon {:.2} years)",
        snapshot.assets.len(),
        prices.display(),
        config.horizon_years
    );

    let report = analyze(&snapshot.assets, &config)?;
    match amount {
        Some(amount) => Ok(report.with_investment(amount)?),
        None => Ok(report),
    }
}

fn handle_universe(file: Option<PathBuf>) -> anyhow::Result<serde_json::Value> {
    let path = file.unwrap_or_else(Universe::default_path);
    let universe = Universe::load_from_path(&path)
        .with_context(|| format!("failed to load universe from {}", path.display()))?;

    Ok(json!({
        "path": path.display().to_string(),
        "assets": universe.assets,
        "allocation": universe.allocation()?,
        "analytics": universe.analytics,
    }))
}
