//! Folio CLI - Command line interface for portfolio health analysis.
//!
//! Reads holdings and market data from CSV files and prints JSON responses.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use folio_health::{
    analyze, compute_portfolio_metrics, forecast, parse_forecast_spec, parse_target_allocation,
    read_holdings_file, rebalance_portfolio, AnalysisRequest, ApiResponse, FileMarketData,
    Holding, MarketData, Period, ReturnSeries, RiskReport, Settings,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio health CLI - allocation, risk and what-if analysis")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ~/.folio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pass
    Analyze {
        #[command(flatten)]
        input: PortfolioArgs,
        /// Price history CSV (Date plus one column per ticker)
        #[arg(long)]
        history: Option<PathBuf>,
        /// Target allocation, e.g. "AAPL:40,MSFT:60"
        #[arg(short, long)]
        targets: Option<String>,
        /// Forecast entries, e.g. "AAPL:10:20,MSFT:-5"
        #[arg(short, long)]
        forecast: Option<String>,
        /// Run the rebalance and forecast sections
        #[arg(long)]
        simulate: bool,
        #[command(flatten)]
        risk: RiskArgs,
    },
    /// Market value and allocation per position and sector
    Overview {
        #[command(flatten)]
        input: PortfolioArgs,
    },
    /// Actions needed to reach a target allocation
    Rebalance {
        #[command(flatten)]
        input: PortfolioArgs,
        /// Target allocation, e.g. "AAPL:40,MSFT:60"
        #[arg(short, long)]
        targets: String,
    },
    /// Volatility, Sharpe and correlation for a set of tickers
    Risk {
        /// Tickers (comma-separated)
        #[arg(short = 'y', long)]
        tickers: String,
        /// Price history CSV (Date plus one column per ticker)
        #[arg(long)]
        history: PathBuf,
        #[command(flatten)]
        risk: RiskArgs,
    },
    /// Profit and loss under expected price changes
    Forecast {
        /// Quotes CSV (Ticker, Price, Sector)
        #[arg(short, long)]
        quotes: PathBuf,
        /// Forecast entries, e.g. "AAPL:10:20,MSFT:-5"
        #[arg(short, long)]
        spec: String,
        /// Also write the forecast table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Reference sector to ETF table in effect
    Sectors,
}

#[derive(Args)]
struct PortfolioArgs {
    /// Holdings CSV (Ticker, Shares)
    #[arg(short, long)]
    portfolio: PathBuf,
    /// Quotes CSV (Ticker, Price, Sector)
    #[arg(short, long)]
    quotes: PathBuf,
}

#[derive(Args)]
struct RiskArgs {
    /// Lookback period (1mo, 3mo, 6mo, 1y, 2y, 5y, ytd, max)
    #[arg(long)]
    period: Option<Period>,
    /// Annual risk-free rate (0.02 = 2%)
    #[arg(long)]
    risk_free_rate: Option<f64>,
}

impl RiskArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(period) = self.period {
            settings.risk.period = period;
        }
        if let Some(rate) = self.risk_free_rate {
            settings.risk.risk_free_rate = rate;
        }
    }
}

impl PortfolioArgs {
    fn load(&self) -> anyhow::Result<(Vec<Holding>, FileMarketData)> {
        let holdings = read_holdings_file(&self.portfolio)
            .with_context(|| format!("Failed to read portfolio {}", self.portfolio.display()))?;
        let market = FileMarketData::new(&self.quotes)
            .with_context(|| format!("Failed to read quotes {}", self.quotes.display()))?;
        Ok((holdings, market))
    }
}

fn main() -> anyhow::Result<()> {
    // stdout carries the JSON response
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match run(cli) {
        Ok(data) => ApiResponse::ok(data).to_json()?,
        Err(e) => ApiResponse::<()>::err(format!("{:#}", e)).to_json()?,
    };

    println!("{}", output);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<Value> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Settings::load().context("Failed to load config")?,
    };

    match cli.command {
        Commands::Analyze {
            input,
            history,
            targets,
            forecast,
            simulate,
            risk,
        } => {
            risk.apply(&mut settings);
            let (holdings, mut market) = input.load()?;
            if let Some(path) = history {
                market = market
                    .with_history(&path)
                    .with_context(|| format!("Failed to read history {}", path.display()))?;
            }

            let request = AnalysisRequest {
                holdings,
                target_allocation: targets,
                forecast,
                simulate,
            };
            let report = analyze(&market, &settings, &request);
            Ok(serde_json::to_value(report)?)
        }
        Commands::Overview { input } => {
            let (holdings, market) = input.load()?;
            let quotes = market.fetch_quotes(&tickers_of(&holdings));
            let overview = compute_portfolio_metrics(&holdings, &quotes);
            Ok(json!({
                "positions": overview.positions,
                "total_value": overview.total_value,
                "sector_allocation": overview.sector_allocation(),
            }))
        }
        Commands::Rebalance { input, targets } => {
            let (holdings, market) = input.load()?;
            let targets = parse_target_allocation(&targets)?;
            let quotes = market.fetch_quotes(&tickers_of(&holdings));
            let overview = compute_portfolio_metrics(&holdings, &quotes);
            let table = rebalance_portfolio(&overview, &targets);
            Ok(json!({
                "rows": table.rows,
                "total_value": table.total_value,
                "net_action": table.net_action(),
                "unmatched_targets": table.unmatched_targets,
            }))
        }
        Commands::Risk {
            tickers,
            history,
            risk,
        } => {
            risk.apply(&mut settings);
            let market = FileMarketData::default()
                .with_history(&history)
                .with_context(|| format!("Failed to read history {}", history.display()))?;

            let tickers: Vec<String> = tickers
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if tickers.is_empty() {
                anyhow::bail!("No tickers given");
            }

            let prices = market.fetch_history(&tickers, settings.risk.period);
            let returns = ReturnSeries::from_prices(&prices);
            let report = RiskReport::compute(&returns, settings.risk.risk_free_rate);
            Ok(serde_json::to_value(report)?)
        }
        Commands::Forecast { quotes, spec, csv } => {
            let market = FileMarketData::new(&quotes)
                .with_context(|| format!("Failed to read quotes {}", quotes.display()))?;
            let inputs = parse_forecast_spec(&spec)?;
            let tickers: Vec<String> = inputs.iter().map(|i| i.ticker.clone()).collect();
            let table = forecast(
                &inputs,
                &market.fetch_quotes(&tickers),
                settings.forecast.default_shares,
            );

            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                table.write_csv(file)?;
                tracing::info!("Wrote forecast to {}", path.display());
            }
            Ok(serde_json::to_value(table)?)
        }
        Commands::Sectors => {
            let map = settings.advisor.sector_map();
            Ok(json!({
                "sectors": map.entries(),
            }))
        }
    }
}

fn tickers_of(holdings: &[Holding]) -> Vec<String> {
    holdings.iter().map(|h| h.ticker.clone()).collect()
}
