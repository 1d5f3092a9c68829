pub mod config;
pub mod csv_fetcher;
pub mod error;
pub mod fetcher;
pub mod http_fetcher;
pub mod logging;
pub mod render;
pub mod simulator;
pub mod types;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use common::BuildIssue;
use config::Config;
use csv_fetcher::CsvRateFetcher;
use error::Error;
use fx_arb_core::{Analysis, Analyzer, BellmanFordSolver, RateGraph};
use http_fetcher::HttpRateFetcher;
use simulator::SimulatedRateFetcher;
use types::{DataSource, RateFetcher};

/// Detects currency-arbitrage loops in quoted exchange rates.
#[derive(Parser, Debug)]
#[command(name = "fx-arb", version, about, long_about = None)]
struct Args {
    /// Comma-separated currency symbols; the first one is the analysis source
    #[arg(required = true, value_name = "CURRENCIES")]
    currencies: Vec<String>,

    /// Where quotes come from
    #[arg(short, long, value_enum, default_value_t = DataSource::Http)]
    source: DataSource,

    /// Quotes file for `--source csv`
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let args = Args::parse();
    match run(args).await {
        Ok(Outcome { analysis, skipped }) => {
            if !skipped.is_empty() {
                warn!(skipped = skipped.len(), "Report covers a partial graph");
            }
            print!("{}", render::render_analysis(&analysis));
            if analysis.outcome.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(error = %e, "fx-arb failed");
            ExitCode::FAILURE
        }
    }
}

/// A finished analysis plus every base or quote left out of its graph.
#[derive(Debug)]
struct Outcome {
    analysis: Analysis,
    skipped: Vec<BuildIssue>,
}

async fn run(args: Args) -> Result<Outcome, Error> {
    let selected = parse_currency_list(&args.currencies);
    if selected.is_empty() {
        return Err(Error::NoCurrencies);
    }

    let config = config::load_config(args.config.as_deref())?;
    info!(source = ?args.source, currencies = %selected.join(","), "Starting analysis");

    match args.source {
        DataSource::Http => {
            let fetcher = HttpRateFetcher::from_config(&config.provider)?;
            analyze_with(fetcher, &selected, &config).await
        }
        DataSource::Csv => {
            let path = args.csv.ok_or(Error::MissingCsvPath)?;
            let fetcher = CsvRateFetcher::from_path(path)?;
            analyze_with(fetcher, &selected, &config).await
        }
        DataSource::Sim => {
            let fetcher = SimulatedRateFetcher::new(&config.simulator, &selected);
            analyze_with(fetcher, &selected, &config).await
        }
    }
}

/// Fetches every selected base, builds the graph and analyzes it from the first symbol.
async fn analyze_with<F>(
    fetcher: F,
    selected: &[String],
    config: &Config,
) -> Result<Outcome, Error>
where
    F: RateFetcher,
{
    let rates = fetcher::fetch_all(
        Arc::new(fetcher),
        selected,
        config.provider.max_concurrent_requests,
        config.provider.request_timeout(),
    )
    .await;

    let (graph, skipped) = RateGraph::build_with_diagnostics(
        selected.iter().cloned(),
        &rates,
        config.engine.duplicate_policy,
    );

    let analyzer = Analyzer::new(BellmanFordSolver::new(config.engine.relaxation_tolerance));
    let analysis = analyzer.analyze_symbol(&graph, &selected[0])?;
    Ok(Outcome { analysis, skipped })
}

/// Splits, trims and upper-cases symbols, dropping empties and repeats.
///
/// `["usd, eur", "GBP,,eur"]` becomes `["USD", "EUR", "GBP"]`.
fn parse_currency_list(raw: &[String]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.iter().flat_map(|arg| arg.split(',')) {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}
