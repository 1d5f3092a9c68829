use std::collections::BTreeMap;

use clap::ValueEnum;

use common::{FetchError, RateTable};

/// A trait defining the contract for any source of quoted rates.
///
/// This trait decouples the fetch coordinator from the concrete source
/// (HTTP API, CSV file or simulation). One call answers for one base currency.
///
/// The trait bounds (`Send`, `Sync`, `'static`) let a single fetcher be
/// shared across the concurrent requests issued by the coordinator.
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync + 'static {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError>;
}

/// Per-base results gathered by the coordinator.
///
/// Implements the core `RateProvider` trait, so the graph is built from it
/// synchronously by one caller.
pub type PrefetchedRates = BTreeMap<String, Result<RateTable, FetchError>>;

/// Where quotes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataSource {
    /// exchangerate-api compatible HTTP endpoint
    Http,
    /// Local CSV file with `base,target,rate` rows
    Csv,
    /// Seeded synthetic quotes
    Sim,
}
