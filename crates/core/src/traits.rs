use std::collections::BTreeMap;

use super::graph::RateGraph;
use super::solver::Relaxation;
use common::{FetchError, RateTable, error::Error};

/// Source of quoted rates, one table per base currency.
///
/// Contract: `rate(base, target)` is the number of `target` units received
/// for 1 unit of `base`.
pub trait RateProvider {
    fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError>;
}

/// Static quotes keyed by base symbol; a missing base is `NoData`.
impl RateProvider for BTreeMap<String, RateTable> {
    fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        self.get(base)
            .cloned()
            .ok_or_else(|| FetchError::NoData(base.to_string()))
    }
}

/// Results collected ahead of time by a concurrent fetcher.
impl RateProvider for BTreeMap<String, Result<RateTable, FetchError>> {
    fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        self.get(base)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NoData(base.to_string())))
    }
}

/// Trait for single-source shortest-path solvers capable of detecting negative cycles.
pub trait ShortestPathSolver {
    /// Relaxes every edge of `graph` from `source`.
    ///
    /// Returns `Ok(Relaxation::Converged { .. })` when no reachable negative
    /// cycle exists, `Ok(Relaxation::NegativeCycleDetected { .. })` with a
    /// witness vertex otherwise, or `Err(e)` if `source` is not a vertex.
    fn run(&self, graph: &RateGraph, source: usize) -> Result<Relaxation, Error>;
}
