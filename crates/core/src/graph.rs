use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::traits::RateProvider;
use common::numeric_kernel::rate_to_weight;
use common::{BuildIssue, DirectedEdge, error::Error};

/// What to keep when the same ordered pair is quoted more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep only the last edge appended for each `(from, to)`, at the position of that write.
    #[default]
    LastWriteWins,
    /// Keep every appended edge; lookups see the first one.
    KeepAll,
}

/// Immutable log-weighted currency graph.
///
/// Vertices are the selected currencies in selection order, so the
/// index <-> symbol mapping is fixed once the graph exists. Edges keep their
/// insertion order, which is the order every relaxation pass walks them in.
///
/// For every quote `base -> target` at `rate` the graph holds
/// `base -> target` with weight `-ln(rate)` and `target -> base` with
/// weight `+ln(rate)`.
#[derive(Debug, Clone)]
pub struct RateGraph {
    symbols: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<DirectedEdge>,
}

impl RateGraph {
    /// Builds the graph for `selected` currencies from `provider` quotes.
    ///
    /// A base currency the provider cannot answer for is skipped, as is any
    /// quote whose rate has no logarithm; the rest of the graph is still built.
    pub fn build<I, S, P>(selected: I, provider: &P, policy: DuplicatePolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: RateProvider + ?Sized,
    {
        Self::build_with_diagnostics(selected, provider, policy).0
    }

    /// Same as [`RateGraph::build`], also returning every skipped base or quote.
    pub fn build_with_diagnostics<I, S, P>(
        selected: I,
        provider: &P,
        policy: DuplicatePolicy,
    ) -> (Self, Vec<BuildIssue>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: RateProvider + ?Sized,
    {
        let mut builder = GraphBuilder::new(selected);
        let mut issues = Vec::new();

        for base in builder.symbols.clone() {
            let table = match provider.fetch_rates(&base) {
                Ok(table) => table,
                Err(cause) => {
                    let issue = BuildIssue::FetchFailure { base, cause };
                    warn!(%issue, "Partial graph");
                    issues.push(issue);
                    continue;
                }
            };

            for (target, &rate) in &table {
                if let Err(issue) = builder.add_quote(&base, target, rate) {
                    warn!(%issue, "Quote rejected");
                    issues.push(issue);
                }
            }
        }

        let graph = builder.finish(policy);
        info!(
            vertices = graph.num_vertices(),
            edges = graph.edge_count(),
            skipped = issues.len(),
            "Rate graph built"
        );

        (graph, issues)
    }

    pub fn num_vertices(&self) -> usize {
        self.symbols.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges in relaxation order.
    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn symbol(&self, vertex: usize) -> Option<&str> {
        self.symbols.get(vertex).map(String::as_str)
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    /// Weight of the first stored `from -> to` edge.
    pub fn edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        self.edges
            .iter()
            .find(|e| e.from == from && e.to == to)
            .map(|e| e.weight)
    }

    /// Lowest weight over every stored `from -> to` edge.
    ///
    /// Under `KeepAll` a pair can carry several edges and relaxation follows
    /// the cheapest one, so loops are priced from it.
    pub fn cheapest_edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        self.edges
            .iter()
            .filter(|e| e.from == from && e.to == to)
            .map(|e| e.weight)
            .reduce(f64::min)
    }

    pub fn outgoing_count(&self, vertex: usize) -> usize {
        self.edges.iter().filter(|e| e.from == vertex).count()
    }
}

/// Mutable accumulator behind [`RateGraph`]. Nothing else ever writes edges.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    symbols: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<DirectedEdge>,
}

impl GraphBuilder {
    /// Registers the vertex set. Repeated symbols keep their first position.
    pub fn new<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Self::default();
        for symbol in selected {
            let symbol = symbol.into();
            if builder.index.contains_key(&symbol) {
                debug!(%symbol, "Duplicate currency in selection ignored");
                continue;
            }
            builder.index.insert(symbol.clone(), builder.symbols.len());
            builder.symbols.push(symbol);
        }
        builder
    }

    pub fn num_vertices(&self) -> usize {
        self.symbols.len()
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    /// Adds both directions of one quote.
    ///
    /// Quotes against the base itself or against an unselected currency are
    /// ignored.
    ///
    /// # Errors
    /// Returns `BuildIssue::InvalidRate` when `rate` has no logarithm; nothing is added.
    pub fn add_quote(&mut self, base: &str, target: &str, rate: f64) -> Result<(), BuildIssue> {
        let (Some(u), Some(v)) = (self.index_of(base), self.index_of(target)) else {
            return Ok(());
        };
        if u == v {
            return Ok(());
        }

        let weight = rate_to_weight(rate).ok_or_else(|| BuildIssue::InvalidRate {
            base: base.to_string(),
            target: target.to_string(),
            rate,
        })?;

        self.edges.push(DirectedEdge::new(u, v, weight));
        self.edges.push(DirectedEdge::new(v, u, -weight));
        Ok(())
    }

    /// O(1) append without de-duplication.
    ///
    /// # Errors
    /// `Error::NodeIndexOutOfBounds` for an unknown vertex, `Error::SelfLoop` when `from == to`.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<(), Error> {
        let n = self.symbols.len();
        if from >= n {
            return Err(Error::NodeIndexOutOfBounds(from));
        }
        if to >= n {
            return Err(Error::NodeIndexOutOfBounds(to));
        }
        if from == to {
            return Err(Error::SelfLoop(from));
        }
        self.edges.push(DirectedEdge::new(from, to, weight));
        Ok(())
    }

    /// Freezes the builder into an immutable graph.
    pub fn finish(self, policy: DuplicatePolicy) -> RateGraph {
        let edges = match policy {
            DuplicatePolicy::KeepAll => self.edges,
            DuplicatePolicy::LastWriteWins => {
                let appended = self.edges.len();
                let mut seen = HashSet::with_capacity(appended);

                // Walk backwards so the first sighting of a pair is its last write.
                let mut kept: Vec<DirectedEdge> = self
                    .edges
                    .into_iter()
                    .rev()
                    .filter(|e| seen.insert((e.from, e.to)))
                    .collect();
                kept.reverse();

                if kept.len() < appended {
                    debug!(dropped = appended - kept.len(), "Duplicate quotes overwritten");
                }
                kept
            }
        };

        RateGraph {
            symbols: self.symbols,
            index: self.index,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{FetchError, RateTable};
    use std::collections::BTreeMap;

    fn table(entries: &[(&str, f64)]) -> RateTable {
        entries.iter().map(|&(s, r)| (s.to_string(), r)).collect()
    }

    fn provider(entries: &[(&str, &[(&str, f64)])]) -> BTreeMap<String, RateTable> {
        entries
            .iter()
            .map(|&(base, rates)| (base.to_string(), table(rates)))
            .collect()
    }

    #[test]
    fn quote_adds_reciprocal_pair() {
        let quotes = provider(&[("USD", &[("EUR", 0.9)])]);
        let graph = RateGraph::build(["USD", "EUR"], &quotes, DuplicatePolicy::KeepAll);

        assert_eq!(graph.num_vertices(), 2);
        assert_eq!(graph.edge_count(), 2);

        let forward = graph.edge_weight(0, 1).unwrap();
        let backward = graph.edge_weight(1, 0).unwrap();
        assert_eq!(forward, -(0.9f64).ln());
        assert_eq!(forward + backward, 0.0);
    }

    #[test]
    fn symbol_index_mapping_follows_selection_order() {
        let quotes = provider(&[]);
        let graph = RateGraph::build(
            ["GBP", "USD", "GBP", "EUR"],
            &quotes,
            DuplicatePolicy::KeepAll,
        );

        assert_eq!(graph.symbols(), &["GBP", "USD", "EUR"]);
        assert_eq!(graph.index_of("EUR"), Some(2));
        assert_eq!(graph.symbol(1), Some("USD"));
        assert_eq!(graph.symbol(3), None);
        assert_eq!(graph.index_of("JPY"), None);
    }

    #[test]
    fn failed_base_is_skipped_and_reported() {
        let quotes = provider(&[("USD", &[("EUR", 0.9), ("GBP", 0.8)])]);
        let (graph, issues) = RateGraph::build_with_diagnostics(
            ["USD", "EUR", "GBP"],
            &quotes,
            DuplicatePolicy::KeepAll,
        );

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(
            issues,
            vec![
                BuildIssue::FetchFailure {
                    base: "EUR".into(),
                    cause: FetchError::NoData("EUR".into()),
                },
                BuildIssue::FetchFailure {
                    base: "GBP".into(),
                    cause: FetchError::NoData("GBP".into()),
                },
            ]
        );
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        let quotes = provider(&[("USD", &[("EUR", 0.0), ("GBP", -1.2), ("JPY", 150.0)])]);
        let (graph, issues) = RateGraph::build_with_diagnostics(
            ["USD", "EUR", "GBP", "JPY"],
            &quotes,
            DuplicatePolicy::KeepAll,
        );

        // Only USD/JPY survives.
        assert_eq!(graph.edge_count(), 2);
        let rejected = issues
            .iter()
            .filter(|i| matches!(i, BuildIssue::InvalidRate { .. }))
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn unselected_targets_and_self_quotes_are_ignored() {
        let quotes = provider(&[("USD", &[("USD", 1.0), ("CHF", 0.88), ("EUR", 0.9)])]);
        let (graph, issues) =
            RateGraph::build_with_diagnostics(["USD", "EUR"], &quotes, DuplicatePolicy::KeepAll);

        assert!(issues.iter().all(|i| matches!(i, BuildIssue::FetchFailure { .. })));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().iter().all(|e| e.from != e.to));
    }

    #[test]
    fn isolated_vertex_is_kept() {
        let quotes = provider(&[("USD", &[("EUR", 0.9)])]);
        let graph = RateGraph::build(["USD", "EUR", "JPY"], &quotes, DuplicatePolicy::KeepAll);

        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.outgoing_count(2), 0);
        assert_eq!(graph.outgoing_count(0), 1);
    }

    #[test]
    fn keep_all_stores_duplicates_and_lookup_sees_first() {
        let mut builder = GraphBuilder::new(["USD", "EUR"]);
        builder.add_quote("USD", "EUR", 0.9).unwrap();
        builder.add_quote("USD", "EUR", 0.95).unwrap();
        let graph = builder.finish(DuplicatePolicy::KeepAll);

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.edge_weight(0, 1), Some(-(0.9f64).ln()));
        assert_eq!(graph.cheapest_edge_weight(0, 1), Some(-(0.95f64).ln()));
        assert_eq!(graph.cheapest_edge_weight(1, 0), Some((0.9f64).ln()));
        assert_eq!(graph.cheapest_edge_weight(0, 0), None);
    }

    #[test]
    fn last_write_wins_keeps_latest_quote() {
        let mut builder = GraphBuilder::new(["USD", "EUR"]);
        builder.add_quote("USD", "EUR", 0.9).unwrap();
        builder.add_quote("EUR", "USD", 1.10).unwrap();
        let graph = builder.finish(DuplicatePolicy::LastWriteWins);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_weight(1, 0), Some(-(1.10f64).ln()));
        assert_eq!(graph.edge_weight(0, 1), Some((1.10f64).ln()));

        // Position of the last write: EUR -> USD was appended before its reverse.
        assert_eq!(graph.edges()[0].from, 1);
    }

    #[test]
    fn add_edge_validates_endpoints() {
        let mut builder = GraphBuilder::new(["USD", "EUR"]);

        assert_eq!(builder.add_edge(0, 2, 0.1), Err(Error::NodeIndexOutOfBounds(2)));
        assert_eq!(builder.add_edge(1, 1, 0.1), Err(Error::SelfLoop(1)));
        assert!(builder.add_edge(0, 1, 0.1).is_ok());
        assert!(builder.add_edge(0, 1, 0.2).is_ok());

        let graph = builder.finish(DuplicatePolicy::KeepAll);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn empty_selection_builds_empty_graph() {
        let quotes = provider(&[]);
        let graph = RateGraph::build(Vec::<String>::new(), &quotes, DuplicatePolicy::default());

        assert_eq!(graph.num_vertices(), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
