use std::fmt;

use tracing::{debug, info, warn};

use super::cycle::extract_cycle;
use super::evaluator::{ArbitrageReport, evaluate};
use super::graph::RateGraph;
use super::solver::{BellmanFordSolver, Relaxation};
use super::traits::ShortestPathSolver;
use common::error::Error;

/// Stages of one analysis run.
///
/// ```text
/// Built -> Relaxing -> Converged -----------------------------> Reported
///                   -> CycleFound -> Extracting -> Evaluating -> Reported
/// any in-flight stage --(failure)--> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Built,
    Relaxing,
    Converged,
    CycleFound,
    Extracting,
    Evaluating,
    Reported,
    Aborted,
}

impl AnalysisState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisState::Reported | AnalysisState::Aborted)
    }

    pub fn can_transition_to(self, next: AnalysisState) -> bool {
        use AnalysisState::*;

        match (self, next) {
            (from, Aborted) => !from.is_terminal(),
            (Built, Relaxing)
            | (Relaxing, Converged)
            | (Relaxing, CycleFound)
            | (Converged, Reported)
            | (CycleFound, Extracting)
            | (Extracting, Evaluating)
            | (Evaluating, Reported) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AnalysisState::Built => "BUILT",
            AnalysisState::Relaxing => "RELAXING",
            AnalysisState::Converged => "CONVERGED",
            AnalysisState::CycleFound => "CYCLE_FOUND",
            AnalysisState::Extracting => "EXTRACTING",
            AnalysisState::Evaluating => "EVALUATING",
            AnalysisState::Reported => "REPORTED",
            AnalysisState::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// One row of the converged distance table.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRow {
    pub symbol: String,
    /// Summed log weight of the best path from the source; `+∞` if unreachable.
    pub distance: f64,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    pub source: String,
    pub rows: Vec<DistanceRow>,
}

/// Structured result of a completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// No negative cycle reachable from the source.
    NoArbitrage(DistanceTable),
    Arbitrage(ArbitrageReport),
}

/// Trail of states visited plus the final outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub trail: Vec<AnalysisState>,
    pub outcome: Result<Report, Error>,
}

impl Analysis {
    pub fn state(&self) -> AnalysisState {
        self.trail.last().copied().unwrap_or(AnalysisState::Built)
    }

    pub fn report(&self) -> Option<&Report> {
        self.outcome.as_ref().ok()
    }
}

struct Tracker {
    trail: Vec<AnalysisState>,
}

impl Tracker {
    fn new() -> Self {
        Self {
            trail: vec![AnalysisState::Built],
        }
    }

    fn current(&self) -> AnalysisState {
        self.trail[self.trail.len() - 1]
    }

    fn advance(&mut self, next: AnalysisState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "illegal transition {} -> {}",
            current,
            next
        );
        debug!(from = %current, to = %next, "Analysis transition");
        self.trail.push(next);
    }

    fn report(mut self, report: Report) -> Analysis {
        self.advance(AnalysisState::Reported);
        Analysis {
            trail: self.trail,
            outcome: Ok(report),
        }
    }

    fn abort(mut self, error: Error) -> Analysis {
        warn!(state = %self.current(), %error, "Analysis aborted");
        self.advance(AnalysisState::Aborted);
        Analysis {
            trail: self.trail,
            outcome: Err(error),
        }
    }
}

/// Drives relaxation, extraction and evaluation over a built graph.
#[derive(Debug, Clone, Default)]
pub struct Analyzer<S = BellmanFordSolver> {
    solver: S,
}

impl<S> Analyzer<S>
where
    S: ShortestPathSolver,
{
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// Analyzes from the vertex named `symbol`.
    ///
    /// # Errors
    /// Returns `Error::SourceNotFound` before any relaxation if `symbol` is not
    /// a vertex of `graph`.
    pub fn analyze_symbol(&self, graph: &RateGraph, symbol: &str) -> Result<Analysis, Error> {
        let source = graph
            .index_of(symbol)
            .ok_or_else(|| Error::SourceNotFound(symbol.to_string()))?;
        Ok(self.analyze(graph, source))
    }

    /// Runs one full analysis from `source`.
    ///
    /// Failures never escape as `Err`: they end the run in
    /// `AnalysisState::Aborted` with the error as the outcome.
    pub fn analyze(&self, graph: &RateGraph, source: usize) -> Analysis {
        let mut tracker = Tracker::new();
        tracker.advance(AnalysisState::Relaxing);

        let relaxation = match self.solver.run(graph, source) {
            Ok(relaxation) => relaxation,
            Err(e) => return tracker.abort(e),
        };

        match relaxation {
            Relaxation::Converged { distances, parents } => {
                tracker.advance(AnalysisState::Converged);
                info!(source, "No negative cycle reachable from source");
                tracker.report(Report::NoArbitrage(distance_table(
                    graph, source, &distances, &parents,
                )))
            }
            Relaxation::NegativeCycleDetected { witness, parents } => {
                tracker.advance(AnalysisState::CycleFound);
                tracker.advance(AnalysisState::Extracting);

                let cycle = match extract_cycle(&parents, witness, graph.num_vertices()) {
                    Ok(cycle) => cycle.rotated_to(source),
                    Err(e) => return tracker.abort(e),
                };

                tracker.advance(AnalysisState::Evaluating);
                match evaluate(graph, &cycle) {
                    Ok(report) => {
                        info!(
                            path = %report.path_symbols().join(" -> "),
                            multiplier = report.value_multiplier,
                            "Arbitrage cycle found"
                        );
                        tracker.report(Report::Arbitrage(report))
                    }
                    Err(e) => tracker.abort(e),
                }
            }
        }
    }
}

fn distance_table(
    graph: &RateGraph,
    source: usize,
    distances: &[f64],
    parents: &[Option<usize>],
) -> DistanceTable {
    let name = |v: usize| graph.symbol(v).unwrap_or_default().to_string();

    DistanceTable {
        source: name(source),
        rows: distances
            .iter()
            .zip(parents)
            .enumerate()
            .map(|(v, (&distance, parent))| DistanceRow {
                symbol: name(v),
                distance,
                parent: parent.map(name),
            })
            .collect(),
    }
}
