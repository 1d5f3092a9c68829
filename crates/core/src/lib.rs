//! Currency-arbitrage engine: log-weighted rate graph, Bellman-Ford relaxation,
//! negative-cycle extraction and profit evaluation.

pub mod cycle;
pub mod evaluator;
pub mod graph;
pub mod pipeline;
pub mod solver;
pub mod traits;

pub use graph::{DuplicatePolicy, GraphBuilder, RateGraph};
pub use pipeline::{Analysis, AnalysisState, Analyzer, Report};
pub use solver::{BellmanFordSolver, Relaxation};
