use super::graph::RateGraph;
use super::traits::ShortestPathSolver;
use common::error::Error;
use common::numeric_kernel::DEFAULT_RELAXATION_TOLERANCE;
use std::f64;
use tracing::debug;

/// Outcome of one single-source relaxation run.
#[derive(Debug, Clone, PartialEq)]
pub enum Relaxation {
    /// No negative cycle is reachable; `distances[v]` is `+∞` for unreachable vertices.
    Converged {
        distances: Vec<f64>,
        parents: Vec<Option<usize>>,
    },
    /// An edge still relaxed after `V - 1` passes. `witness` is its target:
    /// reachable from a negative cycle, not necessarily on it.
    NegativeCycleDetected {
        witness: usize,
        parents: Vec<Option<usize>>,
    },
}

/// Bellman-Ford over the graph's edge list, in insertion order.
///
/// Every run owns fresh distance and parent arrays, so the solver itself is
/// stateless and a run is fully determined by the graph and the source.
#[derive(Debug, Clone, Copy)]
pub struct BellmanFordSolver {
    /// An edge relaxes only if it improves a distance by more than this.
    pub relaxation_tolerance: f64,
}

impl Default for BellmanFordSolver {
    fn default() -> Self {
        Self {
            relaxation_tolerance: DEFAULT_RELAXATION_TOLERANCE,
        }
    }
}

impl BellmanFordSolver {
    pub fn new(relaxation_tolerance: f64) -> Self {
        Self {
            relaxation_tolerance,
        }
    }

    /// Bare `distance[u] + w < distance[v]`, no slack.
    pub fn strict() -> Self {
        Self::new(0.0)
    }

    fn relaxes(&self, distance_u: f64, weight: f64, distance_v: f64) -> Option<f64> {
        if !distance_u.is_finite() {
            return None;
        }
        let candidate = distance_u + weight;
        (candidate < distance_v - self.relaxation_tolerance).then_some(candidate)
    }
}

impl ShortestPathSolver for BellmanFordSolver {
    /// Runs `V - 1` full passes over every edge, then one detection pass.
    ///
    /// # Parameters
    /// - `graph`: the rate graph; its edge order fixes the relaxation order.
    /// - `source`: starting vertex index.
    ///
    /// # Returns
    /// - `Ok(Relaxation::Converged { .. })` → distances and parents from `source`.
    /// - `Ok(Relaxation::NegativeCycleDetected { .. })` → witness and parents.
    /// - `Err(Error::NodeIndexOutOfBounds)` → `source` is not a vertex.
    fn run(&self, graph: &RateGraph, source: usize) -> Result<Relaxation, Error> {
        let num_vertices = graph.num_vertices();
        if source >= num_vertices {
            return Err(Error::NodeIndexOutOfBounds(source));
        }

        let mut distance = vec![f64::INFINITY; num_vertices];
        let mut parent: Vec<Option<usize>> = vec![None; num_vertices];
        distance[source] = 0.0;

        let mut passes = 0;
        for _ in 1..num_vertices {
            passes += 1;
            let mut updated = false;

            for edge in graph.edges() {
                if let Some(candidate) =
                    self.relaxes(distance[edge.from], edge.weight, distance[edge.to])
                {
                    distance[edge.to] = candidate;
                    parent[edge.to] = Some(edge.from);
                    updated = true;
                }
            }

            // A quiet pass means every later pass is quiet too.
            if !updated {
                break;
            }
        }

        // Detection pass: the first edge that still relaxes names the witness.
        // Recording its parent keeps the chain behind the witness defined.
        for edge in graph.edges() {
            if self
                .relaxes(distance[edge.from], edge.weight, distance[edge.to])
                .is_some()
            {
                parent[edge.to] = Some(edge.from);
                debug!(passes, witness = edge.to, "Negative cycle detected");
                return Ok(Relaxation::NegativeCycleDetected {
                    witness: edge.to,
                    parents: parent,
                });
            }
        }

        debug!(passes, "Relaxation converged");
        Ok(Relaxation::Converged {
            distances: distance,
            parents: parent,
        })
    }
}
