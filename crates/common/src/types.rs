use std::collections::BTreeMap;

use crate::error::Error;

/// Quoted rates for one base currency: target symbol -> units of target per 1 unit of base.
///
/// Ordered by symbol so that a given provider answer always yields the same
/// edge insertion order.
pub type RateTable = BTreeMap<String, f64>;

/// A log-weighted conversion edge.
///
/// `weight = -ln(rate)`, so summing weights along a path gives `-ln` of the
/// compounded rate and a negative cycle is a loop whose rate product exceeds 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

impl DirectedEdge {
    pub fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// Recovers the quoted rate from the stored weight.
    pub fn rate(&self) -> f64 {
        (-self.weight).exp()
    }
}

/// A closed walk of vertex indices: first element equals last, at least two edges.
///
/// Example:
/// ```text
/// [0, 1, 2, 0]  ->  0 -> 1 -> 2 -> 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle(Vec<usize>);

impl Cycle {
    /// Validates and wraps a closed walk.
    ///
    /// # Errors
    /// Returns `Error::InvalidCycle` if the walk has fewer than 3 elements or
    /// does not end where it starts.
    pub fn from_closed_walk(vertices: Vec<usize>) -> Result<Self, Error> {
        if vertices.len() < 3 || vertices.first() != vertices.last() {
            return Err(Error::InvalidCycle(vertices));
        }
        Ok(Self(vertices))
    }

    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    pub fn start(&self) -> usize {
        self.0[0]
    }

    /// Number of conversions in the loop.
    pub fn hop_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Consecutive `(from, to)` pairs in traversal order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.0.contains(&vertex)
    }

    /// Re-starts the loop at `vertex`, keeping the traversal direction.
    ///
    /// Returns the cycle unchanged when `vertex` is not on it.
    pub fn rotated_to(&self, vertex: usize) -> Self {
        let open = &self.0[..self.0.len() - 1];
        let Some(pos) = open.iter().position(|&v| v == vertex) else {
            return self.clone();
        };

        let mut rotated = Vec::with_capacity(self.0.len());
        rotated.extend_from_slice(&open[pos..]);
        rotated.extend_from_slice(&open[..pos]);
        rotated.push(vertex);
        Self(rotated)
    }
}
