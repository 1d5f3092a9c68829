use thiserror::Error;

/// Failures of the graph engine and the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Indicates an attempt to access a vertex index that exceeds the graph size (V).
    #[error("Vertex index {0} is out of bounds.")]
    NodeIndexOutOfBounds(usize),

    /// The parent chain behind a negative-cycle witness is broken, so the
    /// cycle cannot be traced. Fatal to the current analysis only.
    #[error("Cycle reconstruction failed: broken parent chain behind witness vertex {witness}.")]
    InvalidWitness { witness: usize },

    /// A cycle step has no matching edge in the graph.
    #[error("No edge from vertex {from} to vertex {to} in the rate graph.")]
    EdgeNotFound { from: usize, to: usize },

    /// The requested analysis source is not a vertex of the built graph.
    #[error("{0} not found in currency index")]
    SourceNotFound(String),

    /// Edges from a vertex to itself carry no conversion and are never stored.
    #[error("Self-loop edge on vertex {0} is not allowed.")]
    SelfLoop(usize),

    /// A vertex sequence that is not a closed walk of at least two edges.
    #[error("Vertex sequence {0:?} is not a closed cycle.")]
    InvalidCycle(Vec<usize>),
}

/// Why a rate provider could not answer for a base currency.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("no rate data returned for base currency {0}")]
    NoData(String),

    #[error("rate request for base currency {base} timed out after {millis} ms")]
    Timeout { base: String, millis: u64 },

    #[error("rate request for base currency {base} failed: {reason}")]
    Transport { base: String, reason: String },
}

/// Recoverable problems met while building a rate graph.
///
/// These never abort a build: the offending base currency or quote is skipped
/// and the issue is reported next to the (partial) graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildIssue {
    #[error("skipping base currency {base}: {cause}")]
    FetchFailure { base: String, cause: FetchError },

    #[error("skipping quote {base} -> {target}: rate {rate} has no logarithm")]
    InvalidRate {
        base: String,
        target: String,
        rate: f64,
    },
}
