use super::graph::RateGraph;
use common::numeric_kernel::{RATE_TOLERANCE, compound, weight_to_rate};
use common::{Cycle, error::Error};

/// One conversion inside an arbitrage loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStep {
    pub from: String,
    pub to: String,
    /// Units of `to` per unit of `from`.
    pub rate: f64,
    /// Value held after this conversion, starting from 1 unit of the loop's first currency.
    pub running_value: f64,
}

/// A detected loop, re-expressed in rates.
///
/// Internally the loop is judged by its summed log weight `Σ w_i` with
/// `w_i = -ln(rate_i)`; the multiplier is recovered as `e^(-Σ w_i)`.
///
/// Example:
/// ```text
/// rates [0.9, 0.8, 1.45]  (∏ = 1.044)
/// total_log_weight = -ln(1.044) ≈ -0.0431
/// value_multiplier = exp(0.0431) = 1.044
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageReport {
    pub cycle: Cycle,
    pub steps: Vec<ConversionStep>,
    pub total_log_weight: f64,
    pub value_multiplier: f64,
    pub net_gain: f64,
}

impl ArbitrageReport {
    /// Currency symbols along the loop, start repeated at the end.
    pub fn path_symbols(&self) -> Vec<&str> {
        let mut path: Vec<&str> = self.steps.iter().map(|s| s.from.as_str()).collect();
        if let Some(first) = self.steps.first() {
            path.push(first.from.as_str());
        }
        path
    }

    pub fn start_symbol(&self) -> Option<&str> {
        self.steps.first().map(|s| s.from.as_str())
    }

    pub fn hop_count(&self) -> usize {
        self.steps.len()
    }

    /// True if the loop returns more than it started with (beyond `1e-9`).
    pub fn is_profitable(&self) -> bool {
        self.value_multiplier > 1.0 + RATE_TOLERANCE
    }

    pub fn profit_percentage(&self) -> f64 {
        self.net_gain * 100.0
    }
}

/// Converts a cycle of vertex indices back into rates and a value multiplier.
///
/// Each step uses the cheapest `from -> to` edge stored in the graph, which
/// is the only one unless duplicates were kept.
///
/// # Errors
/// Returns `Error::EdgeNotFound` for a step with no edge, or
/// `Error::NodeIndexOutOfBounds` for a vertex outside the graph.
pub fn evaluate(graph: &RateGraph, cycle: &Cycle) -> Result<ArbitrageReport, Error> {
    let symbol = |v: usize| {
        graph
            .symbol(v)
            .map(str::to_string)
            .ok_or(Error::NodeIndexOutOfBounds(v))
    };

    let mut steps = Vec::with_capacity(cycle.hop_count());
    let mut weights = Vec::with_capacity(cycle.hop_count());
    let mut running_value = 1.0;

    for (from, to) in cycle.edges() {
        let weight = graph
            .cheapest_edge_weight(from, to)
            .ok_or(Error::EdgeNotFound { from, to })?;
        let rate = weight_to_rate(weight);
        running_value *= rate;

        weights.push(weight);
        steps.push(ConversionStep {
            from: symbol(from)?,
            to: symbol(to)?,
            rate,
            running_value,
        });
    }

    let (total_log_weight, value_multiplier) = compound(weights);

    Ok(ArbitrageReport {
        cycle: cycle.clone(),
        steps,
        total_log_weight,
        value_multiplier,
        net_gain: value_multiplier - 1.0,
    })
}
