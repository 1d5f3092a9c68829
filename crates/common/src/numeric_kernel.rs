use std::f64;

/// Tolerance for reciprocal-edge and profitability checks.
pub const RATE_TOLERANCE: f64 = 1e-9;

/// Default slack on the Bellman-Ford relaxation test.
///
/// `(x + w) - w` can land one ulp below `x`, which would make every zero-weight
/// reciprocal pair look like a negative 2-cycle under a bare `<`.
pub const DEFAULT_RELAXATION_TOLERANCE: f64 = 1e-12;

/// Log-weight transform `w = -ln(rate)`.
///
/// Returns `None` for rates with no usable logarithm (non-positive, NaN or infinite).
pub fn rate_to_weight(rate: f64) -> Option<f64> {
    if rate.is_finite() && rate > 0.0 {
        Some(-rate.ln())
    } else {
        None
    }
}

/// Inverse of [`rate_to_weight`]: `rate = e^(-w)`.
pub fn weight_to_rate(weight: f64) -> f64 {
    (-weight).exp()
}

/// Compounds a sequence of log weights.
///
/// Multiplication via log-space addition (sum of `-ln(rate_i)`) keeps long
/// loops of near-1.0 rates from drifting. Returns `(Σ w_i, ∏ rate_i)`.
pub fn compound(weights: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let total: f64 = weights.into_iter().sum();
    (total, weight_to_rate(total))
}

/// Absolute-difference comparison.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
