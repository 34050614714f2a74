//! Weighted DTW: every transition cost is scaled by a weight that grows
//! with the distance to the diagonal.

use protea_data::SeriesView;

use crate::cost::ade;
use crate::eap::{eap_dp, resolve_cutoff};

/// Maximum weight reached far from the diagonal.
pub const WDTW_MAX_WEIGHT: f64 = 1.0;

/// Precompute the WDTW weight vector for series of length up to `length`.
///
/// `weights[k] = WMAX / (1 + exp(-g·(k − length/2)))` for the warping
/// distance `k = |i − j|`. Computed once per `(g, length)` and shared
/// read-only across every kernel invocation using it.
#[must_use]
pub fn generate_weights(g: f64, length: usize) -> Vec<f64> {
    let half = length as f64 / 2.0;
    (0..length)
        .map(|k| WDTW_MAX_WEIGHT / (1.0 + (-g * (k as f64 - half)).exp()))
        .collect()
}

/// WDTW distance with cost exponent `exponent` and the given weight
/// vector, which must cover the longer series (`weights.len() >= max
/// length`).
#[must_use]
pub fn wdtw(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    exponent: f64,
    weights: &[f64],
    cutoff: f64,
) -> f64 {
    wdtw_with_buffer(a, b, exponent, weights, cutoff, &mut Vec::new())
}

/// WDTW distance reusing the caller's scratch buffer.
#[must_use]
pub fn wdtw_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    exponent: f64,
    weights: &[f64],
    cutoff: f64,
    buffer: &mut Vec<f64>,
) -> f64 {
    debug_assert_eq!(a.dim(), b.dim());
    let (lines, cols) = if a.length() >= b.length() { (a, b) } else { (b, a) };
    let nblines = lines.length();
    let nbcols = cols.length();
    if nbcols == 0 {
        return if nblines == 0 { 0.0 } else { f64::INFINITY };
    }
    debug_assert!(weights.len() >= nblines);
    let dist = move |i: usize, j: usize| {
        ade(lines.step(i), cols.step(j), exponent) * weights[i.abs_diff(j)]
    };
    let init = dist(0, 0);
    let cutoff = resolve_cutoff(nblines, nbcols, init, &dist, &dist, cutoff);
    eap_dp(nblines, nbcols, nblines, init, dist, dist, dist, cutoff, buffer)
}
