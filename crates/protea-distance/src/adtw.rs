//! Amerced DTW: off-diagonal transitions pay an additive penalty.

use protea_data::SeriesView;

use crate::cost::ade;
use crate::eap::{eap_dp, resolve_cutoff};

/// ADTW distance with cost exponent `exponent` and warping penalty
/// `penalty >= 0` added to every vertical or horizontal transition.
#[must_use]
pub fn adtw(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    exponent: f64,
    penalty: f64,
    cutoff: f64,
) -> f64 {
    adtw_with_buffer(a, b, exponent, penalty, cutoff, &mut Vec::new())
}

/// ADTW distance reusing the caller's scratch buffer.
#[must_use]
pub fn adtw_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    exponent: f64,
    penalty: f64,
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
    let diag = move |i: usize, j: usize| ade(lines.step(i), cols.step(j), exponent);
    let warp = move |i: usize, j: usize| ade(lines.step(i), cols.step(j), exponent) + penalty;
    let init = diag(0, 0);
    let cutoff = resolve_cutoff(nblines, nbcols, init, &diag, &warp, cutoff);
    eap_dp(nblines, nbcols, nblines, init, diag, warp, warp, cutoff, buffer)
}
