//! Dynamic Time Warping, unconstrained and with a Sakoe-Chiba band.

use protea_data::SeriesView;

use crate::cost::ade;
use crate::eap::{eap_dp, resolve_cutoff};

/// DTW distance with cost exponent `exponent` and full warping window.
///
/// Allocates a scratch buffer; use [`dtw_with_buffer`] on the hot path.
#[must_use]
pub fn dtw(a: SeriesView<'_>, b: SeriesView<'_>, exponent: f64, cutoff: f64) -> f64 {
    dtw_with_buffer(a, b, exponent, cutoff, &mut Vec::new())
}

/// DTW distance reusing the caller's scratch buffer.
#[must_use]
pub fn dtw_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    exponent: f64,
    cutoff: f64,
    buffer: &mut Vec<f64>,
) -> f64 {
    banded(a, b, usize::MAX, exponent, cutoff, buffer)
}

/// Constrained DTW: column `j` is reachable from row `i` only when
/// `|i − j| <= window`. Returns `+INF` when the length difference exceeds
/// the window. A window of at least the longer length is equivalent to
/// unconstrained [`dtw`].
#[must_use]
pub fn cdtw(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    window: usize,
    exponent: f64,
    cutoff: f64,
) -> f64 {
    cdtw_with_buffer(a, b, window, exponent, cutoff, &mut Vec::new())
}

/// Constrained DTW reusing the caller's scratch buffer.
#[must_use]
pub fn cdtw_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    window: usize,
    exponent: f64,
    cutoff: f64,
    buffer: &mut Vec<f64>,
) -> f64 {
    banded(a, b, window, exponent, cutoff, buffer)
}

fn banded(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    window: usize,
    exponent: f64,
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
    let window = window.min(nblines);
    if nblines - nbcols > window {
        return f64::INFINITY;
    }
    let dist = move |i: usize, j: usize| ade(lines.step(i), cols.step(j), exponent);
    let init = dist(0, 0);
    let cutoff = resolve_cutoff(nblines, nbcols, init, &dist, &dist, cutoff);
    eap_dp(nblines, nbcols, window, init, dist, dist, dist, cutoff, buffer)
}
