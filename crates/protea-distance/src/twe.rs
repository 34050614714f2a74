//! Time Warp Edit distance.
//!
//! Matches pay the squared difference of the current and previous sample
//! pairs plus a stiffness penalty proportional to the index gap; edit
//! steps pay the squared step within their own series plus `nu + lambda`.
//! The stiffness term `2nu·|i − j|` is charged on every match transition.

use protea_data::SeriesView;

use crate::cost::sqed;
use crate::eap::{eap_dp, resolve_cutoff};

/// TWE distance with stiffness `nu >= 0` and edit penalty `lambda >= 0`.
#[must_use]
pub fn twe(a: SeriesView<'_>, b: SeriesView<'_>, nu: f64, lambda: f64, cutoff: f64) -> f64 {
    twe_with_buffer(a, b, nu, lambda, cutoff, &mut Vec::new())
}

/// TWE distance reusing the caller's scratch buffer.
#[must_use]
pub fn twe_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    nu: f64,
    lambda: f64,
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
    let nu2 = 2.0 * nu;
    let diag = move |i: usize, j: usize| {
        sqed(lines.step(i), cols.step(j))
            + sqed(lines.step(i - 1), cols.step(j - 1))
            + nu2 * i.abs_diff(j) as f64
    };
    let above = move |i: usize, _j: usize| sqed(lines.step(i), lines.step(i - 1)) + nu + lambda;
    let left = move |_i: usize, j: usize| sqed(cols.step(j), cols.step(j - 1)) + nu + lambda;
    let init = sqed(lines.step(0), cols.step(0));
    let cutoff = resolve_cutoff(nblines, nbcols, init, &diag, &above, cutoff);
    eap_dp(nblines, nbcols, nblines, init, diag, above, left, cutoff, buffer)
}
