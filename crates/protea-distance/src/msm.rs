//! Move-Split-Merge distance.
//!
//! Diagonal transitions move a point onto its counterpart and cost the
//! plain difference; vertical and horizontal transitions split or merge a
//! point and cost the constant `c`, plus a surcharge when the inserted
//! point does not sit between its two neighbours.

use protea_data::SeriesView;

use crate::cost::ad1;
use crate::eap::{eap_dp, resolve_cutoff};

/// MSM distance with split/merge cost `cost`.
#[must_use]
pub fn msm(a: SeriesView<'_>, b: SeriesView<'_>, cost: f64, cutoff: f64) -> f64 {
    msm_with_buffer(a, b, cost, cutoff, &mut Vec::new())
}

/// MSM distance reusing the caller's scratch buffer.
#[must_use]
pub fn msm_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    cost: f64,
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
    let diag = move |i: usize, j: usize| ad1(lines.step(i), cols.step(j));
    // Above: a point of the line series is split/merged between its
    // predecessor and the current column sample.
    let above = move |i: usize, j: usize| {
        split_merge_cost(lines.step(i), lines.step(i - 1), cols.step(j), cost)
    };
    // Left: symmetric, on the column series.
    let left = move |i: usize, j: usize| {
        split_merge_cost(cols.step(j), cols.step(j - 1), lines.step(i), cost)
    };
    let init = diag(0, 0);
    let cutoff = resolve_cutoff(nblines, nbcols, init, &diag, &above, cutoff);
    eap_dp(nblines, nbcols, nblines, init, diag, above, left, cutoff, buffer)
}

/// Cost of inserting `new` relative to its in-series neighbour `prev` and
/// the other series' sample `other`.
///
/// Univariate: `c` when `new` lies between `prev` and `other`, otherwise
/// `c` plus the distance to the nearer of the two. Multivariate: the
/// "between" test becomes membership of the hypersphere whose poles are
/// `prev` and `other`.
fn split_merge_cost(new: &[f64], prev: &[f64], other: &[f64], c: f64) -> f64 {
    if new.len() == 1 {
        let xnew = new[0];
        let xi = prev[0];
        let yj = other[0];
        if (xi <= xnew && xnew <= yj) || (yj <= xnew && xnew <= xi) {
            c
        } else {
            c + (xnew - xi).abs().min((xnew - yj).abs())
        }
    } else {
        let radius = ad1(prev, other) / 2.0;
        let dist_to_mid = prev
            .iter()
            .zip(other)
            .zip(new)
            .map(|((p, o), n)| {
                let mid = (p + o) / 2.0;
                (n - mid) * (n - mid)
            })
            .sum::<f64>()
            .sqrt();
        if dist_to_mid <= radius {
            c
        } else {
            c + ad1(new, prev).min(ad1(new, other))
        }
    }
}
