//! Lockstep baselines without pruning.

use protea_data::SeriesView;

use crate::cost::{ad1, ade};

/// Lorentzian distance: `Σ ln(1 + ‖A[i] − B[i]‖)` over aligned positions.
///
/// Series of different lengths score `+INF`.
#[must_use]
pub fn lorentzian(a: SeriesView<'_>, b: SeriesView<'_>) -> f64 {
    debug_assert_eq!(a.dim(), b.dim());
    let n = a.length();
    if n != b.length() {
        return f64::INFINITY;
    }
    (0..n)
        .map(|i| (1.0 + ad1(a.step(i), b.step(i))).ln())
        .sum()
}

/// Modified Minkowski distance: `Σ ‖A[i] − B[i]‖^e` without taking the
/// e-th root of the result.
///
/// Series of different lengths score `+INF`.
#[must_use]
pub fn modminkowski(a: SeriesView<'_>, b: SeriesView<'_>, exponent: f64) -> f64 {
    debug_assert_eq!(a.dim(), b.dim());
    let n = a.length();
    if n != b.length() {
        return f64::INFINITY;
    }
    (0..n).map(|i| ade(a.step(i), b.step(i), exponent)).sum()
}
