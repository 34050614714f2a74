//! Edit distance with Real Penalty: unmatched samples pay the cost of
//! aligning against a constant gap value.

use protea_data::SeriesView;

use crate::cost::{ade, ade_gap};
use crate::eap::{eap_dp, resolve_cutoff};

/// ERP distance with gap value `gap_value`, Sakoe-Chiba window `window`,
/// and cost exponent `exponent`.
///
/// The computation runs over the bordered edit matrix: row and column zero
/// accumulate pure gap costs, so an alignment may open with gaps on either
/// side. The window applies to the bordered coordinates, and `+INF` is
/// returned when the length difference exceeds the window.
#[must_use]
pub fn erp(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    gap_value: f64,
    window: usize,
    exponent: f64,
    cutoff: f64,
) -> f64 {
    erp_with_buffer(a, b, gap_value, window, exponent, cutoff, &mut Vec::new())
}

/// ERP distance reusing the caller's scratch buffer.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn erp_with_buffer(
    a: SeriesView<'_>,
    b: SeriesView<'_>,
    gap_value: f64,
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
    // Bordered matrix: data cell (i, j) sits at (i + 1, j + 1).
    let diag = move |i: usize, j: usize| ade(lines.step(i - 1), cols.step(j - 1), exponent);
    let gap_line = move |i: usize, _j: usize| ade_gap(lines.step(i - 1), gap_value, exponent);
    let gap_col = move |_i: usize, j: usize| ade_gap(cols.step(j - 1), gap_value, exponent);
    let cutoff = resolve_cutoff(nblines + 1, nbcols + 1, 0.0, &diag, &gap_line, cutoff);
    eap_dp(
        nblines + 1,
        nbcols + 1,
        window,
        0.0,
        diag,
        gap_line,
        gap_col,
        cutoff,
        buffer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: f64 = f64::INFINITY;

    fn uni(values: &[f64]) -> SeriesView<'_> {
        SeriesView::univariate(values)
    }

    #[test]
    fn identity_is_zero() {
        let s = [1.0, 2.0, 3.0, 2.0];
        assert_eq!(erp(uni(&s), uni(&s), 0.5, 4, 2.0, INF), 0.0);
    }

    #[test]
    fn trailing_samples_pay_the_gap() {
        // [1,2] vs [1]: align the 1s, then 2 is gapped against gv=0 with
        // e=1, costing |2 - 0| = 2.
        let v = erp(uni(&[1.0, 2.0]), uni(&[1.0]), 0.0, 2, 1.0, INF);
        assert_eq!(v, 2.0);
    }

    #[test]
    fn all_gaps_when_other_is_far() {
        // [1,2] vs [0] with gv=0, e=1: best is gap both (1+2) vs align one
        // (1 + 2 or 2 + 1): all options cost 3.
        let v = erp(uni(&[1.0, 2.0]), uni(&[0.0]), 0.0, 2, 1.0, INF);
        assert_eq!(v, 3.0);
    }

    #[test]
    fn symmetry() {
        let a = [1.0, 0.0, 2.0, 1.5];
        let b = [2.0, 1.0, 0.0];
        assert_eq!(
            erp(uni(&a), uni(&b), 0.3, 4, 2.0, INF),
            erp(uni(&b), uni(&a), 0.3, 4, 2.0, INF)
        );
    }

    #[test]
    fn window_smaller_than_length_difference() {
        assert_eq!(
            erp(uni(&[1.0, 2.0, 3.0, 4.0]), uni(&[1.0]), 0.0, 2, 2.0, INF),
            INF
        );
    }

    #[test]
    fn empty_semantics() {
        assert_eq!(erp(uni(&[]), uni(&[]), 0.0, 1, 2.0, INF), 0.0);
        assert_eq!(erp(uni(&[]), uni(&[1.0]), 0.0, 1, 2.0, INF), INF);
    }

    #[test]
    fn early_abandon() {
        let a = [1.0, 2.0, 0.0, 3.0, 1.0];
        let b = [0.0, 1.0, 2.0, 1.0];
        let v = erp(uni(&a), uni(&b), 0.2, 5, 2.0, INF);
        assert!(v > 0.0);
        assert_eq!(erp(uni(&a), uni(&b), 0.2, 5, 2.0, v / 2.0), INF);
        assert_eq!(erp(uni(&a), uni(&b), 0.2, 5, 2.0, v), v);
    }
}
