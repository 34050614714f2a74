//! Shape-Based Distance: one minus the maximum normalised cross-correlation
//! over all shifts.

use protea_data::SeriesView;

/// SBD between two series: `1 − max_s NCC(A, B, s)` where the
/// cross-correlation slides `B` across `A` over every overlapping shift.
///
/// Values lie in `[0, 2]`; identical shapes (up to scale) approach 0. The
/// kernel takes no cutoff: the correlation has to visit every shift anyway.
#[must_use]
pub fn sbd(a: SeriesView<'_>, b: SeriesView<'_>) -> f64 {
    debug_assert_eq!(a.dim(), b.dim());
    let n = a.length();
    let m = b.length();
    if n == 0 || m == 0 {
        return if n == 0 && m == 0 { 0.0 } else { f64::INFINITY };
    }
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        // Flat zero series: identical shapes score 0, anything else is
        // fully uncorrelated.
        return if norm_a == 0.0 && norm_b == 0.0 { 0.0 } else { 1.0 };
    }
    let denom = norm_a * norm_b;
    let mut best = f64::NEG_INFINITY;
    for shift in -(m as isize - 1)..n as isize {
        let mut cc = 0.0;
        for t in 0..n {
            let u = t as isize - shift;
            if u >= 0 && (u as usize) < m {
                cc += dot(a.step(t), b.step(u as usize));
            }
        }
        best = best.max(cc / denom);
    }
    (1.0 - best).max(0.0)
}

fn norm(s: SeriesView<'_>) -> f64 {
    s.values().iter().map(|v| v * v).sum::<f64>().sqrt()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni(values: &[f64]) -> SeriesView<'_> {
        SeriesView::univariate(values)
    }

    #[test]
    fn identity_is_zero() {
        let s = [1.0, 2.0, 3.0, 2.0];
        assert!(sbd(uni(&s), uni(&s)) < 1e-12);
    }

    #[test]
    fn scaling_does_not_change_shape() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert!(sbd(uni(&a), uni(&b)) < 1e-12);
    }

    #[test]
    fn shifted_shape_is_recovered() {
        // The same pulse, shifted by two samples: the best shift realigns
        // it exactly.
        let a = [0.0, 0.0, 1.0, 2.0, 1.0, 0.0];
        let b = [1.0, 2.0, 1.0, 0.0, 0.0, 0.0];
        assert!(sbd(uni(&a), uni(&b)) < 1e-12);
    }

    #[test]
    fn anticorrelated_shapes_score_above_one() {
        // Opposite-sign constants correlate negatively at every shift.
        let a = [1.0, 1.0];
        let b = [-1.0, -1.0];
        let v = sbd(uni(&a), uni(&b));
        assert!(v > 1.0);
    }

    #[test]
    fn symmetry() {
        let a = [1.0, 3.0, 2.0, 0.0];
        let b = [0.0, 2.0, 3.0];
        assert!((sbd(uni(&a), uni(&b)) - sbd(uni(&b), uni(&a))).abs() < 1e-12);
    }

    #[test]
    fn zero_series_semantics() {
        assert_eq!(sbd(uni(&[0.0, 0.0]), uni(&[0.0, 0.0])), 0.0);
        assert_eq!(sbd(uni(&[0.0, 0.0]), uni(&[1.0, 2.0])), 1.0);
        assert_eq!(sbd(uni(&[]), uni(&[])), 0.0);
        assert_eq!(sbd(uni(&[]), uni(&[1.0])), f64::INFINITY);
    }
}
