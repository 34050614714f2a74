//! Point-to-point cost functions shared by the kernels.
//!
//! For univariate series these reduce to powers of the absolute difference;
//! for multivariate series the Euclidean norm over the dimensions is raised
//! to the exponent. `e = 1` and `e = 2` take fast paths (`e = 2` skips the
//! square root entirely).

/// `‖a − b‖^e` between two same-dimensionality samples.
#[inline]
pub(crate) fn ade(a: &[f64], b: &[f64], exponent: f64) -> f64 {
    if a.len() == 1 {
        let d = (a[0] - b[0]).abs();
        powe(d, exponent)
    } else {
        let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
        if exponent == 2.0 { sq } else { powe(sq.sqrt(), exponent) }
    }
}

/// `‖a − gv·1‖^e` between a sample and the constant gap sample.
#[inline]
pub(crate) fn ade_gap(a: &[f64], gap_value: f64, exponent: f64) -> f64 {
    if a.len() == 1 {
        powe((a[0] - gap_value).abs(), exponent)
    } else {
        let sq: f64 = a.iter().map(|x| (x - gap_value) * (x - gap_value)).sum();
        if exponent == 2.0 { sq } else { powe(sq.sqrt(), exponent) }
    }
}

/// `‖a − b‖`, the plain Euclidean norm of the difference.
#[inline]
pub(crate) fn ad1(a: &[f64], b: &[f64]) -> f64 {
    if a.len() == 1 {
        (a[0] - b[0]).abs()
    } else {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

/// `‖a − b‖²`, the squared Euclidean difference used by TWE.
#[inline]
pub(crate) fn sqed(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
fn powe(base: f64, exponent: f64) -> f64 {
    if exponent == 1.0 {
        base
    } else if exponent == 2.0 {
        base * base
    } else {
        base.powf(exponent)
    }
}
