//! Per-series transforms applied when deriving datasets.

use crate::error::DataError;
use crate::series::Series;

/// A named, label-preserving series transform.
///
/// Transforms never change a series' length or dimensionality, so dataset
/// headers stay valid across derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Identity.
    Raw,
    /// Slope estimate at every time step (endpoints copy their neighbour).
    Derivative,
    /// Per-dimension standardisation to zero mean and unit variance.
    ZScore,
    /// Per-dimension rescaling into `[0, 1]`.
    MinMax,
    /// Division by the Euclidean norm of the whole series.
    UnitLength,
    /// Per-dimension subtraction of the mean.
    MeanNorm,
}

impl Transform {
    /// Resolve a transform from its name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownTransform`] for unrecognised names.
    pub fn from_name(name: &str) -> Result<Self, DataError> {
        match name {
            "raw" => Ok(Self::Raw),
            "derivative" => Ok(Self::Derivative),
            "zscore" => Ok(Self::ZScore),
            "minmax" => Ok(Self::MinMax),
            "unitlength" => Ok(Self::UnitLength),
            "meannorm" => Ok(Self::MeanNorm),
            _ => Err(DataError::UnknownTransform {
                name: name.to_string(),
            }),
        }
    }

    /// Return the canonical name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Derivative => "derivative",
            Self::ZScore => "zscore",
            Self::MinMax => "minmax",
            Self::UnitLength => "unitlength",
            Self::MeanNorm => "meannorm",
        }
    }

    /// Apply the transform to one series.
    #[must_use]
    pub fn apply(&self, series: &Series) -> Series {
        let out = match self {
            Self::Raw => series.values().to_vec(),
            Self::Derivative => derivative(series),
            Self::ZScore => per_dimension(series, |column| {
                let (mean, sd) = mean_sd(column);
                let sd = if sd > 0.0 { sd } else { 1.0 };
                column.iter_mut().for_each(|v| *v = (*v - mean) / sd);
            }),
            Self::MinMax => per_dimension(series, |column| {
                let min = column.iter().copied().fold(f64::INFINITY, f64::min);
                let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                if range > 0.0 {
                    column.iter_mut().for_each(|v| *v = (*v - min) / range);
                } else {
                    column.iter_mut().for_each(|v| *v = 0.0);
                }
            }),
            Self::UnitLength => {
                let norm = series.values().iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    series.values().iter().map(|v| v / norm).collect()
                } else {
                    series.values().to_vec()
                }
            }
            Self::MeanNorm => per_dimension(series, |column| {
                let (mean, _) = mean_sd(column);
                column.iter_mut().for_each(|v| *v -= mean);
            }),
        };
        series
            .with_values(out)
            .expect("transforms preserve shape and finiteness")
    }
}

/// Length-preserving derivative: interior points get the average of the
/// backward difference and the centred half-difference, endpoints copy
/// their neighbour. Applied independently per dimension.
fn derivative(series: &Series) -> Vec<f64> {
    per_dimension(series, |column| {
        let n = column.len();
        if n < 3 {
            column.iter_mut().for_each(|v| *v = 0.0);
            return;
        }
        let src = column.to_vec();
        for i in 1..n - 1 {
            column[i] = ((src[i] - src[i - 1]) + (src[i + 1] - src[i - 1]) / 2.0) / 2.0;
        }
        column[0] = column[1];
        column[n - 1] = column[n - 2];
    })
}

/// Run `f` over each dimension's column of values, gathered and scattered
/// around the row-major layout.
fn per_dimension(series: &Series, f: impl Fn(&mut Vec<f64>)) -> Vec<f64> {
    let dim = series.dim();
    let n = series.length();
    let values = series.values();
    let mut out = values.to_vec();
    for d in 0..dim {
        let mut column: Vec<f64> = (0..n).map(|i| values[i * dim + d]).collect();
        f(&mut column);
        for (i, v) in column.into_iter().enumerate() {
            out[i * dim + d] = v;
        }
    }
    out
}

fn mean_sd(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
