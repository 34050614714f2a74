//! Series types with validation guarantees.

use crate::error::DataError;

/// Owned, validated time series. All values finite; the flat buffer holds
/// `length * dim` values in row-major order (one row per time step).
///
/// A series may be empty (`length == 0`); the distance kernels give empty
/// series a defined meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    dim: usize,
    label: Option<String>,
}

impl Series {
    /// Create a univariate series without a label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn univariate(values: Vec<f64>) -> Result<Self, DataError> {
        Self::new(values, 1, None)
    }

    /// Create a series with an explicit dimensionality and optional label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::ZeroDimension`] | `dim == 0` |
    /// | [`DataError::ShapeMismatch`] | `values.len()` is not a multiple of `dim` |
    /// | [`DataError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>, dim: usize, label: Option<String>) -> Result<Self, DataError> {
        if dim == 0 {
            return Err(DataError::ZeroDimension);
        }
        if values.len() % dim != 0 {
            return Err(DataError::ShapeMismatch {
                len: values.len(),
                dim,
            });
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFiniteValue { position });
        }
        Ok(Self { values, dim, label })
    }

    /// Borrow this series as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SeriesView<'_> {
        SeriesView {
            values: &self.values,
            dim: self.dim,
        }
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn length(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return the dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the class label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Return the flat row-major buffer.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Replace the values, keeping dimensionality and label.
    ///
    /// Used by transforms, which map the buffer point-wise or per time step.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Series::new`].
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, DataError> {
        Self::new(values, self.dim, self.label.clone())
    }
}

/// Borrowed, zero-copy view into a series used on the kernel hot path.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    values: &'a [f64],
    dim: usize,
}

impl<'a> SeriesView<'a> {
    /// Create a view over a flat univariate slice.
    #[must_use]
    pub fn univariate(values: &'a [f64]) -> Self {
        Self { values, dim: 1 }
    }

    /// Create a view over a flat row-major slice.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::ZeroDimension`] | `dim == 0` |
    /// | [`DataError::ShapeMismatch`] | `values.len()` is not a multiple of `dim` |
    pub fn new(values: &'a [f64], dim: usize) -> Result<Self, DataError> {
        if dim == 0 {
            return Err(DataError::ZeroDimension);
        }
        if values.len() % dim != 0 {
            return Err(DataError::ShapeMismatch {
                len: values.len(),
                dim,
            });
        }
        Ok(Self { values, dim })
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn length(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return the dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the flat row-major buffer.
    #[must_use]
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Return the sample at time step `i` (a `dim`-long slice).
    #[must_use]
    pub fn step(&self, i: usize) -> &'a [f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }
}
