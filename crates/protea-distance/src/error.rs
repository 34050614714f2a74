//! Error types for kernel parameterization.

/// Errors from building or validating a distance parameterization.
///
/// Numerical conditions inside a kernel (early abandon, no valid
/// alignment) are never errors: they come back as `+INF` values.
#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    /// Returned when a kernel parameter is out of its domain.
    #[error("{distance}: parameter '{parameter}' is invalid: {value}")]
    InvalidParameter {
        /// Kernel name.
        distance: &'static str,
        /// Offending parameter name.
        parameter: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Returned when a distance name is not recognised.
    #[error("unknown distance '{name}'")]
    UnknownDistance {
        /// The unrecognised name.
        name: String,
    },
}
