//! Error types for the data layer.

/// Errors from series and dataset construction.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when a series buffer size is not a multiple of its dimensionality.
    #[error("series buffer of {len} values is not a multiple of dimensionality {dim}")]
    ShapeMismatch {
        /// Number of values in the buffer.
        len: usize,
        /// Requested dimensionality.
        dim: usize,
    },

    /// Returned when a series dimensionality is zero.
    #[error("series dimensionality must be at least 1")]
    ZeroDimension,

    /// Returned when a series contains NaN, infinity, or negative infinity.
    #[error("series contains non-finite value at position {position}")]
    NonFiniteValue {
        /// Position of the first non-finite value in the flat buffer.
        position: usize,
    },

    /// Returned when a dataset is built from series of differing dimensionality.
    #[error("series {index} has dimensionality {got}, expected {expected}")]
    DimensionMismatch {
        /// The dimensionality of the first series.
        expected: usize,
        /// The offending dimensionality.
        got: usize,
        /// Zero-based position of the offending series.
        index: usize,
    },

    /// Returned when a dataset is built with no series.
    #[error("dataset must contain at least one series")]
    EmptyDataset,

    /// Returned when an index refers past the end of the dataset.
    #[error("index {index} out of bounds for dataset of size {size}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The dataset size.
        size: usize,
    },

    /// Returned when a series referenced by a class partition carries no label.
    #[error("series {index} has no label")]
    MissingLabel {
        /// Zero-based position of the unlabeled series.
        index: usize,
    },

    /// Returned when a transform name is not recognised.
    #[error("unknown transform '{name}'")]
    UnknownTransform {
        /// The unrecognised name.
        name: String,
    },
}
