//! Error types for splitter generation and forest training.

use protea_data::DataError;

/// Errors from splitter generation and tree/forest training.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when a node partition holds no member.
    #[error("cannot split an empty node")]
    EmptyNode,

    /// Returned when nb_trees or nb_candidates is zero.
    #[error("{parameter} must be at least 1, got 0")]
    InvalidCount {
        /// The offending parameter name.
        parameter: &'static str,
    },

    /// Data-layer failure (unknown transform, missing label, bad index).
    #[error(transparent)]
    Data(#[from] DataError),
}
