//! Error types for the LOOCV engine.

/// Errors from the LOOCV engine.
///
/// A query whose distances are all `+INF` under some parameter is not an
/// error: it is predicted at random and counted in
/// [`crate::EvalReport::nb_degenerate`].
#[derive(Debug, thiserror::Error)]
pub enum LoocvError {
    /// Returned for malformed inputs: an empty parameter grid, mismatched
    /// dimensionality, unlabeled series, or an out-of-domain kernel
    /// parameter.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Human-readable description naming the offending input.
        reason: String,
    },

    /// Returned after a cancel signal or an exceeded deadline; checked
    /// between work items, so in-flight kernel calls complete first.
    #[error("evaluation cancelled")]
    Cancelled,

    /// Returned on engine failures such as a poisoned table lock or a
    /// thread-pool build failure.
    #[error("internal error: {reason}")]
    Internal {
        /// Human-readable description of the failure.
        reason: String,
    },
}
