//! Leave-one-out cross-validation over a grid of distance parameters.
//!
//! The engine fills a shared `N x K` table of per-query best-so-far
//! distances by scheduling `(query, candidate)` pairs across a thread
//! pool: every completed evaluation tightens the cutoff that future
//! evaluations of the same cell run under, so ordering the grid from
//! cheap/strict to expensive/loose lets early parameters prune the rest.
//! The winning parameter is then scored once against the test set.

mod engine;
mod error;
mod reporter;
mod result;

pub use engine::{CancelToken, LoocvConfig, loocv};
pub use error::LoocvError;
pub use reporter::{CollectingReporter, Reporter};
pub use result::{EvalReport, LoocvOutcome, QueryNn};
