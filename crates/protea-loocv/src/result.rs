//! Result types for the LOOCV engine.

use std::time::Duration;

use protea_distance::Distance;
use serde_json::{Value, json};

/// Nearest-neighbour outcome for one query under the winning parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNn {
    /// Distance to the nearest neighbour (`+INF` for a degenerate query).
    pub distance: f64,
    /// Predicted dense label index.
    pub predicted: usize,
    /// True dense label index.
    pub actual: usize,
}

/// Outcome of one evaluation pass (training LOOCV or test NN1).
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Number of correctly classified queries.
    pub nb_correct: usize,
    /// Number of queries evaluated.
    pub size: usize,
    /// `nb_correct / size`.
    pub accuracy: f64,
    /// Queries whose distances were all `+INF` (predicted at random).
    pub nb_degenerate: usize,
    /// Wall time of the pass.
    pub time: Duration,
    /// Per-query nearest-neighbour diagnostics.
    pub per_query: Vec<QueryNn>,
}

impl EvalReport {
    /// Render the boundary JSON record.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "nb_correct": self.nb_correct,
            "accuracy": self.accuracy,
            "time_ns": self.time.as_nanos() as u64,
        })
    }
}

/// Outcome of the full parameter search.
#[derive(Debug, Clone)]
pub struct LoocvOutcome {
    /// Index of the winning parameter in the grid.
    pub best_index: usize,
    /// The winning parameterization.
    pub best: Distance,
    /// Training LOOCV result under the winning parameter.
    pub train: EvalReport,
    /// Test NN1 result under the winning parameter.
    pub test: EvalReport,
}

impl LoocvOutcome {
    /// Render the boundary JSON record: status, distance, and the two
    /// evaluation reports.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "status": "success",
            "distance": { "name": self.best.name(), "params": self.best.params() },
            "loocv_train": self.train.to_json(),
            "loocv_test": self.test.to_json(),
        })
    }
}
