//! Majority-vote forests of proximity trees.

use protea_data::Dataset;
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::error::ForestError;
use crate::sampler::SamplerConfig;
use crate::state::TreeState;
use crate::tree::{ProximityTree, ProximityTreeConfig};

/// Configuration for training a proximity forest.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `nb_trees`      | 100     |
/// | `nb_candidates` | 5       |
/// | `seed`          | 42      |
#[derive(Debug, Clone)]
pub struct ProximityForestConfig {
    nb_trees: usize,
    nb_candidates: usize,
    seed: u64,
}

impl ProximityForestConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nb_trees: 100,
            nb_candidates: 5,
            seed: 42,
        }
    }

    /// Set the number of trees.
    #[must_use]
    pub fn with_nb_trees(mut self, nb_trees: usize) -> Self {
        self.nb_trees = nb_trees;
        self
    }

    /// Set the number of candidate splitters per node.
    #[must_use]
    pub fn with_nb_candidates(mut self, nb_candidates: usize) -> Self {
        self.nb_candidates = nb_candidates;
        self
    }

    /// Set the master seed; per-tree seeds derive from it.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train the forest: trees grow in parallel from per-tree seeds drawn
    /// sequentially off the master generator, so results do not depend on
    /// scheduling.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::InvalidCount`] | `nb_trees == 0` or `nb_candidates == 0` |
    /// | [`ForestError::Data`] | unlabeled series or unknown transform |
    #[instrument(skip_all, fields(nb_trees = self.nb_trees, train_size = train.size()))]
    pub fn fit(
        &self,
        train: &Dataset,
        sampler: &SamplerConfig,
    ) -> Result<ProximityForest, ForestError> {
        if self.nb_trees == 0 {
            return Err(ForestError::InvalidCount {
                parameter: "nb_trees",
            });
        }
        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.nb_trees).map(|_| master.r#gen()).collect();

        info!(
            nb_trees = self.nb_trees,
            nb_candidates = self.nb_candidates,
            "training proximity forest"
        );

        let trees: Vec<ProximityTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                ProximityTreeConfig::new()
                    .with_nb_candidates(self.nb_candidates)
                    .with_seed(seed)
                    .fit(train, sampler)
            })
            .collect::<Result<_, _>>()?;

        info!(nb_trees = trees.len(), "proximity forest trained");
        Ok(ProximityForest { trees })
    }
}

impl Default for ProximityForestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A trained forest.
#[derive(Debug)]
pub struct ProximityForest {
    trees: Vec<ProximityTree>,
}

/// Predictions and score of a forest on a labeled dataset.
#[derive(Debug, Clone)]
pub struct ForestEvaluation {
    /// Predicted dense label index per series.
    pub predictions: Vec<usize>,
    /// Number of correct predictions.
    pub nb_correct: usize,
    /// `nb_correct / size`.
    pub accuracy: f64,
}

impl ProximityForest {
    /// Return the number of trees.
    #[must_use]
    pub fn nb_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predict every series of `test` by majority vote over the trees,
    /// ties broken uniformly. Per-query generators derive from `seed`
    /// sequentially, so the result is independent of scheduling.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Data`] when a node transform cannot be
    /// derived from `test`.
    #[instrument(skip(self, test), fields(test_size = test.size()))]
    pub fn predict(&self, test: &Dataset, seed: u64) -> Result<Vec<usize>, ForestError> {
        let mut master = ChaCha8Rng::seed_from_u64(seed);
        let query_seeds: Vec<u64> = (0..test.size()).map(|_| master.r#gen()).collect();

        (0..test.size())
            .into_par_iter()
            .map_init(
                || TreeState::new(test.clone(), 0),
                |state, query| {
                    state.rng = ChaCha8Rng::seed_from_u64(query_seeds[query]);
                    let mut votes: Vec<usize> = Vec::new();
                    for tree in &self.trees {
                        votes.push(tree.predict(state, query)?);
                    }
                    Ok(majority_vote(&votes, &mut state.rng))
                },
            )
            .collect()
    }

    /// Predict `test` and score against its labels.
    ///
    /// # Errors
    ///
    /// Same as [`ProximityForest::predict`], plus [`ForestError::Data`]
    /// for unlabeled test series.
    pub fn evaluate(&self, test: &Dataset, seed: u64) -> Result<ForestEvaluation, ForestError> {
        let predictions = self.predict(test, seed)?;
        let mut nb_correct = 0;
        for (i, &p) in predictions.iter().enumerate() {
            if p == test.label_index(i)? {
                nb_correct += 1;
            }
        }
        let accuracy = nb_correct as f64 / test.size() as f64;
        Ok(ForestEvaluation {
            predictions,
            nb_correct,
            accuracy,
        })
    }
}

/// Most frequent vote; ties drawn uniformly among the tied labels.
fn majority_vote<R: Rng>(votes: &[usize], rng: &mut R) -> usize {
    let max_label = votes.iter().copied().max().unwrap_or(0);
    let mut counts = vec![0usize; max_label + 1];
    for &v in votes {
        counts[v] += 1;
    }
    let top = counts.iter().copied().max().unwrap_or(0);
    let tied: Vec<usize> = (0..=max_label).filter(|&l| counts[l] == top).collect();
    *tied.choose(rng).expect("at least one vote")
}
