//! Per-tree mutable context.

use std::collections::BTreeMap;

use protea_data::Dataset;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::ForestError;

/// Mutable context threaded through one tree's growth or evaluation:
/// the tree's generator, the reusable DP scratch buffer, and a cache of
/// the base dataset under every transform requested so far.
///
/// A state belongs to one tree and is only ever touched by one thread;
/// the datasets it caches are shared read-only handles.
#[derive(Debug)]
pub struct TreeState {
    /// The tree's random generator.
    pub rng: ChaCha8Rng,
    /// Reusable kernel scratch buffer.
    pub scratch: Vec<f64>,
    base: Dataset,
    transforms: BTreeMap<String, Dataset>,
}

impl TreeState {
    /// Create a state over `base` with a seeded generator.
    #[must_use]
    pub fn new(base: Dataset, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            scratch: Vec::new(),
            base,
            transforms: BTreeMap::new(),
        }
    }

    /// Return the base dataset.
    #[must_use]
    pub fn base(&self) -> &Dataset {
        &self.base
    }

    /// Return the base dataset under a named transform, deriving and
    /// caching it on first request. The handle is a cheap clone.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Data`] for an unknown transform name.
    pub fn dataset(&mut self, name: &str) -> Result<Dataset, ForestError> {
        if let Some(found) = self.transforms.get(name) {
            return Ok(found.clone());
        }
        let derived = self.base.transform(name)?;
        self.transforms.insert(name.to_string(), derived.clone());
        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protea_data::Series;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Series::new(vec![1.0, 2.0, 4.0], 1, Some("a".into())).unwrap(),
            Series::new(vec![0.0, 1.0, 3.0], 1, Some("b".into())).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn caches_derived_datasets() {
        let mut state = TreeState::new(dataset(), 1);
        let first = state.dataset("derivative").unwrap();
        let second = state.dataset("derivative").unwrap();
        assert_eq!(first.series(0).values(), second.series(0).values());
    }

    #[test]
    fn unknown_transform_errors() {
        let mut state = TreeState::new(dataset(), 1);
        assert!(state.dataset("wavelet").is_err());
    }

    #[test]
    fn seeded_generators_repeat() {
        use rand::Rng;
        let mut a = TreeState::new(dataset(), 9);
        let mut b = TreeState::new(dataset(), 9);
        let xs: Vec<u32> = (0..4).map(|_| a.rng.r#gen()).collect();
        let ys: Vec<u32> = (0..4).map(|_| b.rng.r#gen()).collect();
        assert_eq!(xs, ys);
    }
}
