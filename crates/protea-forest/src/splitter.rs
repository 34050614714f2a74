//! Node splitter generation: exemplar 1-NN partitioning.

use std::collections::BTreeMap;

use protea_data::{ByClassMap, Dataset, SeriesView};
use protea_distance::Distance;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ForestError;
use crate::sampler::{SamplerConfig, sample};
use crate::state::TreeState;

/// Test-time splitter: routes a query to the branch of the exemplar it is
/// nearest to, under the node's frozen transform and kernel.
#[derive(Debug, Clone)]
pub struct TestSplitter {
    train: Dataset,
    transform: String,
    distance: Distance,
    /// `(label, train index)` pairs in branch order.
    exemplars: Vec<(usize, usize)>,
    labels_to_index: BTreeMap<usize, usize>,
}

impl TestSplitter {
    /// Return the transform the splitter's kernel operates under.
    ///
    /// Queries passed to [`TestSplitter::route`] must come from a dataset
    /// derived with this transform.
    #[must_use]
    pub fn transform_name(&self) -> &str {
        &self.transform
    }

    /// Return the frozen kernel.
    #[must_use]
    pub fn distance(&self) -> &Distance {
        &self.distance
    }

    /// Return the `(label, train index)` exemplars in branch order.
    #[must_use]
    pub fn exemplars(&self) -> &[(usize, usize)] {
        &self.exemplars
    }

    /// Classify a query to a branch index.
    ///
    /// Runs 1-NN against the exemplars under a best-so-far cutoff; tied
    /// distances collect their distinct labels and the branch is drawn
    /// uniformly among them. When every distance is `+INF` the tie list
    /// covers all exemplars, so the draw is uniform over the branches.
    #[must_use]
    pub fn route<R: Rng>(&self, query: SeriesView<'_>, rng: &mut R, scratch: &mut Vec<f64>) -> usize {
        let mut bsf = f64::INFINITY;
        let mut ties: Vec<usize> = Vec::new();
        for &(label, exemplar) in &self.exemplars {
            let ev = self.train.series(exemplar).as_view();
            let d = self.distance.eval(ev, query, bsf, scratch);
            if d < bsf {
                bsf = d;
                ties.clear();
                ties.push(label);
            } else if d == bsf && !ties.contains(&label) {
                ties.push(label);
            }
        }
        let label = *ties.choose(rng).expect("at least one exemplar");
        self.labels_to_index[&label]
    }
}

/// Result of generating one node splitter: the per-branch class
/// partitions and the stored test-time splitter.
#[derive(Debug, Clone)]
pub struct NodeSplit {
    /// One class partition per branch, in branch order.
    pub branches: Vec<ByClassMap>,
    /// The splitter to apply at test time.
    pub splitter: TestSplitter,
}

impl NodeSplit {
    /// Weighted Gini impurity of the branch partitions (lower is better).
    #[must_use]
    pub fn weighted_gini(&self) -> f64 {
        let total: usize = self.branches.iter().map(ByClassMap::size).sum();
        if total == 0 {
            return 0.0;
        }
        self.branches
            .iter()
            .map(|branch| {
                let size = branch.size();
                if size == 0 {
                    return 0.0;
                }
                let sum_sq: f64 = branch
                    .iter()
                    .map(|(_, members)| {
                        let p = members.len() as f64 / size as f64;
                        p * p
                    })
                    .sum();
                (size as f64 / total as f64) * (1.0 - sum_sq)
            })
            .sum()
    }

    /// True when one branch swallowed the whole node: splitting again
    /// would recurse forever.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let total: usize = self.branches.iter().map(ByClassMap::size).sum();
        self.branches.iter().any(|b| b.size() == total)
    }
}

/// Generate one splitter for a node.
///
/// Samples one exemplar per class and a random transform/kernel, then
/// routes every member of `bcm` (exemplars included) to the branch of its
/// nearest exemplar. Every class of the parent keeps a branch: a branch
/// that received no member gets an empty entry under its class so the
/// downstream class set stays well defined.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`ForestError::EmptyNode`] | `bcm` has no member |
/// | [`ForestError::Data`] | unknown transform or unlabeled series |
pub fn build_splitter(
    bcm: &ByClassMap,
    config: &SamplerConfig,
    state: &mut TreeState,
) -> Result<NodeSplit, ForestError> {
    if bcm.size() == 0 {
        return Err(ForestError::EmptyNode);
    }
    let drawn = sample(config, state, bcm)?;
    let dataset = state.dataset(&drawn.transform)?;
    let exemplars = bcm.pick_one_by_class(&mut state.rng);
    let labels_to_index = bcm.labels_to_index();

    let splitter = TestSplitter {
        train: dataset.clone(),
        transform: drawn.transform,
        distance: drawn.distance,
        exemplars,
        labels_to_index: labels_to_index.clone(),
    };

    // Route every member, recording it under (predicted branch, true label).
    let mut partitions: Vec<BTreeMap<usize, Vec<usize>>> =
        vec![BTreeMap::new(); bcm.nb_classes()];
    for query in bcm.to_index_set().iter() {
        let qv = dataset.series(query).as_view();
        let branch = splitter.route(qv, &mut state.rng, &mut state.scratch);
        let true_label = dataset.label_index(query)?;
        partitions[branch].entry(true_label).or_default().push(query);
    }

    // No empty branches: a class whose branch stayed empty keeps an empty
    // entry so recursion sees a well-defined class set.
    let branches = bcm
        .labels()
        .map(|label| {
            let index = labels_to_index[&label];
            let mut partition = std::mem::take(&mut partitions[index]);
            if partition.is_empty() {
                partition.insert(label, Vec::new());
            }
            ByClassMap::from_parts(partition)
        })
        .collect();

    Ok(NodeSplit { branches, splitter })
}

#[cfg(test)]
mod tests {
    use protea_data::{IndexSet, Series};

    use super::*;
    use crate::sampler::KernelKind;

    fn dataset() -> Dataset {
        let mk = |vals: Vec<f64>, label: &str| {
            Series::new(vals, 1, Some(label.to_string())).unwrap()
        };
        Dataset::new(vec![
            mk(vec![0.0, 0.0, 1.0, 0.0], "pulse"),
            mk(vec![0.0, 1.0, 0.0, 0.0], "pulse"),
            mk(vec![1.0, 0.0, 0.0, 0.0], "pulse"),
            mk(vec![5.0, 5.0, 5.0, 5.0], "flat"),
            mk(vec![5.0, 5.0, 5.0, 6.0], "flat"),
            mk(vec![6.0, 5.0, 5.0, 5.0], "flat"),
        ])
        .unwrap()
    }

    fn raw_dtw_config() -> SamplerConfig {
        SamplerConfig::new()
            .with_transforms(vec!["raw".to_string()])
            .with_kinds(vec![KernelKind::DtwFull])
            .with_exponents(vec![2.0])
    }

    #[test]
    fn one_branch_per_class_and_exact_cover() {
        let ds = dataset();
        let bcm = ByClassMap::group(&ds, &IndexSet::full(ds.size())).unwrap();
        let mut state = TreeState::new(ds.clone(), 21);
        let split = build_splitter(&bcm, &raw_dtw_config(), &mut state).unwrap();

        assert_eq!(split.branches.len(), bcm.nb_classes());
        let total: usize = split.branches.iter().map(ByClassMap::size).sum();
        assert_eq!(total, bcm.size());
        for branch in &split.branches {
            assert!(branch.nb_classes() >= 1, "no empty class partition");
        }
    }

    #[test]
    fn separable_classes_split_cleanly() {
        let ds = dataset();
        let bcm = ByClassMap::group(&ds, &IndexSet::full(ds.size())).unwrap();
        let mut state = TreeState::new(ds.clone(), 33);
        let split = build_splitter(&bcm, &raw_dtw_config(), &mut state).unwrap();

        // Pulses are mutually at DTW distance <= their distance to flats,
        // so each branch is pure and the weighted Gini is zero.
        assert_eq!(split.weighted_gini(), 0.0);
        assert!(!split.is_degenerate());
    }

    #[test]
    fn exemplars_route_to_their_own_branch() {
        let ds = dataset();
        let bcm = ByClassMap::group(&ds, &IndexSet::full(ds.size())).unwrap();
        let mut state = TreeState::new(ds.clone(), 5);
        let split = build_splitter(&bcm, &raw_dtw_config(), &mut state).unwrap();

        let mut scratch = Vec::new();
        for &(label, exemplar) in split.splitter.exemplars() {
            let qv = ds.series(exemplar).as_view();
            let branch = split.splitter.route(qv, &mut state.rng, &mut scratch);
            // Distance to itself is zero; ties with another exemplar at
            // zero cannot happen in this dataset.
            assert_eq!(branch, split.splitter.exemplars()
                .iter()
                .position(|&(l, _)| l == label)
                .unwrap());
        }
    }

    #[test]
    fn identical_classes_still_keep_every_branch() {
        // Both classes hold the same flat series: every routing decision
        // is a coin flip, but the branch list never loses a class.
        let mk = |label: &str| Series::new(vec![1.0, 1.0], 1, Some(label.to_string())).unwrap();
        let ds = Dataset::new(vec![mk("a"), mk("a"), mk("b"), mk("b")]).unwrap();
        let bcm = ByClassMap::group(&ds, &IndexSet::full(ds.size())).unwrap();
        for seed in 0..20 {
            let mut state = TreeState::new(ds.clone(), seed);
            let split = build_splitter(&bcm, &raw_dtw_config(), &mut state).unwrap();
            assert_eq!(split.branches.len(), 2);
            let total: usize = split.branches.iter().map(ByClassMap::size).sum();
            assert_eq!(total, 4);
            for branch in &split.branches {
                assert!(branch.nb_classes() >= 1);
            }
        }
    }

    #[test]
    fn empty_node_is_rejected() {
        let ds = dataset();
        let bcm = ByClassMap::from_parts(BTreeMap::new());
        let mut state = TreeState::new(ds, 1);
        assert!(matches!(
            build_splitter(&bcm, &raw_dtw_config(), &mut state),
            Err(ForestError::EmptyNode)
        ));
    }
}
