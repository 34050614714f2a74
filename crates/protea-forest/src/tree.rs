//! A single proximity tree.

use protea_data::{ByClassMap, Dataset, IndexSet};
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::sampler::SamplerConfig;
use crate::splitter::{NodeSplit, TestSplitter, build_splitter};
use crate::state::TreeState;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Return the raw arena index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One arena node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Terminal node predicting a dense label index.
    Leaf {
        /// Predicted label.
        label: usize,
    },
    /// Internal node routing queries through a stored splitter.
    Branch {
        /// The frozen test-time splitter.
        splitter: TestSplitter,
        /// Children in branch order.
        children: Vec<NodeIndex>,
    },
}

/// Configuration for growing one proximity tree.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `nb_candidates` | 5       |
/// | `seed`          | 42      |
#[derive(Debug, Clone)]
pub struct ProximityTreeConfig {
    nb_candidates: usize,
    seed: u64,
}

impl ProximityTreeConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nb_candidates: 5,
            seed: 42,
        }
    }

    /// Set the number of candidate splitters drawn per node.
    #[must_use]
    pub fn with_nb_candidates(mut self, nb_candidates: usize) -> Self {
        self.nb_candidates = nb_candidates;
        self
    }

    /// Set the tree seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow a tree on the full training dataset.
    ///
    /// At every impure node, `nb_candidates` splitters are generated and
    /// the one with the lowest weighted Gini impurity is kept.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::InvalidCount`] | `nb_candidates == 0` |
    /// | [`ForestError::Data`] | unlabeled series or unknown transform |
    #[instrument(skip(self, train, sampler), fields(train_size = train.size()))]
    pub fn fit(
        &self,
        train: &Dataset,
        sampler: &SamplerConfig,
    ) -> Result<ProximityTree, ForestError> {
        if self.nb_candidates == 0 {
            return Err(ForestError::InvalidCount {
                parameter: "nb_candidates",
            });
        }
        let bcm = ByClassMap::group(train, &IndexSet::full(train.size()))?;
        let mut state = TreeState::new(train.clone(), self.seed);
        let mut arena = Vec::new();
        let root = grow(&bcm, self.nb_candidates, sampler, &mut state, &mut arena)?;
        debug_assert_eq!(root.index(), 0);
        debug!(nb_nodes = arena.len(), "proximity tree grown");
        Ok(ProximityTree { nodes: arena })
    }
}

impl Default for ProximityTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn grow(
    bcm: &ByClassMap,
    nb_candidates: usize,
    sampler: &SamplerConfig,
    state: &mut TreeState,
    arena: &mut Vec<Node>,
) -> Result<NodeIndex, ForestError> {
    let majority = bcm.majority_label().ok_or(ForestError::EmptyNode)?;
    if bcm.is_pure() {
        let index = arena.len();
        arena.push(Node::Leaf { label: majority });
        return Ok(NodeIndex(index));
    }

    // Best of nb_candidates splitters by weighted Gini impurity.
    let mut best: Option<NodeSplit> = None;
    for _ in 0..nb_candidates {
        let candidate = build_splitter(bcm, sampler, state)?;
        let better = best
            .as_ref()
            .is_none_or(|b| candidate.weighted_gini() < b.weighted_gini());
        if better {
            best = Some(candidate);
        }
    }
    let split = best.expect("nb_candidates >= 1");

    // A split that pushes the whole node down one branch cannot make
    // progress; close the node with its majority label.
    if split.is_degenerate() {
        let index = arena.len();
        arena.push(Node::Leaf { label: majority });
        return Ok(NodeIndex(index));
    }

    // Arena pattern: reserve the slot, grow children, then overwrite.
    let index = arena.len();
    arena.push(Node::Leaf { label: majority });
    let mut children = Vec::with_capacity(split.branches.len());
    for branch in &split.branches {
        let child = if branch.size() == 0 {
            // Empty branch: predict the class the branch stands for.
            let label = branch.labels().next().ok_or(ForestError::EmptyNode)?;
            let leaf = arena.len();
            arena.push(Node::Leaf { label });
            NodeIndex(leaf)
        } else {
            grow(branch, nb_candidates, sampler, state, arena)?
        };
        children.push(child);
    }
    arena[index] = Node::Branch {
        splitter: split.splitter,
        children,
    };
    Ok(NodeIndex(index))
}

/// A grown proximity tree.
#[derive(Debug, Clone)]
pub struct ProximityTree {
    nodes: Vec<Node>,
}

impl ProximityTree {
    /// Predict the label of series `query` of the state's base dataset.
    ///
    /// The state caches the dataset under every transform the tree's
    /// nodes need and supplies the tie-breaking generator.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Data`] when a node's transform cannot be
    /// derived from the state's dataset.
    pub fn predict(&self, state: &mut TreeState, query: usize) -> Result<usize, ForestError> {
        let mut node = 0usize;
        loop {
            match &self.nodes[node] {
                Node::Leaf { label } => return Ok(*label),
                Node::Branch { splitter, children } => {
                    let dataset = state.dataset(splitter.transform_name())?;
                    let qv = dataset.series(query).as_view();
                    let branch = splitter.route(qv, &mut state.rng, &mut state.scratch);
                    node = children[branch].index();
                }
            }
        }
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn nb_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn nb_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}
