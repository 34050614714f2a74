//! Proximity tree classification: random elastic-distance splitters,
//! trees, and majority-vote forests.
//!
//! At every tree node one exemplar per class is sampled together with a
//! random distance parameterization; the node's series are partitioned by
//! 1-nearest-neighbour against the exemplars, and the best of several such
//! candidate splitters (by weighted Gini impurity) becomes the node.

mod error;
mod forest;
mod sampler;
mod splitter;
mod state;
mod tree;

pub use error::ForestError;
pub use forest::{ForestEvaluation, ProximityForest, ProximityForestConfig};
pub use sampler::{KernelKind, SamplerConfig, SampledDistance};
pub use splitter::{NodeSplit, TestSplitter, build_splitter};
pub use state::TreeState;
pub use tree::{Node, NodeIndex, ProximityTree, ProximityTreeConfig};
