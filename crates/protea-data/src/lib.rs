//! Time series containers and class partitions.
//!
//! Pure data layer — zero I/O. Provides validated univariate and multivariate
//! series, immutable reference-counted datasets with named transforms, sorted
//! index subsets, and by-class partitions used by the classifiers.

mod bcm;
mod dataset;
mod error;
mod index;
mod series;
mod stats;
mod transform;

pub use bcm::ByClassMap;
pub use dataset::{Dataset, DatasetHeader};
pub use error::DataError;
pub use index::IndexSet;
pub use series::{Series, SeriesView};
pub use stats::{pooled_mean, pooled_stddev};
pub use transform::Transform;
