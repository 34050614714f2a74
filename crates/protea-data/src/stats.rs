//! Pooled statistics over dataset subsets.
//!
//! Used by the splitter samplers: the ERP gap value and the LCSS tolerance
//! are drawn relative to the spread of the series reaching a node.

use crate::dataset::Dataset;
use crate::index::IndexSet;

/// Mean over every value of every referenced series.
#[must_use]
pub fn pooled_mean(dataset: &Dataset, indices: &IndexSet) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for index in indices.iter() {
        let values = dataset.series(index).values();
        sum += values.iter().sum::<f64>();
        count += values.len();
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Population standard deviation over every value of every referenced series.
#[must_use]
pub fn pooled_stddev(dataset: &Dataset, indices: &IndexSet) -> f64 {
    let mean = pooled_mean(dataset, indices);
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for index in indices.iter() {
        for v in dataset.series(index).values() {
            let d = v - mean;
            sum_sq += d * d;
        }
        count += dataset.series(index).values().len();
    }
    if count == 0 {
        0.0
    } else {
        (sum_sq / count as f64).sqrt()
    }
}
