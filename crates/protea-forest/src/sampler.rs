//! Random hyperparameter draws for node splitters.

use protea_data::{ByClassMap, pooled_stddev};
use protea_distance::{Distance, direct};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ForestError;
use crate::state::TreeState;

/// Kernel families a splitter may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    /// Direct alignment.
    Direct,
    /// DTW with full window.
    DtwFull,
    /// DTW with a sampled window.
    Dtw,
    /// Weighted DTW with a sampled decay.
    Wdtw,
    /// Amerced DTW with a sampled penalty.
    Adtw,
    /// ERP with sampled window and gap value.
    Erp,
    /// LCSS with sampled window and tolerance.
    Lcss,
    /// MSM with a sampled split/merge cost.
    Msm,
    /// TWE with sampled stiffness and penalty.
    Twe,
}

/// Configuration of the splitter hyperparameter space.
///
/// # Defaults
///
/// | Parameter    | Default                              |
/// |--------------|--------------------------------------|
/// | `transforms` | `raw`, `derivative`                  |
/// | `exponents`  | `0.5`, `1.0`, `2.0`                  |
/// | `kinds`      | all nine kernel families             |
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    transforms: Vec<String>,
    exponents: Vec<f64>,
    kinds: Vec<KernelKind>,
}

impl SamplerConfig {
    /// Create the default sampler space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: vec!["raw".to_string(), "derivative".to_string()],
            exponents: vec![0.5, 1.0, 2.0],
            kinds: vec![
                KernelKind::Direct,
                KernelKind::DtwFull,
                KernelKind::Dtw,
                KernelKind::Wdtw,
                KernelKind::Adtw,
                KernelKind::Erp,
                KernelKind::Lcss,
                KernelKind::Msm,
                KernelKind::Twe,
            ],
        }
    }

    /// Restrict the transform names.
    #[must_use]
    pub fn with_transforms(mut self, transforms: Vec<String>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Restrict the cost exponents.
    #[must_use]
    pub fn with_exponents(mut self, exponents: Vec<f64>) -> Self {
        self.exponents = exponents;
        self
    }

    /// Restrict the kernel families.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<KernelKind>) -> Self {
        self.kinds = kinds;
        self
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A drawn transform/distance pair.
#[derive(Debug, Clone)]
pub struct SampledDistance {
    /// Transform the distance operates under.
    pub transform: String,
    /// The parameterized kernel.
    pub distance: Distance,
}

/// Draw a transform and a fully parameterized kernel for one node.
///
/// Data-dependent parameters (ERP gap value, LCSS tolerance, ADTW
/// penalty scale) are derived from the series reaching the node under
/// the chosen transform.
pub(crate) fn sample(
    config: &SamplerConfig,
    state: &mut TreeState,
    bcm: &ByClassMap,
) -> Result<SampledDistance, ForestError> {
    let transform = config
        .transforms
        .choose(&mut state.rng)
        .cloned()
        .unwrap_or_else(|| "raw".to_string());
    let dataset = state.dataset(&transform)?;
    let length_max = dataset.header().length_max();
    let window_top = (length_max + 1) / 4;

    let kind = *config.kinds.choose(&mut state.rng).unwrap_or(&KernelKind::DtwFull);
    let exponent = config.exponents.choose(&mut state.rng).copied().unwrap_or(2.0);

    let distance = match kind {
        KernelKind::Direct => Distance::Direct { exponent },
        KernelKind::DtwFull => Distance::Dtw { exponent },
        KernelKind::Dtw => Distance::Cdtw {
            exponent,
            window: state.rng.gen_range(0..=window_top),
        },
        KernelKind::Wdtw => {
            let g = state.rng.gen_range(0.0..1.0);
            Distance::wdtw(exponent, g, length_max)
        }
        KernelKind::Adtw => {
            let ratio = state.rng.gen_range(0..=100u32) as f64 / 100.0;
            let scale = direct_distance_scale(&dataset, bcm, exponent, state);
            Distance::Adtw {
                exponent,
                penalty: ratio.powi(5) * scale,
            }
        }
        KernelKind::Erp => {
            let sigma = pooled_stddev(&dataset, &bcm.to_index_set());
            let gap_value = if sigma > 0.0 {
                state.rng.gen_range(0.2 * sigma..sigma)
            } else {
                0.0
            };
            Distance::Erp {
                exponent,
                gap_value,
                window: state.rng.gen_range(0..=window_top),
            }
        }
        KernelKind::Lcss => {
            let sigma = pooled_stddev(&dataset, &bcm.to_index_set());
            let epsilon = if sigma > 0.0 {
                state.rng.gen_range(0.2 * sigma..sigma)
            } else {
                0.0
            };
            Distance::Lcss {
                epsilon,
                window: state.rng.gen_range(0..=window_top),
            }
        }
        KernelKind::Msm => {
            let log_cost = state.rng.gen_range(-2.0..2.0);
            Distance::Msm {
                cost: 10.0f64.powf(log_cost),
            }
        }
        KernelKind::Twe => {
            let log_nu = state.rng.gen_range(-5.0..0.0);
            Distance::Twe {
                nu: 10.0f64.powf(log_nu),
                lambda: state.rng.gen_range(0.0..0.1),
            }
        }
    };

    Ok(SampledDistance {
        transform,
        distance,
    })
}

/// Mean direct-alignment distance over up to 20 random node pairs, used
/// to put the ADTW penalty on the scale of the data. Falls back to the
/// pooled variance when no sampled pair is comparable.
fn direct_distance_scale(
    dataset: &protea_data::Dataset,
    bcm: &ByClassMap,
    exponent: f64,
    state: &mut TreeState,
) -> f64 {
    let members: Vec<usize> = bcm.to_index_set().iter().collect();
    if members.len() < 2 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for _ in 0..20 {
        let a = *members.choose(&mut state.rng).expect("non-empty node");
        let b = *members.choose(&mut state.rng).expect("non-empty node");
        if a == b {
            continue;
        }
        let d = direct(
            dataset.series(a).as_view(),
            dataset.series(b).as_view(),
            exponent,
            f64::INFINITY,
        );
        if d.is_finite() {
            sum += d;
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        let sigma = pooled_stddev(dataset, &bcm.to_index_set());
        sigma * sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protea_data::{Dataset, IndexSet, Series};

    fn dataset() -> Dataset {
        let mk = |vals: Vec<f64>, label: &str| {
            Series::new(vals, 1, Some(label.to_string())).unwrap()
        };
        Dataset::new(vec![
            mk(vec![0.0, 1.0, 2.0, 3.0], "a"),
            mk(vec![0.0, 2.0, 4.0, 6.0], "a"),
            mk(vec![5.0, 5.0, 5.0, 5.0], "b"),
            mk(vec![5.0, 6.0, 5.0, 6.0], "b"),
        ])
        .unwrap()
    }

    fn bcm(ds: &Dataset) -> ByClassMap {
        ByClassMap::group(ds, &IndexSet::full(ds.size())).unwrap()
    }

    #[test]
    fn draws_are_reproducible_under_a_seed() {
        let ds = dataset();
        let map = bcm(&ds);
        let config = SamplerConfig::new();
        let mut s1 = TreeState::new(ds.clone(), 5);
        let mut s2 = TreeState::new(ds.clone(), 5);
        for _ in 0..20 {
            let a = sample(&config, &mut s1, &map).unwrap();
            let b = sample(&config, &mut s2, &map).unwrap();
            assert_eq!(a.transform, b.transform);
            assert_eq!(a.distance.name(), b.distance.name());
            assert_eq!(a.distance.params(), b.distance.params());
        }
    }

    #[test]
    fn windows_stay_under_a_quarter_of_length() {
        let ds = dataset();
        let map = bcm(&ds);
        let config = SamplerConfig::new().with_kinds(vec![KernelKind::Dtw]);
        let mut state = TreeState::new(ds, 11);
        for _ in 0..50 {
            let drawn = sample(&config, &mut state, &map).unwrap();
            if let Distance::Cdtw { window, .. } = drawn.distance {
                assert!(window <= (4 + 1) / 4);
            } else {
                unreachable!("restricted to windowed DTW");
            }
        }
    }

    #[test]
    fn gap_values_follow_the_node_spread() {
        let ds = dataset();
        let map = bcm(&ds);
        let sigma = pooled_stddev(&ds, &IndexSet::full(ds.size()));
        let config = SamplerConfig::new()
            .with_transforms(vec!["raw".to_string()])
            .with_kinds(vec![KernelKind::Erp]);
        let mut state = TreeState::new(ds, 13);
        for _ in 0..50 {
            let drawn = sample(&config, &mut state, &map).unwrap();
            if let Distance::Erp { gap_value, .. } = drawn.distance {
                assert!(gap_value >= 0.2 * sigma && gap_value < sigma);
            } else {
                unreachable!("restricted to ERP");
            }
        }
    }

    #[test]
    fn every_kind_validates() {
        let ds = dataset();
        let map = bcm(&ds);
        let config = SamplerConfig::new();
        let mut state = TreeState::new(ds, 17);
        for _ in 0..200 {
            let drawn = sample(&config, &mut state, &map).unwrap();
            drawn.distance.validate().unwrap();
        }
    }
}
