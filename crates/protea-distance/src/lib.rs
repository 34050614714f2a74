//! Elastic distance kernels with pruning and early abandoning.
//!
//! Every kernel follows the same contract: given two series and a cutoff
//! `c`, it returns either the exact distance `v <= c`, or `+INF` meaning the
//! kernel proved `v > c` (early abandon) or that no alignment exists under
//! the kernel's constraints (e.g. a window smaller than the length
//! difference). Two cutoff sentinels are recognised: `NaN` disables
//! pruning entirely, `+INF` enables pruning seeded from the cost of the
//! matrix diagonal but never abandons the true value.
//!
//! The dynamic-programming kernels share one double-buffered skeleton
//! that narrows the reachable column band row by row; each kernel is a
//! parameterization of that skeleton by its three transition costs. Kernels never allocate on the hot path: callers may hand in a
//! reusable scratch buffer via the `*_with_buffer` variants.

mod adtw;
mod cost;
mod direct;
mod dtw;
mod eap;
mod erp;
mod error;
mod kernel;
mod lcss;
mod lockstep;
mod msm;
mod sbd;
mod twe;
mod wdtw;

pub use adtw::{adtw, adtw_with_buffer};
pub use direct::direct;
pub use dtw::{cdtw, cdtw_with_buffer, dtw, dtw_with_buffer};
pub use erp::{erp, erp_with_buffer};
pub use error::DistanceError;
pub use kernel::Distance;
pub use lcss::{lcss, lcss_with_buffer};
pub use lockstep::{lorentzian, modminkowski};
pub use msm::{msm, msm_with_buffer};
pub use sbd::sbd;
pub use twe::{twe, twe_with_buffer};
pub use wdtw::{WDTW_MAX_WEIGHT, generate_weights, wdtw, wdtw_with_buffer};
