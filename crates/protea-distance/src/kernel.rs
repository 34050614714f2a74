//! Type-erased kernel: a tagged parameter record with an `eval` capability.
//!
//! The classifiers store this value object instead of a function pointer:
//! it is cheap to clone (the WDTW weight vector sits behind an `Arc` and is
//! shared read-only across every invocation), comparable for reporting,
//! and serialises its parameters into the boundary JSON shape.

use std::sync::Arc;

use protea_data::SeriesView;
use serde_json::{Value, json};

use crate::error::DistanceError;
use crate::{
    adtw_with_buffer, cdtw_with_buffer, direct, dtw_with_buffer, erp_with_buffer,
    generate_weights, lcss_with_buffer, lorentzian, modminkowski, msm_with_buffer, sbd,
    twe_with_buffer, wdtw_with_buffer,
};

/// A fully parameterized elastic distance.
#[derive(Debug, Clone)]
pub enum Distance {
    /// Direct alignment with cost exponent.
    Direct {
        /// Cost exponent.
        exponent: f64,
    },
    /// DTW with full window.
    Dtw {
        /// Cost exponent.
        exponent: f64,
    },
    /// DTW with a Sakoe-Chiba band.
    Cdtw {
        /// Cost exponent.
        exponent: f64,
        /// Band half-width.
        window: usize,
    },
    /// Weighted DTW.
    Wdtw {
        /// Cost exponent.
        exponent: f64,
        /// Weight decay used to derive the weights.
        g: f64,
        /// Precomputed weights, shared read-only.
        weights: Arc<[f64]>,
    },
    /// Amerced DTW.
    Adtw {
        /// Cost exponent.
        exponent: f64,
        /// Additive warping penalty.
        penalty: f64,
    },
    /// Edit distance with Real Penalty.
    Erp {
        /// Cost exponent.
        exponent: f64,
        /// Gap value.
        gap_value: f64,
        /// Band half-width.
        window: usize,
    },
    /// Longest Common SubSequence.
    Lcss {
        /// Match tolerance.
        epsilon: f64,
        /// Band half-width.
        window: usize,
    },
    /// Move-Split-Merge.
    Msm {
        /// Split/merge cost.
        cost: f64,
    },
    /// Time Warp Edit.
    Twe {
        /// Stiffness.
        nu: f64,
        /// Edit penalty.
        lambda: f64,
    },
    /// Shape-Based Distance.
    Sbd,
    /// Lorentzian lockstep distance.
    Lorentzian,
    /// Modified Minkowski lockstep distance.
    ModMinkowski {
        /// Cost exponent.
        exponent: f64,
    },
}

impl Distance {
    /// Build a WDTW record, deriving the shared weight vector from
    /// `(g, length)`.
    #[must_use]
    pub fn wdtw(exponent: f64, g: f64, length: usize) -> Self {
        Self::Wdtw {
            exponent,
            g,
            weights: generate_weights(g, length).into(),
        }
    }

    /// Evaluate the distance under a best-so-far cutoff, reusing the
    /// caller's scratch buffer.
    ///
    /// Follows the shared kernel contract: the exact value when it is
    /// within the cutoff, `+INF` otherwise; `NaN` cutoff means no bound.
    #[must_use]
    pub fn eval(
        &self,
        a: SeriesView<'_>,
        b: SeriesView<'_>,
        cutoff: f64,
        buffer: &mut Vec<f64>,
    ) -> f64 {
        match self {
            Self::Direct { exponent } => direct(a, b, *exponent, cutoff),
            Self::Dtw { exponent } => dtw_with_buffer(a, b, *exponent, cutoff, buffer),
            Self::Cdtw { exponent, window } => {
                cdtw_with_buffer(a, b, *window, *exponent, cutoff, buffer)
            }
            Self::Wdtw {
                exponent, weights, ..
            } => wdtw_with_buffer(a, b, *exponent, weights, cutoff, buffer),
            Self::Adtw { exponent, penalty } => {
                adtw_with_buffer(a, b, *exponent, *penalty, cutoff, buffer)
            }
            Self::Erp {
                exponent,
                gap_value,
                window,
            } => erp_with_buffer(a, b, *gap_value, *window, *exponent, cutoff, buffer),
            Self::Lcss { epsilon, window } => {
                lcss_with_buffer(a, b, *epsilon, *window, cutoff, buffer)
            }
            Self::Msm { cost } => msm_with_buffer(a, b, *cost, cutoff, buffer),
            Self::Twe { nu, lambda } => twe_with_buffer(a, b, *nu, *lambda, cutoff, buffer),
            Self::Sbd => sbd(a, b),
            Self::Lorentzian => lorentzian(a, b),
            Self::ModMinkowski { exponent } => modminkowski(a, b, *exponent),
        }
    }

    /// Return the kernel name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Dtw { .. } => "dtw",
            Self::Cdtw { .. } => "cdtw",
            Self::Wdtw { .. } => "wdtw",
            Self::Adtw { .. } => "adtw",
            Self::Erp { .. } => "erp",
            Self::Lcss { .. } => "lcss",
            Self::Msm { .. } => "msm",
            Self::Twe { .. } => "twe",
            Self::Sbd => "sbd",
            Self::Lorentzian => "lorentzian",
            Self::ModMinkowski { .. } => "modminkowski",
        }
    }

    /// Return the parameter record as a JSON object (the WDTW weight
    /// vector is represented by its generator `g`).
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            Self::Direct { exponent } | Self::Dtw { exponent } => json!({ "e": exponent }),
            Self::Cdtw { exponent, window } => json!({ "e": exponent, "window": window }),
            Self::Wdtw { exponent, g, .. } => json!({ "e": exponent, "g": g }),
            Self::Adtw { exponent, penalty } => json!({ "e": exponent, "omega": penalty }),
            Self::Erp {
                exponent,
                gap_value,
                window,
            } => json!({ "e": exponent, "gv": gap_value, "window": window }),
            Self::Lcss { epsilon, window } => json!({ "epsilon": epsilon, "window": window }),
            Self::Msm { cost } => json!({ "c": cost }),
            Self::Twe { nu, lambda } => json!({ "nu": nu, "lambda": lambda }),
            Self::Sbd | Self::Lorentzian => json!({}),
            Self::ModMinkowski { exponent } => json!({ "e": exponent }),
        }
    }

    /// Check the parameters against their domains.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::InvalidParameter`] naming the kernel and
    /// the offending parameter.
    pub fn validate(&self) -> Result<(), DistanceError> {
        let check = |ok: bool, parameter: &'static str, value: f64| {
            if ok {
                Ok(())
            } else {
                Err(DistanceError::InvalidParameter {
                    distance: self.name(),
                    parameter,
                    value,
                })
            }
        };
        match self {
            Self::Direct { exponent }
            | Self::Dtw { exponent }
            | Self::Cdtw { exponent, .. }
            | Self::ModMinkowski { exponent } => {
                check(exponent.is_finite() && *exponent > 0.0, "e", *exponent)
            }
            Self::Wdtw { exponent, g, .. } => {
                check(exponent.is_finite() && *exponent > 0.0, "e", *exponent)?;
                check(g.is_finite() && *g >= 0.0, "g", *g)
            }
            Self::Adtw { exponent, penalty } => {
                check(exponent.is_finite() && *exponent > 0.0, "e", *exponent)?;
                check(penalty.is_finite() && *penalty >= 0.0, "omega", *penalty)
            }
            Self::Erp {
                exponent,
                gap_value,
                ..
            } => {
                check(exponent.is_finite() && *exponent > 0.0, "e", *exponent)?;
                check(gap_value.is_finite(), "gv", *gap_value)
            }
            Self::Lcss { epsilon, .. } => {
                check(epsilon.is_finite() && *epsilon >= 0.0, "epsilon", *epsilon)
            }
            Self::Msm { cost } => check(cost.is_finite() && *cost >= 0.0, "c", *cost),
            Self::Twe { nu, lambda } => {
                check(nu.is_finite() && *nu >= 0.0, "nu", *nu)?;
                check(lambda.is_finite() && *lambda >= 0.0, "lambda", *lambda)
            }
            Self::Sbd | Self::Lorentzian => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni(values: &[f64]) -> SeriesView<'_> {
        SeriesView::univariate(values)
    }

    #[test]
    fn eval_matches_free_functions() {
        let a = [1.0, 2.0, 3.0, 1.0];
        let b = [0.0, 2.0, 2.0];
        let mut buf = Vec::new();
        let d = Distance::Dtw { exponent: 2.0 };
        assert_eq!(
            d.eval(uni(&a), uni(&b), f64::INFINITY, &mut buf),
            crate::dtw(uni(&a), uni(&b), 2.0, f64::INFINITY)
        );
        let m = Distance::Msm { cost: 0.5 };
        assert_eq!(
            m.eval(uni(&a), uni(&b), f64::INFINITY, &mut buf),
            crate::msm(uni(&a), uni(&b), 0.5, f64::INFINITY)
        );
    }

    #[test]
    fn every_kernel_scores_zero_on_itself() {
        let s = [1.0, 2.0, 3.0, 2.5, 0.5];
        let kernels = [
            Distance::Direct { exponent: 2.0 },
            Distance::Dtw { exponent: 2.0 },
            Distance::Cdtw {
                exponent: 2.0,
                window: 2,
            },
            Distance::wdtw(2.0, 0.3, 5),
            Distance::Adtw {
                exponent: 2.0,
                penalty: 0.5,
            },
            Distance::Erp {
                exponent: 2.0,
                gap_value: 0.1,
                window: 5,
            },
            Distance::Lcss {
                epsilon: 0.1,
                window: 5,
            },
            Distance::Msm { cost: 0.5 },
            Distance::Twe {
                nu: 0.01,
                lambda: 0.1,
            },
            Distance::Lorentzian,
            Distance::ModMinkowski { exponent: 2.0 },
        ];
        let mut buf = Vec::new();
        for k in &kernels {
            assert_eq!(
                k.eval(uni(&s), uni(&s), f64::INFINITY, &mut buf),
                0.0,
                "{} on itself",
                k.name()
            );
        }
        assert!(Distance::Sbd.eval(uni(&s), uni(&s), f64::INFINITY, &mut buf) < 1e-12);
    }

    #[test]
    fn params_carry_the_record() {
        let d = Distance::Erp {
            exponent: 2.0,
            gap_value: 0.5,
            window: 7,
        };
        let p = d.params();
        assert_eq!(p["e"], 2.0);
        assert_eq!(p["gv"], 0.5);
        assert_eq!(p["window"], 7);
        assert_eq!(d.name(), "erp");
    }

    #[test]
    fn validation_rejects_bad_domains() {
        assert!(Distance::Dtw { exponent: -1.0 }.validate().is_err());
        assert!(
            Distance::Adtw {
                exponent: 2.0,
                penalty: -0.1
            }
            .validate()
            .is_err()
        );
        assert!(
            Distance::Lcss {
                epsilon: f64::NAN,
                window: 1
            }
            .validate()
            .is_err()
        );
        assert!(Distance::Msm { cost: 0.5 }.validate().is_ok());
    }

    #[test]
    fn cheap_to_clone_and_share() {
        let d = Distance::wdtw(2.0, 0.5, 100);
        let e = d.clone();
        if let (Distance::Wdtw { weights: w1, .. }, Distance::Wdtw { weights: w2, .. }) = (&d, &e) {
            assert!(Arc::ptr_eq(w1, w2));
        } else {
            unreachable!();
        }
    }
}
