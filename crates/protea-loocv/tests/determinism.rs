//! Engine-level behaviour: winner selection, thread-count independence,
//! degenerate handling, and failure semantics.

use protea_data::{Dataset, Series};
use protea_distance::Distance;
use protea_loocv::{CancelToken, CollectingReporter, LoocvConfig, LoocvError, loocv};

fn labeled(values: Vec<f64>, label: &str) -> Series {
    Series::new(values, 1, Some(label.to_string())).unwrap()
}

/// Two linearly separable classes: shifted unit pulses and near-constant
/// high series. Warping aligns the pulses exactly, lockstep cannot.
fn pulse_train() -> Dataset {
    Dataset::new(vec![
        labeled(vec![0.0, 0.0, 0.0, 1.0, 0.0], "pulse"),
        labeled(vec![0.0, 0.0, 1.0, 0.0, 0.0], "pulse"),
        labeled(vec![0.0, 1.0, 0.0, 0.0, 0.0], "pulse"),
        labeled(vec![1.0, 0.0, 0.0, 0.0, 0.0], "pulse"),
        labeled(vec![0.0, 0.0, 0.0, 0.0, 1.0], "pulse"),
        labeled(vec![5.0, 5.0, 5.0, 5.0, 5.0], "flat"),
        labeled(vec![5.0, 5.0, 5.0, 5.0, 6.0], "flat"),
        labeled(vec![6.0, 5.0, 5.0, 5.0, 5.0], "flat"),
        labeled(vec![5.0, 6.0, 5.0, 5.0, 5.0], "flat"),
        labeled(vec![5.0, 5.0, 6.0, 5.0, 5.0], "flat"),
    ])
    .unwrap()
}

fn pulse_test() -> Dataset {
    Dataset::new(vec![
        labeled(vec![0.0, 0.0, 1.0, 0.0, 0.0], "pulse"),
        labeled(vec![0.0, 1.0, 0.0, 0.0, 0.0], "pulse"),
        labeled(vec![5.0, 5.0, 5.0, 6.0, 5.0], "flat"),
        labeled(vec![5.0, 5.0, 5.0, 5.0, 5.0], "flat"),
    ])
    .unwrap()
}

fn grid() -> Vec<Distance> {
    // Lockstep first (cheap and strict), full DTW second: both separate
    // the classes perfectly, but DTW's nearest-neighbour sums are smaller
    // (shifted pulses align at distance zero), so the tie falls to it.
    vec![
        Distance::Cdtw {
            exponent: 2.0,
            window: 0,
        },
        Distance::Dtw { exponent: 2.0 },
    ]
}

#[test]
fn separable_classes_reach_full_accuracy() {
    let out = loocv(
        &pulse_train(),
        &pulse_test(),
        &grid(),
        &LoocvConfig::new().with_nb_threads(2).with_seed(7),
        None,
        None,
    )
    .unwrap();
    assert_eq!(out.train.nb_correct, 10);
    assert_eq!(out.train.accuracy, 1.0);
    assert_eq!(out.test.nb_correct, 4);
    assert_eq!(out.test.accuracy, 1.0);
    assert_eq!(out.train.nb_degenerate, 0);
}

#[test]
fn tie_on_accuracy_falls_to_smaller_distance_sum() {
    let out = loocv(
        &pulse_train(),
        &pulse_test(),
        &grid(),
        &LoocvConfig::new().with_nb_threads(2).with_seed(7),
        None,
        None,
    )
    .unwrap();
    assert_eq!(out.best_index, 1, "full DTW aligns pulses at zero");
    assert_eq!(out.best.name(), "dtw");
}

#[test]
fn outcome_is_independent_of_thread_count() {
    let train = pulse_train();
    let test = pulse_test();
    let grid = grid();
    let reference = loocv(
        &train,
        &test,
        &grid,
        &LoocvConfig::new().with_nb_threads(1).with_seed(99),
        None,
        None,
    )
    .unwrap();
    for nb_threads in [2, 4, 8] {
        let out = loocv(
            &train,
            &test,
            &grid,
            &LoocvConfig::new().with_nb_threads(nb_threads).with_seed(99),
            None,
            None,
        )
        .unwrap();
        assert_eq!(out.best_index, reference.best_index);
        assert_eq!(out.train.nb_correct, reference.train.nb_correct);
        assert_eq!(out.test.nb_correct, reference.test.nb_correct);
        assert_eq!(
            out.train
                .per_query
                .iter()
                .map(|q| q.predicted)
                .collect::<Vec<_>>(),
            reference
                .train
                .per_query
                .iter()
                .map(|q| q.predicted)
                .collect::<Vec<_>>(),
        );
    }
}

#[test]
fn empty_grid_is_invalid_input() {
    let err = loocv(
        &pulse_train(),
        &pulse_test(),
        &[],
        &LoocvConfig::new(),
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LoocvError::InvalidInput { .. }));
}

#[test]
fn invalid_kernel_parameter_is_invalid_input() {
    let err = loocv(
        &pulse_train(),
        &pulse_test(),
        &[Distance::Dtw { exponent: -2.0 }],
        &LoocvConfig::new(),
        None,
        None,
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, LoocvError::InvalidInput { .. }));
    assert!(msg.contains("dtw"), "message names the kernel: {msg}");
}

#[test]
fn cancelled_token_aborts() {
    let token = CancelToken::new();
    token.cancel();
    let err = loocv(
        &pulse_train(),
        &pulse_test(),
        &grid(),
        &LoocvConfig::new(),
        Some(&token),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LoocvError::Cancelled));
}

#[test]
fn all_infinite_distances_are_degenerate_not_an_error() {
    // Every pair of lengths differs, so a zero window rejects every
    // alignment and every query is degenerate.
    let train = Dataset::new(vec![
        labeled(vec![1.0], "a"),
        labeled(vec![1.0, 1.0], "a"),
        labeled(vec![1.0, 1.0, 1.0], "b"),
        labeled(vec![1.0, 1.0, 1.0, 1.0], "b"),
    ])
    .unwrap();
    let test = Dataset::new(vec![labeled(vec![2.0; 5], "a")]).unwrap();
    let out = loocv(
        &train,
        &test,
        &[Distance::Cdtw {
            exponent: 2.0,
            window: 0,
        }],
        &LoocvConfig::new().with_nb_threads(2).with_seed(3),
        None,
        None,
    )
    .unwrap();
    assert_eq!(out.train.nb_degenerate, 4);
    assert_eq!(out.test.nb_degenerate, 1);
}

#[test]
fn reporter_receives_both_phase_records() {
    let mut reporter = CollectingReporter::new();
    let out = loocv(
        &pulse_train(),
        &pulse_test(),
        &grid(),
        &LoocvConfig::new().with_nb_threads(2),
        None,
        Some(&mut reporter),
    )
    .unwrap();
    assert_eq!(reporter.records().len(), 2);
    assert_eq!(reporter.records()[0]["event"], "loocv_train");
    assert_eq!(reporter.records()[1]["event"], "loocv_test");

    let json = out.to_json();
    assert_eq!(json["status"], "success");
    assert_eq!(json["distance"]["name"], "dtw");
    assert_eq!(json["loocv_train"]["nb_correct"], 10);
}
