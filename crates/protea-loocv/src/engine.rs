//! The parallel table-based LOOCV driver.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use protea_data::Dataset;
use protea_distance::Distance;
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::error::LoocvError;
use crate::reporter::Reporter;
use crate::result::{EvalReport, LoocvOutcome, QueryNn};

/// Configuration of the LOOCV engine.
///
/// Construct via [`LoocvConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter     | Default                     |
/// |---------------|-----------------------------|
/// | `nb_threads`  | hardware concurrency + 2    |
/// | `seed`        | 42                          |
/// | `deadline`    | `None` (no deadline)        |
#[derive(Debug, Clone)]
pub struct LoocvConfig {
    nb_threads: usize,
    seed: u64,
    deadline: Option<Duration>,
}

impl LoocvConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        let default_threads = std::thread::available_parallelism()
            .map(|n| n.get() + 2)
            .unwrap_or(4);
        Self {
            nb_threads: default_threads,
            seed: 42,
            deadline: None,
        }
    }

    /// Set the worker count (at least 1).
    #[must_use]
    pub fn with_nb_threads(mut self, nb_threads: usize) -> Self {
        self.nb_threads = nb_threads.max(1);
        self
    }

    /// Set the seed of the tie-breaking generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set a wall-clock deadline, checked between work items.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl Default for LoocvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation flag, checked between work items.
///
/// In-flight kernel evaluations always run to completion; there is no
/// preemption inside a kernel.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Return true once cancellation was signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One table cell: the best distance seen for `(query, parameter)` and the
/// labels of every candidate that reached it.
#[derive(Debug, Clone)]
struct Cell {
    dist: f64,
    labels: Vec<usize>,
}

/// Run LOOCV parameter selection on `train`, then score the winner on
/// `test`.
///
/// The grid is evaluated in order under per-cell best-so-far cutoffs, so
/// callers should put cheaper/stricter parameters first. The winner is the
/// entry with the highest training accuracy; ties fall to the smallest
/// summed nearest-neighbour distance, then to the lowest grid index.
/// Results are deterministic in `(seed, grid)` regardless of `nb_threads`.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`LoocvError::InvalidInput`] | empty grid, invalid kernel parameter, dimensionality mismatch, unlabeled series |
/// | [`LoocvError::Cancelled`] | `cancel` fired or the deadline passed |
/// | [`LoocvError::Internal`] | pool build failure or poisoned table lock |
#[instrument(skip_all, fields(train_size = train.size(), test_size = test.size(), grid_len = grid.len()))]
pub fn loocv(
    train: &Dataset,
    test: &Dataset,
    grid: &[Distance],
    config: &LoocvConfig,
    cancel: Option<&CancelToken>,
    mut reporter: Option<&mut dyn Reporter>,
) -> Result<LoocvOutcome, LoocvError> {
    // --- Validate inputs ---
    if grid.is_empty() {
        return Err(LoocvError::InvalidInput {
            reason: "parameter grid is empty".to_string(),
        });
    }
    for distance in grid {
        distance.validate().map_err(|e| LoocvError::InvalidInput {
            reason: e.to_string(),
        })?;
    }
    if train.header().dim() != test.header().dim() {
        return Err(LoocvError::InvalidInput {
            reason: format!(
                "train dimensionality {} does not match test dimensionality {}",
                train.header().dim(),
                test.header().dim()
            ),
        });
    }
    let train_labels = collect_labels(train)?;
    let test_labels = collect_labels(test)?;

    let n = train.size();
    let k = grid.len();
    let nb_labels = train.header().nb_labels();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.nb_threads)
        .build()
        .map_err(|e| LoocvError::Internal {
            reason: format!("thread pool: {e}"),
        })?;

    info!(
        nb_threads = config.nb_threads,
        seed = config.seed,
        "starting LOOCV table fill"
    );

    // --- Train phase: fill the N x K best-so-far table ---
    let train_start = Instant::now();
    let rows: Vec<Mutex<Vec<Cell>>> = (0..n)
        .map(|_| {
            Mutex::new(vec![
                Cell {
                    dist: f64::INFINITY,
                    labels: Vec::new(),
                };
                k
            ])
        })
        .collect();

    let watchdog = Watchdog {
        cancel,
        deadline: config.deadline,
        start: train_start,
    };

    pool.install(|| {
        (0..n * (n - 1))
            .into_par_iter()
            .try_for_each_init(Vec::new, |scratch, pair| {
                watchdog.check()?;
                let query = pair / (n - 1);
                let mut candidate = pair % (n - 1);
                if candidate >= query {
                    candidate += 1;
                }
                let qv = train.series(query).as_view();
                let cv = train.series(candidate).as_view();
                let label = train_labels[candidate];
                let cutoffs: Vec<f64> = {
                    let row = lock_row(&rows[query])?;
                    row.iter().map(|cell| cell.dist).collect()
                };
                for (index, distance) in grid.iter().enumerate() {
                    let d = distance.eval(qv, cv, cutoffs[index], scratch);
                    if d.is_finite() {
                        let mut row = lock_row(&rows[query])?;
                        let cell = &mut row[index];
                        if d < cell.dist {
                            cell.dist = d;
                            cell.labels.clear();
                            cell.labels.push(label);
                        } else if d == cell.dist {
                            cell.labels.push(label);
                        }
                    }
                }
                Ok(())
            })
    })?;

    let rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|m| {
            m.into_inner().map_err(|_| LoocvError::Internal {
                reason: "poisoned table lock".to_string(),
            })
        })
        .collect::<Result<_, _>>()?;

    // --- Finalize: sample tie lists and rank the grid ---
    // Sequential and in fixed (parameter, query) order, so the outcome
    // does not depend on how the pairs were scheduled.
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut predictions = vec![vec![0usize; n]; k];
    let mut correct = vec![0usize; k];
    let mut degenerate = vec![0usize; k];
    let mut sum_dist = vec![0.0f64; k];
    for index in 0..k {
        for query in 0..n {
            let cell = &rows[query][index];
            let predicted = sample_label(&cell.labels, nb_labels, &mut rng);
            if cell.labels.is_empty() {
                degenerate[index] += 1;
            }
            predictions[index][query] = predicted;
            if predicted == train_labels[query] {
                correct[index] += 1;
            }
            sum_dist[index] += cell.dist;
        }
    }

    let mut best_index = 0;
    for index in 1..k {
        let better = correct[index] > correct[best_index]
            || (correct[index] == correct[best_index] && sum_dist[index] < sum_dist[best_index]);
        if better {
            best_index = index;
        }
    }
    let train_time = train_start.elapsed();

    debug!(
        best_index,
        best_correct = correct[best_index],
        "grid ranked"
    );

    let train_report = EvalReport {
        nb_correct: correct[best_index],
        size: n,
        accuracy: correct[best_index] as f64 / n as f64,
        nb_degenerate: degenerate[best_index],
        time: train_time,
        per_query: (0..n)
            .map(|query| QueryNn {
                distance: rows[query][best_index].dist,
                predicted: predictions[best_index][query],
                actual: train_labels[query],
            })
            .collect(),
    };
    if let Some(r) = reporter.as_deref_mut() {
        r.report(&serde_json::json!({
            "event": "loocv_train",
            "best_index": best_index,
            "result": train_report.to_json(),
        }));
    }

    // --- Test phase: NN1 under the winning parameter ---
    let test_start = Instant::now();
    let best = grid[best_index].clone();
    let m = test.size();
    let watchdog = Watchdog {
        cancel,
        deadline: config.deadline,
        start: train_start,
    };
    let neighbours: Vec<(f64, Vec<usize>)> = pool.install(|| {
        (0..m)
            .into_par_iter()
            .map_init(Vec::new, |scratch, query| {
                watchdog.check()?;
                let qv = test.series(query).as_view();
                let mut bsf = f64::INFINITY;
                let mut ties: Vec<usize> = Vec::new();
                for candidate in 0..n {
                    let cv = train.series(candidate).as_view();
                    let d = best.eval(qv, cv, bsf, scratch);
                    if d < bsf {
                        bsf = d;
                        ties.clear();
                        ties.push(train_labels[candidate]);
                    } else if d == bsf && d.is_finite() {
                        ties.push(train_labels[candidate]);
                    }
                }
                Ok((bsf, ties))
            })
            .collect::<Result<_, LoocvError>>()
    })?;

    let mut test_correct = 0;
    let mut test_degenerate = 0;
    let mut per_query = Vec::with_capacity(m);
    for (query, (dist, ties)) in neighbours.iter().enumerate() {
        let predicted = sample_label(ties, nb_labels, &mut rng);
        if ties.is_empty() {
            test_degenerate += 1;
        }
        if predicted == test_labels[query] {
            test_correct += 1;
        }
        per_query.push(QueryNn {
            distance: *dist,
            predicted,
            actual: test_labels[query],
        });
    }
    let test_report = EvalReport {
        nb_correct: test_correct,
        size: m,
        accuracy: test_correct as f64 / m as f64,
        nb_degenerate: test_degenerate,
        time: test_start.elapsed(),
        per_query,
    };
    if let Some(r) = reporter.as_deref_mut() {
        r.report(&serde_json::json!({
            "event": "loocv_test",
            "result": test_report.to_json(),
        }));
    }

    info!(
        best_index,
        train_accuracy = train_report.accuracy,
        test_accuracy = test_report.accuracy,
        "LOOCV complete"
    );

    Ok(LoocvOutcome {
        best_index,
        best,
        train: train_report,
        test: test_report,
    })
}

struct Watchdog<'a> {
    cancel: Option<&'a CancelToken>,
    deadline: Option<Duration>,
    start: Instant,
}

impl Watchdog<'_> {
    fn check(&self) -> Result<(), LoocvError> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(LoocvError::Cancelled);
        }
        if self.deadline.is_some_and(|d| self.start.elapsed() > d) {
            return Err(LoocvError::Cancelled);
        }
        Ok(())
    }
}

fn collect_labels(dataset: &Dataset) -> Result<Vec<usize>, LoocvError> {
    (0..dataset.size())
        .map(|i| {
            dataset.label_index(i).map_err(|e| LoocvError::InvalidInput {
                reason: e.to_string(),
            })
        })
        .collect()
}

fn lock_row<'a>(
    row: &'a Mutex<Vec<Cell>>,
) -> Result<std::sync::MutexGuard<'a, Vec<Cell>>, LoocvError> {
    row.lock().map_err(|_| LoocvError::Internal {
        reason: "poisoned table lock".to_string(),
    })
}

/// Sample a prediction from a tie list; an empty list (degenerate query)
/// draws uniformly over the whole label universe.
///
/// The list is sorted first so the draw only depends on its contents,
/// never on the scheduling order that built it.
fn sample_label(ties: &[usize], nb_labels: usize, rng: &mut ChaCha8Rng) -> usize {
    if ties.is_empty() {
        rng.gen_range(0..nb_labels)
    } else {
        let mut sorted = ties.to_vec();
        sorted.sort_unstable();
        *sorted.choose(rng).expect("non-empty tie list")
    }
}
