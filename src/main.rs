use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::info;

use protea_data::{Dataset, IndexSet, pooled_stddev};
use protea_distance::{Distance, DistanceError, direct};
use protea_forest::{ProximityForestConfig, SamplerConfig};
use protea_loocv::{LoocvConfig, Reporter, loocv};

mod synth;

#[derive(Parser)]
#[command(name = "protea")]
#[command(about = "Elastic-distance time series classification on synthetic benchmark data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Tune one distance family by LOOCV and score the winner on a test split
    Loocv {
        /// Distance family (direct, dtw, cdtw, wdtw, adtw, erp, lcss, msm,
        /// twe, sbd, lorentzian, modminkowski)
        #[arg(long, default_value = "cdtw")]
        distance: String,

        /// Transform applied to both splits (raw, derivative, zscore,
        /// minmax, unitlength, meannorm)
        #[arg(long, default_value = "raw")]
        transform: String,

        /// Worker threads; 0 means hardware concurrency + 2
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Training series per class
        #[arg(long, default_value_t = 10)]
        train_per_class: usize,

        /// Test series per class
        #[arg(long, default_value_t = 5)]
        test_per_class: usize,

        /// Series length
        #[arg(long, default_value_t = 40)]
        length: usize,

        /// Also write the JSON record to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Train a proximity forest and score it on a test split
    Forest {
        /// Number of trees
        #[arg(long, default_value_t = 20)]
        trees: usize,

        /// Candidate splitters per node
        #[arg(long, default_value_t = 5)]
        candidates: usize,

        /// Training series per class
        #[arg(long, default_value_t = 10)]
        train_per_class: usize,

        /// Test series per class
        #[arg(long, default_value_t = 5)]
        test_per_class: usize,

        /// Series length
        #[arg(long, default_value_t = 40)]
        length: usize,
    },
}

enum AppError {
    /// Unknown distance or transform name: exit code 2.
    UnknownName(String),
    /// Output file failure: exit code 3.
    Output(std::io::Error),
    /// Everything else: exit code 1.
    Other(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::UnknownName(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(AppError::Output(e)) => {
            eprintln!("failed to write output: {e}");
            ExitCode::from(3)
        }
        Err(AppError::Other(e)) => {
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    match cli.command {
        Command::Loocv {
            distance,
            transform,
            threads,
            train_per_class,
            test_per_class,
            length,
            out,
        } => {
            let train = synth::dataset(&mut rng, train_per_class, length, 0.05)?;
            let test = synth::dataset(&mut rng, test_per_class, length, 0.05)?;
            let train = apply_transform(&train, &transform)?;
            let test = apply_transform(&test, &transform)?;

            let grid = build_grid(&distance, &train, cli.seed)?;
            info!(
                distance = %distance,
                transform = %transform,
                grid_len = grid.len(),
                "running LOOCV"
            );

            let mut config = LoocvConfig::new().with_seed(cli.seed);
            if threads > 0 {
                config = config.with_nb_threads(threads);
            }
            let mut reporter = TraceReporter;
            let outcome = loocv(&train, &test, &grid, &config, None, Some(&mut reporter))
                .map_err(|e| AppError::Other(e.into()))?;

            let record = outcome.to_json();
            println!("{record:#}");
            if let Some(path) = out {
                std::fs::write(&path, format!("{record}\n")).map_err(AppError::Output)?;
                info!(path = %path.display(), "record written");
            }
            Ok(())
        }
        Command::Forest {
            trees,
            candidates,
            train_per_class,
            test_per_class,
            length,
        } => {
            let train = synth::dataset(&mut rng, train_per_class, length, 0.05)?;
            let test = synth::dataset(&mut rng, test_per_class, length, 0.05)?;

            let forest = ProximityForestConfig::new()
                .with_nb_trees(trees)
                .with_nb_candidates(candidates)
                .with_seed(cli.seed)
                .fit(&train, &SamplerConfig::new())
                .map_err(|e| AppError::Other(e.into()))?;
            let evaluation = forest
                .evaluate(&test, cli.seed)
                .map_err(|e| AppError::Other(e.into()))?;

            let record = serde_json::json!({
                "status": "success",
                "forest": { "nb_trees": trees, "nb_candidates": candidates },
                "test": {
                    "nb_correct": evaluation.nb_correct,
                    "accuracy": evaluation.accuracy,
                },
            });
            println!("{record:#}");
            Ok(())
        }
    }
}

fn apply_transform(dataset: &Dataset, name: &str) -> Result<Dataset, AppError> {
    dataset
        .transform(name)
        .map_err(|e| AppError::UnknownName(e.to_string()))
}

/// Parameter grid for one distance family, scaled to the training data
/// where the family calls for it. Cheaper and stricter parameterizations
/// come first.
fn build_grid(name: &str, train: &Dataset, seed: u64) -> Result<Vec<Distance>, AppError> {
    let length_max = train.header().length_max();
    let window_top = (length_max + 1) / 4;
    let exponents = [0.5, 1.0, 2.0];
    let grid = match name {
        "direct" => exponents
            .iter()
            .map(|&exponent| Distance::Direct { exponent })
            .collect(),
        "dtw" => exponents
            .iter()
            .map(|&exponent| Distance::Dtw { exponent })
            .collect(),
        "cdtw" => spread(window_top, 20)
            .into_iter()
            .map(|window| Distance::Cdtw {
                exponent: 2.0,
                window,
            })
            .collect(),
        "wdtw" => (0..20)
            .map(|i| Distance::wdtw(2.0, i as f64 / 20.0, length_max))
            .collect(),
        "adtw" => {
            let scale = mean_direct_distance(train, seed);
            (0..20)
                .map(|i| Distance::Adtw {
                    exponent: 2.0,
                    penalty: (i as f64 / 19.0).powi(5) * scale,
                })
                .collect()
        }
        "erp" => {
            let sigma = pooled_stddev(train, &IndexSet::full(train.size()));
            let mut grid = Vec::new();
            for window in spread(window_top, 4) {
                for i in 0..5 {
                    grid.push(Distance::Erp {
                        exponent: 2.0,
                        gap_value: sigma * (0.2 + 0.16 * i as f64),
                        window,
                    });
                }
            }
            grid
        }
        "lcss" => {
            let sigma = pooled_stddev(train, &IndexSet::full(train.size()));
            let mut grid = Vec::new();
            for window in spread(window_top, 4) {
                for i in 0..5 {
                    grid.push(Distance::Lcss {
                        epsilon: sigma * (0.2 + 0.16 * i as f64),
                        window,
                    });
                }
            }
            grid
        }
        "msm" => (0..20)
            .map(|i| Distance::Msm {
                cost: 10.0f64.powf(-2.0 + 4.0 * i as f64 / 19.0),
            })
            .collect(),
        "twe" => {
            let mut grid = Vec::new();
            for e in 0i32..5 {
                for l in 0..4 {
                    grid.push(Distance::Twe {
                        nu: 10.0f64.powi(e - 5),
                        lambda: f64::from(l) * 0.033,
                    });
                }
            }
            grid
        }
        "sbd" => vec![Distance::Sbd],
        "lorentzian" => vec![Distance::Lorentzian],
        "modminkowski" => exponents
            .iter()
            .map(|&exponent| Distance::ModMinkowski { exponent })
            .collect(),
        _ => {
            return Err(AppError::UnknownName(
                DistanceError::UnknownDistance {
                    name: name.to_string(),
                }
                .to_string(),
            ));
        }
    };
    Ok(grid)
}

/// Up to `count` evenly spaced values covering `0..=top`.
fn spread(top: usize, count: usize) -> Vec<usize> {
    if top == 0 || count <= 1 {
        return vec![0];
    }
    let count = count.min(top + 1);
    let mut values: Vec<usize> = (0..count).map(|i| i * top / (count - 1)).collect();
    values.dedup();
    values
}

/// Mean direct-alignment distance over a few sampled training pairs, used
/// to put the ADTW penalty grid on the scale of the data.
fn mean_direct_distance(train: &Dataset, seed: u64) -> f64 {
    use rand::Rng;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = train.size();
    let mut sum = 0.0;
    let mut count = 0usize;
    for _ in 0..20 {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        if a == b {
            continue;
        }
        let d = direct(
            train.series(a).as_view(),
            train.series(b).as_view(),
            2.0,
            f64::INFINITY,
        );
        if d.is_finite() {
            sum += d;
            count += 1;
        }
    }
    if count > 0 { sum / count as f64 } else { 1.0 }
}

/// Reporter forwarding engine records to the log.
struct TraceReporter;

impl Reporter for TraceReporter {
    fn report(&mut self, record: &Value) {
        info!(%record, "engine record");
    }
}
