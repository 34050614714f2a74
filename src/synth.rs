//! Seeded synthetic benchmark data for the demonstration commands.
//!
//! Three shape classes over a configurable length: noisy shifted pulses,
//! noisy plateaus, and noisy descending ramps. Separable by any sensible
//! elastic distance, which makes the end-to-end runs easy to eyeball.

use protea_data::{Dataset, Series};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Build `nb_per_class` series per class of the given length.
pub fn dataset(
    rng: &mut ChaCha8Rng,
    nb_per_class: usize,
    length: usize,
    noise: f64,
) -> anyhow::Result<Dataset> {
    anyhow::ensure!(length > 0, "series length must be at least 1");
    let mut series = Vec::with_capacity(nb_per_class * 3);
    for _ in 0..nb_per_class {
        series.push(pulse(rng, length, noise)?);
        series.push(plateau(rng, length, noise)?);
        series.push(ramp(rng, length, noise)?);
    }
    Ok(Dataset::new(series)?)
}

fn jitter(rng: &mut ChaCha8Rng, noise: f64) -> f64 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

fn pulse(rng: &mut ChaCha8Rng, length: usize, noise: f64) -> anyhow::Result<Series> {
    let position = rng.gen_range(0..length);
    let values = (0..length)
        .map(|i| {
            let base = if i == position { 1.0 } else { 0.0 };
            base + jitter(rng, noise)
        })
        .collect();
    Ok(Series::new(values, 1, Some("pulse".to_string()))?)
}

fn plateau(rng: &mut ChaCha8Rng, length: usize, noise: f64) -> anyhow::Result<Series> {
    let level = rng.gen_range(4.0..6.0);
    let values = (0..length).map(|_| level + jitter(rng, noise)).collect();
    Ok(Series::new(values, 1, Some("plateau".to_string()))?)
}

fn ramp(rng: &mut ChaCha8Rng, length: usize, noise: f64) -> anyhow::Result<Series> {
    let slope = rng.gen_range(0.5..1.5);
    let values = (0..length)
        .map(|i| -slope * i as f64 + jitter(rng, noise))
        .collect();
    Ok(Series::new(values, 1, Some("ramp".to_string()))?)
}
