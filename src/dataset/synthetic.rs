//! Seeded Gaussian class generators.
//!
//! The presets mimic the shape and per-class statistics of two classic labelled
//! tables: a 4-feature, 150-sample flower-measurement set and a 13-feature,
//! 178-sample wine-chemistry set. Features are sampled independently per class.

use crate::dataset::Dataset;
use crate::error::{PcaError, Result};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One labelled group of samples drawn around `center` with per-feature standard
/// deviation `spread`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSpec {
    pub label: i64,
    pub count: usize,
    pub center: Vec<f64>,
    pub spread: Vec<f64>,
}

/// Draws every class in order; samples of a class occupy consecutive columns.
pub fn gaussian_classes(specs: &[ClassSpec], seed: u64) -> Result<Dataset> {
    let first = specs
        .first()
        .ok_or_else(|| PcaError::invalid("at least one class is required"))?;
    let d = first.center.len();

    for spec in specs {
        if spec.center.len() != d || spec.spread.len() != d {
            return Err(PcaError::invalid(format!(
                "class {} has {} centers and {} spreads, expected {}",
                spec.label,
                spec.center.len(),
                spec.spread.len(),
                d
            )));
        }
        if spec.spread.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(PcaError::invalid(format!(
                "class {} has a negative or non-finite spread",
                spec.label
            )));
        }
    }

    let m: usize = specs.iter().map(|s| s.count).sum();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut observations = Array2::<f64>::zeros((d, m));
    let mut labels = Vec::with_capacity(m);

    let mut col = 0;
    for spec in specs {
        for _ in 0..spec.count {
            for f in 0..d {
                observations[[f, col]] = spec.center[f] + spec.spread[f] * standard_normal(&mut rng);
            }
            labels.push(spec.label);
            col += 1;
        }
    }

    Dataset::new(observations, labels)
}

/// Box-Muller transform of two uniform draws.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// 4 features x 150 samples, labels `1, 2, 3` with 50 samples each.
pub fn iris_like(seed: u64) -> Result<Dataset> {
    let specs = [
        ClassSpec {
            label: 1,
            count: 50,
            center: vec![5.01, 3.43, 1.46, 0.25],
            spread: vec![0.35, 0.38, 0.17, 0.11],
        },
        ClassSpec {
            label: 2,
            count: 50,
            center: vec![5.94, 2.77, 4.26, 1.33],
            spread: vec![0.52, 0.31, 0.47, 0.20],
        },
        ClassSpec {
            label: 3,
            count: 50,
            center: vec![6.59, 2.97, 5.55, 2.03],
            spread: vec![0.64, 0.32, 0.55, 0.27],
        },
    ];

    gaussian_classes(&specs, seed)?.with_feature_names(
        ["sepal_length", "sepal_width", "petal_length", "petal_width"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

/// 13 features x 178 samples, labels `1, 2, 3` with 59, 71 and 48 samples.
pub fn wine_like(seed: u64) -> Result<Dataset> {
    let specs = [
        ClassSpec {
            label: 1,
            count: 59,
            center: vec![
                13.74, 2.01, 2.46, 17.04, 106.3, 2.84, 2.98, 0.29, 1.90, 5.53, 1.06, 3.16, 1115.7,
            ],
            spread: vec![
                0.46, 0.69, 0.23, 2.55, 10.5, 0.34, 0.40, 0.07, 0.41, 1.24, 0.12, 0.36, 221.5,
            ],
        },
        ClassSpec {
            label: 2,
            count: 71,
            center: vec![
                12.28, 1.93, 2.24, 20.24, 94.5, 2.26, 2.08, 0.36, 1.63, 3.09, 1.06, 2.79, 519.5,
            ],
            spread: vec![
                0.54, 1.02, 0.32, 3.35, 16.8, 0.55, 0.71, 0.12, 0.60, 0.92, 0.20, 0.50, 157.2,
            ],
        },
        ClassSpec {
            label: 3,
            count: 48,
            center: vec![
                13.15, 3.33, 2.44, 21.42, 99.3, 1.68, 0.78, 0.45, 1.15, 7.40, 0.68, 1.68, 629.9,
            ],
            spread: vec![
                0.53, 1.09, 0.18, 2.26, 10.9, 0.36, 0.29, 0.12, 0.41, 2.31, 0.11, 0.27, 115.1,
            ],
        },
    ];

    gaussian_classes(&specs, seed)?.with_feature_names(
        [
            "alcohol",
            "malic_acid",
            "ash",
            "alcalinity_of_ash",
            "magnesium",
            "total_phenols",
            "flavanoids",
            "nonflavanoid_phenols",
            "proanthocyanins",
            "color_intensity",
            "hue",
            "od280_od315",
            "proline",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
}
