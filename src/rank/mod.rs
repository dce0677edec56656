//! Shape and numerical-rank diagnostics.
//!
//! Nothing here feeds back into the decomposition; the report is for sanity-checking
//! that a dataset actually spans its nominal number of dimensions.

use crate::error::Result;
use crate::svd::Svd;
use ndarray::{ArrayView1, ArrayView2};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeReport {
    pub n_features: usize,
    pub n_samples: usize,
    /// Count of singular values strictly above `tolerance`.
    pub rank: usize,
    pub tolerance: f64,
}

impl ShapeReport {
    /// Builds the report from an existing decomposition. `tolerance` defaults to
    /// [`default_tolerance`].
    pub fn from_svd(svd: &Svd, tolerance: Option<f64>) -> Self {
        let (d, m) = svd.shape();
        let tolerance = tolerance.unwrap_or_else(|| default_tolerance(svd.s(), (d, m)));
        ShapeReport {
            n_features: d,
            n_samples: m,
            rank: numerical_rank(svd.s(), tolerance),
            tolerance,
        }
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank == self.n_features.min(self.n_samples)
    }
}

impl fmt::Display for ShapeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} features x {} samples, numerical rank {} (tolerance {:.3e})",
            self.n_features, self.n_samples, self.rank, self.tolerance
        )
    }
}

/// `s_max * max(d, m) * eps`, the threshold below which a singular value is
/// indistinguishable from rounding noise.
pub fn default_tolerance(s: ArrayView1<f64>, (d, m): (usize, usize)) -> f64 {
    let s_max = s.iter().cloned().fold(0.0f64, f64::max);
    s_max * d.max(m) as f64 * f64::EPSILON
}

pub fn numerical_rank(s: ArrayView1<f64>, tolerance: f64) -> usize {
    s.iter().filter(|&&v| v > tolerance).count()
}

/// Decomposes `x` and reports its shape and numerical rank.
pub fn inspect(x: ArrayView2<f64>) -> Result<ShapeReport> {
    let svd = Svd::compute(x)?;
    Ok(ShapeReport::from_svd(&svd, None))
}
