//! Linear map from feature space onto a selected basis.
//!
//! No centering or scaling happens here; callers that want mean-free coordinates
//! center the observations before decomposing and projecting them.

use crate::error::{PcaError, Result};
use ndarray::{Array2, ArrayView2};

/// `R = P^T X`: coordinates of every sample (column of `x`) in the basis `p`.
///
/// `p` is `d x k` and `x` is `d x m`; the result is `k x m`.
pub fn project(p: ArrayView2<f64>, x: ArrayView2<f64>) -> Result<Array2<f64>> {
    if p.nrows() != x.nrows() {
        return Err(PcaError::invalid(format!(
            "basis has {} features but observations have {}",
            p.nrows(),
            x.nrows()
        )));
    }
    Ok(p.t().dot(&x))
}

/// `P R`: maps `k x m` coordinates back into the `d`-dimensional feature space.
///
/// With an orthonormal basis this is the orthogonal projection of the original
/// samples onto the span of `p`.
pub fn back_project(p: ArrayView2<f64>, coordinates: ArrayView2<f64>) -> Result<Array2<f64>> {
    if p.ncols() != coordinates.nrows() {
        return Err(PcaError::invalid(format!(
            "basis has {} components but coordinates have {} rows",
            p.ncols(),
            coordinates.nrows()
        )));
    }
    Ok(p.dot(&coordinates))
}
