use crate::error::{PcaError, Result};
use crate::svd::SvdBackend;
use ndarray::{Array1, Array2, ArrayView2};
use nshare::{IntoNalgebra, IntoNdarray2};

/// Golub-Kahan SVD through nalgebra: Householder bidiagonalization, then implicit
/// shifted QR on the bidiagonal.
///
/// nalgebra already produces the thin factors (`U` is `d x min(d, m)`, `Vh` is
/// `min(d, m) x m`), which is exactly the economy form we need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GolubKahanSvd {
    /// Convergence threshold handed to the QR sweeps.
    pub eps: f64,
    /// Upper bound on QR iterations; exceeding it is a decomposition failure.
    pub max_iterations: usize,
}

impl Default for GolubKahanSvd {
    fn default() -> Self {
        GolubKahanSvd {
            eps: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

impl SvdBackend for GolubKahanSvd {
    fn name(&self) -> &'static str {
        "golub-kahan"
    }

    fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        let matrix = x.into_nalgebra().clone_owned();

        let svd = nalgebra::SVD::try_new(matrix, true, true, self.eps, self.max_iterations)
            .ok_or_else(|| {
                PcaError::decomposition(format!(
                    "implicit QR did not converge within {} iterations",
                    self.max_iterations
                ))
            })?;

        let u = svd
            .u
            .ok_or_else(|| PcaError::decomposition("left singular vectors were not computed"))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| PcaError::decomposition("right singular vectors were not computed"))?;
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        Ok((u.into_ndarray2(), s, v_t.into_ndarray2()))
    }
}
