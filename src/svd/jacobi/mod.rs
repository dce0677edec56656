//! One-sided (Hestenes) Jacobi SVD.
//!
//! Plane rotations are applied to pairs of columns until every pair is numerically
//! orthogonal. The column norms are then the singular values, the normalized columns
//! the left singular vectors and the accumulated rotations the right singular vectors.
//! The method works on tall matrices; wide inputs are handled through their transpose.

use crate::error::{PcaError, Result};
use crate::svd::SvdBackend;
use crate::utils::max_abs;
use log::trace;
use ndarray::{Array1, Array2, ArrayView2, Axis};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneSidedJacobi {
    /// Maximum number of full sweeps over all column pairs.
    pub max_sweeps: usize,
    /// Relative orthogonality threshold; `None` scales machine epsilon by the column length.
    pub tolerance: Option<f64>,
}

impl Default for OneSidedJacobi {
    fn default() -> Self {
        OneSidedJacobi {
            max_sweeps: 60,
            tolerance: None,
        }
    }
}

impl SvdBackend for OneSidedJacobi {
    fn name(&self) -> &'static str {
        "one-sided-jacobi"
    }

    fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        let (d, m) = x.dim();
        if d >= m {
            let (u, s, v) = self.factorize_tall(x.to_owned())?;
            Ok((u, s, v.reversed_axes()))
        } else {
            // X^T = U' S V'^T, hence X = V' S U'^T.
            let (u, s, v) = self.factorize_tall(x.t().to_owned())?;
            Ok((v, s, u.reversed_axes()))
        }
    }
}

impl OneSidedJacobi {
    /// Factorizes a `p x n` matrix with `p >= n`, returning `(U, s, V)` with `U` of shape
    /// `p x n` and `V` of shape `n x n`.
    fn factorize_tall(&self, mut a: Array2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        let (p, n) = a.dim();
        let tol = self.tolerance.unwrap_or(4.0 * f64::EPSILON * p as f64);

        // Column inner products square the entries; keep them inside the f64 range.
        let scale = max_abs(a.view());
        if scale > 0.0 {
            a.mapv_inplace(|v| v / scale);
        }
        let mut v = Array2::<f64>::eye(n);

        let mut converged = false;
        for sweep in 0..self.max_sweeps {
            let mut rotations = 0usize;

            for i in 0..n.saturating_sub(1) {
                for j in (i + 1)..n {
                    let alpha = a.column(i).dot(&a.column(i));
                    let beta = a.column(j).dot(&a.column(j));
                    let gamma = a.column(i).dot(&a.column(j));

                    if gamma.abs() <= tol * (alpha * beta).sqrt() {
                        continue;
                    }

                    let zeta = (beta - alpha) / (2.0 * gamma);
                    let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                    let c = 1.0 / (1.0 + t * t).sqrt();
                    let s = c * t;

                    rotate_columns(&mut a, i, j, c, s);
                    rotate_columns(&mut v, i, j, c, s);
                    rotations += 1;
                }
            }

            trace!("jacobi sweep {}: {} rotations", sweep, rotations);
            if rotations == 0 {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(PcaError::decomposition(format!(
                "one-sided Jacobi did not converge within {} sweeps",
                self.max_sweeps
            )));
        }

        let norms: Array1<f64> = a
            .axis_iter(Axis(1))
            .map(|col| col.dot(&col).sqrt())
            .collect();
        let norm_max = norms.iter().cloned().fold(0.0f64, f64::max);
        let negligible = norm_max * f64::EPSILON * p as f64;

        let mut u = Array2::<f64>::zeros((p, n));
        let mut filled = vec![false; n];
        for k in 0..n {
            if norms[k] > negligible && norms[k] > 0.0 {
                u.column_mut(k).assign(&(&a.column(k) / norms[k]));
                filled[k] = true;
            }
        }
        complete_orthonormal_columns(&mut u, &mut filled);

        let s = if scale > 0.0 { norms * scale } else { norms };
        Ok((u, s, v))
    }
}

fn rotate_columns(m: &mut Array2<f64>, i: usize, j: usize, c: f64, s: f64) {
    for k in 0..m.nrows() {
        let mi = m[[k, i]];
        let mj = m[[k, j]];
        m[[k, i]] = c * mi - s * mj;
        m[[k, j]] = s * mi + c * mj;
    }
}

/// Fills the columns not yet marked in `filled` with unit vectors orthogonal to every
/// filled column, picking at each step the standard basis vector with the largest
/// residual after two Gram-Schmidt passes.
fn complete_orthonormal_columns(u: &mut Array2<f64>, filled: &mut [bool]) {
    let p = u.nrows();
    for target in 0..filled.len() {
        if filled[target] {
            continue;
        }

        let mut best: Option<(f64, Array1<f64>)> = None;
        for e in 0..p {
            let mut w = Array1::<f64>::zeros(p);
            w[e] = 1.0;
            for _ in 0..2 {
                for (q, _) in filled.iter().enumerate().filter(|(_, f)| **f) {
                    let proj = u.column(q).dot(&w);
                    w.scaled_add(-proj, &u.column(q));
                }
            }
            let norm = w.dot(&w).sqrt();
            if best.as_ref().map_or(true, |(b, _)| norm > *b) {
                best = Some((norm, w));
            }
        }

        if let Some((norm, w)) = best {
            u.column_mut(target).assign(&(w / norm));
            filled[target] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{frobenius_norm, orthonormality_defect};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_tall_factorization() {
        let x = array![[3.0, 2.0], [2.0, 3.0], [2.0, -2.0]];
        let (u, s, vt) = OneSidedJacobi::default().factorize(x.view()).unwrap();
        assert_eq!(u.dim(), (3, 2));
        assert_eq!(vt.dim(), (2, 2));

        let mut values = s.to_vec();
        values.sort_by(|a, b| b.total_cmp(a));
        assert_abs_diff_eq!(values[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-12);

        let rebuilt = (&u * &s).dot(&vt);
        assert!(frobenius_norm((&x - &rebuilt).view()) < 1e-12);
    }

    #[test]
    fn test_wide_uses_transpose() {
        let x = array![[3.0, 2.0, 2.0], [2.0, 3.0, -2.0]];
        let (u, s, vt) = OneSidedJacobi::default().factorize(x.view()).unwrap();
        assert_eq!(u.dim(), (2, 2));
        assert_eq!(s.len(), 2);
        assert_eq!(vt.dim(), (2, 3));
        assert!(orthonormality_defect(u.view()) < 1e-12);
        assert!(orthonormality_defect(vt.t()) < 1e-12);
    }

    #[test]
    fn test_completes_basis_for_null_columns() {
        let x = array![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let (u, s, _) = OneSidedJacobi::default().factorize(x.view()).unwrap();
        assert_eq!(s.iter().filter(|&&v| v > 0.0).count(), 1);
        assert!(orthonormality_defect(u.view()) < 1e-12);
    }

    #[test]
    fn test_extreme_magnitudes() {
        let x = array![[3.0, 2.0, 2.0], [2.0, 3.0, -2.0]];
        for scale in [1e-170, 1e170] {
            let scaled = &x * scale;
            let (u, s, vt) = OneSidedJacobi::default().factorize(scaled.view()).unwrap();

            let mut values = s.mapv(|v| v / scale).to_vec();
            values.sort_by(|a, b| b.total_cmp(a));
            assert_abs_diff_eq!(values[0], 5.0, epsilon = 1e-12);
            assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-12);

            let rebuilt = (&u * &s).dot(&vt).mapv(|v| v / scale);
            assert!(frobenius_norm((&x - &rebuilt).view()) < 1e-12);
            assert!(orthonormality_defect(u.view()) < 1e-12);
        }
    }

    #[test]
    fn test_sweep_budget_exhaustion() {
        let x = array![[1.0, 1.0], [0.0, 1.0], [1.0, 0.0]];
        let jacobi = OneSidedJacobi {
            max_sweeps: 0,
            tolerance: None,
        };
        assert!(matches!(
            jacobi.factorize(x.view()),
            Err(PcaError::DecompositionFailure(_))
        ));
    }
}
