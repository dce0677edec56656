//! # Thin Singular Value Decomposition
//!
//! Computes `X = U · diag(s) · Vh` in economy form: for a `d x m` input only
//! `r = min(d, m)` singular triples are produced, so the full `d x d` or `m x m`
//! orthogonal factors are never materialized.
//!
//! The factorization itself is delegated to an [`SvdBackend`]. Whatever the backend
//! returns is checked and canonicalized here: shapes must match the thin form, every
//! entry must be finite, singular values are made non-negative and the triples are
//! sorted so that `s[0] >= s[1] >= ... >= s[r - 1] >= 0`. The sign of each singular
//! vector pair is left to the backend.

use crate::dense::validate_observations;
use crate::error::{PcaError, Result};
use log::{debug, trace};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

pub mod golub_kahan;
pub mod jacobi;

pub use golub_kahan::GolubKahanSvd;
pub use jacobi::OneSidedJacobi;

/// A routine able to factorize a dense matrix into thin SVD factors.
///
/// Implementations return `(U, s, Vh)` with shapes `d x r`, `r` and `r x m`. Order and
/// sign of the singular values are normalized by [`Svd::compute_with`], so a backend
/// does not have to sort.
pub trait SvdBackend {
    fn name(&self) -> &'static str;

    fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)>;
}

impl<B: SvdBackend + ?Sized> SvdBackend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        (**self).factorize(x)
    }
}

/// Runtime choice between the bundled backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvdMethod {
    /// Householder bidiagonalization followed by implicit QR sweeps (nalgebra).
    #[default]
    GolubKahan,
    /// One-sided Hestenes-Jacobi rotations on the columns.
    Jacobi,
}

impl SvdBackend for SvdMethod {
    fn name(&self) -> &'static str {
        match self {
            SvdMethod::GolubKahan => GolubKahanSvd::default().name(),
            SvdMethod::Jacobi => OneSidedJacobi::default().name(),
        }
    }

    fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        match self {
            SvdMethod::GolubKahan => GolubKahanSvd::default().factorize(x),
            SvdMethod::Jacobi => OneSidedJacobi::default().factorize(x),
        }
    }
}

/// Economy-size singular value decomposition of a `d x m` matrix.
#[derive(Debug, Clone)]
pub struct Svd {
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
}

impl Svd {
    /// Decomposes `x` with the default backend.
    pub fn compute(x: ArrayView2<f64>) -> Result<Self> {
        Self::compute_with(x, &GolubKahanSvd::default())
    }

    /// Decomposes `x` with the given backend.
    ///
    /// # Errors
    /// - [`PcaError::InvalidInput`] when `x` has a zero dimension or a non-finite entry.
    /// - [`PcaError::DecompositionFailure`] when the backend does not converge or hands
    ///   back factors that violate the thin-SVD shape contract.
    pub fn compute_with<B: SvdBackend + ?Sized>(x: ArrayView2<f64>, backend: &B) -> Result<Self> {
        validate_observations(&x)?;
        let (d, m) = x.dim();
        debug!(
            "computing thin SVD of a {} x {} matrix with {}",
            d,
            m,
            backend.name()
        );

        let (u, s, vt) = backend.factorize(x)?;
        let svd = Self::from_parts(u, s, vt, (d, m))?;
        trace!("singular values: {:?}", svd.s);
        Ok(svd)
    }

    fn from_parts(
        mut u: Array2<f64>,
        mut s: Array1<f64>,
        mut vt: Array2<f64>,
        (d, m): (usize, usize),
    ) -> Result<Self> {
        let r = d.min(m);
        if u.dim() != (d, r) || s.len() != r || vt.dim() != (r, m) {
            return Err(PcaError::decomposition(format!(
                "backend returned factors of shape {:?}, ({},) and {:?} for a {} x {} input",
                u.dim(),
                s.len(),
                vt.dim(),
                d,
                m
            )));
        }

        if u.iter().chain(s.iter()).chain(vt.iter()).any(|v| !v.is_finite()) {
            return Err(PcaError::decomposition(
                "backend returned non-finite factors",
            ));
        }

        for i in 0..r {
            if s[i] < 0.0 {
                s[i] = -s[i];
                u.column_mut(i).mapv_inplace(|v| -v);
            }
        }

        let mut order: Vec<usize> = (0..r).collect();
        order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));
        if order.iter().enumerate().any(|(i, &o)| i != o) {
            reorder_triples(&mut u, &mut s, &mut vt, &order);
        }

        Ok(Svd { u, s, vt })
    }

    /// Left singular vectors, `d x r`.
    pub fn u(&self) -> ArrayView2<'_, f64> {
        self.u.view()
    }

    /// Singular values in descending order.
    pub fn s(&self) -> ArrayView1<'_, f64> {
        self.s.view()
    }

    /// Right singular vectors as rows, `r x m`.
    pub fn vt(&self) -> ArrayView2<'_, f64> {
        self.vt.view()
    }

    /// Number of singular triples, `min(d, m)`.
    pub fn rank_bound(&self) -> usize {
        self.s.len()
    }

    /// Shape `(d, m)` of the decomposed matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.u.nrows(), self.vt.ncols())
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
        (self.u, self.s, self.vt)
    }

    /// Rebuilds the decomposed matrix from all triples.
    pub fn reconstruct(&self) -> Array2<f64> {
        let scaled = &self.u * &self.s;
        scaled.dot(&self.vt)
    }

    /// Best rank-`k` approximation in the Frobenius norm, built from the top `k` triples.
    pub fn low_rank_approximation(&self, k: usize) -> Result<Array2<f64>> {
        let r = self.rank_bound();
        if k > r {
            return Err(PcaError::invalid(format!(
                "cannot truncate to rank {} with only {} singular triples",
                k, r
            )));
        }

        let scaled = &self.u.slice(s![.., ..k]) * &self.s.slice(s![..k]);
        Ok(scaled.dot(&self.vt.slice(s![..k, ..])))
    }

    /// Frobenius error of [`Svd::low_rank_approximation`]: `sqrt(sum_{i >= k} s_i^2)`.
    pub fn truncation_error(&self, k: usize) -> f64 {
        self.s
            .iter()
            .skip(k)
            .map(|&v| v * v)
            .sum::<f64>()
            .sqrt()
    }
}

fn reorder_triples(u: &mut Array2<f64>, s: &mut Array1<f64>, vt: &mut Array2<f64>, order: &[usize]) {
    let u_temp = u.clone();
    let s_temp = s.clone();
    let vt_temp = vt.clone();

    for (i, &idx) in order.iter().enumerate() {
        s[i] = s_temp[idx];
        u.column_mut(i).assign(&u_temp.column(idx));
        vt.row_mut(i).assign(&vt_temp.row(idx));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::{frobenius_norm, orthonormality_defect, subspace_distance};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn random_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| rng.random_range(-1.0..1.0))
    }

    pub(crate) fn assert_thin_svd_contract(x: &Array2<f64>, svd: &Svd) {
        let (d, m) = x.dim();
        let r = d.min(m);
        assert_eq!(svd.u().dim(), (d, r));
        assert_eq!(svd.s().len(), r);
        assert_eq!(svd.vt().dim(), (r, m));

        let x_norm = frobenius_norm(x.view());
        let residual = frobenius_norm((x - &svd.reconstruct()).view());
        assert!(
            residual <= 1e-10 * x_norm,
            "reconstruction residual {} too large",
            residual
        );

        assert!(orthonormality_defect(svd.u()) <= 1e-10);
        assert!(orthonormality_defect(svd.vt().t()) <= 1e-10);

        for w in svd.s().windows(2) {
            assert!(w[0] >= w[1], "singular values not descending: {:?}", svd.s());
        }
        assert!(svd.s().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_simple_svd() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let svd = Svd::compute(a.view()).unwrap();

        assert_eq!(svd.u().shape(), &[2, 2]);
        assert_eq!(svd.s().len(), 2);
        assert_eq!(svd.vt().shape(), &[2, 2]);

        assert_abs_diff_eq!(svd.s()[0], 5.4649857, epsilon = 1e-6);
        assert_abs_diff_eq!(svd.s()[1], 0.3659662, epsilon = 1e-6);

        let reconstructed = svd.reconstruct();
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(reconstructed[[i, j]], a[[i, j]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_contract_on_rectangular_inputs() {
        for (seed, (d, m)) in [(4, 13), (13, 4), (7, 7), (1, 9), (9, 1), (13, 178)]
            .into_iter()
            .enumerate()
        {
            let x = random_matrix(d, m, seed as u64);
            for method in [SvdMethod::GolubKahan, SvdMethod::Jacobi] {
                let svd = Svd::compute_with(x.view(), &method).unwrap();
                assert_thin_svd_contract(&x, &svd);
            }
        }
    }

    #[test]
    fn test_contract_at_extreme_magnitudes() {
        let base = random_matrix(4, 9, 1);
        let reference = Svd::compute(base.view()).unwrap();
        for scale in [1e-170, 1e170] {
            let x = &base * scale;
            for method in [SvdMethod::GolubKahan, SvdMethod::Jacobi] {
                let svd = Svd::compute_with(x.view(), &method).unwrap();
                assert_thin_svd_contract(&x, &svd);
                for (got, want) in svd.s().iter().zip(reference.s().iter()) {
                    assert_relative_eq!(got / scale, *want, max_relative = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_rank_deficient_input() {
        let col = array![1.0, 2.0, 3.0, 4.0];
        let row = array![1.0, -1.0, 0.5, 2.0, 0.0];
        let x = Array2::from_shape_fn((4, 5), |(i, j)| col[i] * row[j]);

        for method in [SvdMethod::GolubKahan, SvdMethod::Jacobi] {
            let svd = Svd::compute_with(x.view(), &method).unwrap();
            assert_thin_svd_contract(&x, &svd);
            assert!(svd.s()[0] > 1.0);
            assert!(svd.s().iter().skip(1).all(|&v| v < 1e-10));
        }
    }

    #[test]
    fn test_zero_matrix() {
        let x = Array2::<f64>::zeros((3, 5));
        for method in [SvdMethod::GolubKahan, SvdMethod::Jacobi] {
            let svd = Svd::compute_with(x.view(), &method).unwrap();
            assert!(svd.s().iter().all(|&v| v == 0.0));
            assert!(orthonormality_defect(svd.u()) <= 1e-10);
            assert!(orthonormality_defect(svd.vt().t()) <= 1e-10);
        }
    }

    #[test]
    fn test_rejects_invalid_input() {
        let x = array![[1.0, f64::NAN], [3.0, 4.0]];
        assert!(matches!(
            Svd::compute(x.view()),
            Err(PcaError::InvalidInput(_))
        ));

        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            Svd::compute(empty.view()),
            Err(PcaError::InvalidInput(_))
        ));
    }

    struct Unconverged;

    impl SvdBackend for Unconverged {
        fn name(&self) -> &'static str {
            "unconverged"
        }

        fn factorize(&self, _x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
            Err(PcaError::decomposition("no convergence"))
        }
    }

    struct FullSize;

    impl SvdBackend for FullSize {
        fn name(&self) -> &'static str {
            "full-size"
        }

        fn factorize(&self, x: ArrayView2<f64>) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
            let (d, m) = x.dim();
            Ok((
                Array2::eye(d),
                Array1::zeros(d.min(m)),
                Array2::eye(m),
            ))
        }
    }

    #[test]
    fn test_backend_failures_surface() {
        let x = random_matrix(3, 6, 11);
        assert!(matches!(
            Svd::compute_with(x.view(), &Unconverged),
            Err(PcaError::DecompositionFailure(_))
        ));
        assert!(matches!(
            Svd::compute_with(x.view(), &FullSize),
            Err(PcaError::DecompositionFailure(_))
        ));
    }

    #[test]
    fn test_reorders_and_fixes_signs() {
        let u = array![[0.0, 1.0], [1.0, 0.0]];
        let s = array![1.0, -3.0];
        let vt = array![[1.0, 0.0], [0.0, 1.0]];
        let svd = Svd::from_parts(u, s, vt, (2, 2)).unwrap();

        assert_eq!(svd.s().to_vec(), vec![3.0, 1.0]);
        assert_eq!(svd.u().column(0).to_vec(), vec![-1.0, 0.0]);
        assert_eq!(svd.vt().row(0).to_vec(), vec![0.0, 1.0]);
        assert_eq!(svd.reconstruct(), array![[0.0, -3.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_backends_agree_on_subspaces() {
        let x = random_matrix(6, 40, 3);
        let a = Svd::compute_with(x.view(), &SvdMethod::GolubKahan).unwrap();
        let b = Svd::compute_with(x.view(), &SvdMethod::Jacobi).unwrap();

        for (sa, sb) in a.s().iter().zip(b.s().iter()) {
            assert_abs_diff_eq!(sa, sb, epsilon = 1e-10);
        }

        for k in 1..=a.rank_bound() {
            let dist = subspace_distance(
                a.u().slice(s![.., ..k]),
                b.u().slice(s![.., ..k]),
            );
            assert!(dist < 1e-8, "leading {}-subspaces differ by {}", k, dist);
        }
    }

    #[test]
    fn test_truncation_error_matches_tail() {
        let x = random_matrix(5, 12, 21);
        let svd = Svd::compute(x.view()).unwrap();
        for k in 0..=svd.rank_bound() {
            let approx = svd.low_rank_approximation(k).unwrap();
            let err = frobenius_norm((&x - &approx).view());
            assert_abs_diff_eq!(err, svd.truncation_error(k), epsilon = 1e-10);
        }
        assert_abs_diff_eq!(svd.truncation_error(svd.rank_bound()), 0.0);
        assert!(svd.low_rank_approximation(svd.rank_bound() + 1).is_err());
    }

    #[test]
    fn test_eckart_young_against_random_rank_k() {
        let (d, m) = (6, 30);
        let x = random_matrix(d, m, 7);
        let svd = Svd::compute(x.view()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for k in 1..svd.rank_bound() {
            let best = svd.low_rank_approximation(k).unwrap();
            let best_err = frobenius_norm((&x - &best).view());

            let uk = svd.u().slice(s![.., ..k]).to_owned();
            let svk = &svd.vt().slice(s![..k, ..]) * &svd.s().slice(s![..k]).insert_axis(ndarray::Axis(1));

            for trial in 0..25 {
                let scale = 0.01 * (trial + 1) as f64;
                let left = &uk + &Array2::from_shape_fn((d, k), |_| scale * rng.random_range(-1.0..1.0));
                let right = &svk + &Array2::from_shape_fn((k, m), |_| scale * rng.random_range(-1.0..1.0));
                let perturbed = left.dot(&right);
                let err = frobenius_norm((&x - &perturbed).view());
                assert!(
                    best_err <= err + 1e-12,
                    "rank-{} perturbation beat the truncated SVD: {} < {}",
                    k,
                    err,
                    best_err
                );

                let a = Array2::from_shape_fn((d, k), |_| rng.random_range(-1.0..1.0));
                let b = Array2::from_shape_fn((k, m), |_| rng.random_range(-1.0..1.0));
                let err = frobenius_norm((&x - &a.dot(&b)).view());
                assert!(best_err <= err + 1e-12);
            }
        }
    }
}
