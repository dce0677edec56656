use ndarray::{Array2, ArrayView2};

/// Square root of the sum of squared entries.
///
/// Entries are divided by the largest magnitude before squaring, so matrices near
/// the ends of the `f64` range neither overflow nor flush to zero.
pub fn frobenius_norm(a: ArrayView2<f64>) -> f64 {
    let scale = max_abs(a);
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale * a.iter().map(|&v| (v / scale).powi(2)).sum::<f64>().sqrt()
}

/// Largest absolute entry, `0.0` for an empty matrix.
pub fn max_abs(a: ArrayView2<f64>) -> f64 {
    a.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()))
}

/// Frobenius distance between the Gram matrix of the columns of `q` and the identity.
///
/// Zero for a matrix with orthonormal columns. Pass `q.t()` to measure the rows.
pub fn orthonormality_defect(q: ArrayView2<f64>) -> f64 {
    let gram = q.t().dot(&q);
    let identity = Array2::<f64>::eye(gram.nrows());
    frobenius_norm((&gram - &identity).view())
}

/// Frobenius distance between the orthogonal projectors onto the column spaces of `a` and `b`.
///
/// Both inputs need orthonormal columns. The value is invariant under sign flips and
/// rotations within each basis, which makes it the right comparison for singular
/// vectors coming out of different decompositions.
pub fn subspace_distance(a: ArrayView2<f64>, b: ArrayView2<f64>) -> f64 {
    let pa = a.dot(&a.t());
    let pb = b.dot(&b.t());
    frobenius_norm((&pa - &pb).view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_frobenius_norm() {
        let a = array![[3.0, 0.0], [0.0, 4.0]];
        assert_relative_eq!(frobenius_norm(a.view()), 5.0);
        assert_relative_eq!(frobenius_norm((&a * 1e200).view()), 5e200, max_relative = 1e-14);
        assert_relative_eq!(frobenius_norm((&a * 1e-200).view()), 5e-200, max_relative = 1e-14);
        assert_eq!(frobenius_norm(Array2::<f64>::zeros((2, 2)).view()), 0.0);
    }

    #[test]
    fn test_max_abs() {
        let a = array![[1.0, -7.5], [2.0, 3.0]];
        assert_relative_eq!(max_abs(a.view()), 7.5);
        assert_relative_eq!(max_abs(Array2::<f64>::zeros((0, 3)).view()), 0.0);
    }

    #[test]
    fn test_orthonormality_defect() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let q = array![[s, s], [s, -s], [0.0, 0.0]];
        assert!(orthonormality_defect(q.view()) < 1e-12);

        let not_orthonormal = array![[1.0, 1.0], [0.0, 1.0]];
        assert!(orthonormality_defect(not_orthonormal.view()) > 0.5);
    }

    #[test]
    fn test_subspace_distance_ignores_sign_and_rotation() {
        let a = array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let b = array![[-s, s], [s, s], [0.0, 0.0]];
        assert!(subspace_distance(a.view(), b.view()) < 1e-12);

        let c = array![[1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];
        assert_relative_eq!(subspace_distance(a.view(), c.view()), 2.0f64.sqrt(), epsilon = 1e-12);
    }
}
