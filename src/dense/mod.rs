use crate::error::{PcaError, Result};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

/// Checks the observation matrix contract: both dimensions non-zero, every entry finite.
pub fn validate_observations<S>(x: &ArrayBase<S, Ix2>) -> Result<()>
where
    S: Data<Elem = f64>,
{
    let (d, m) = x.dim();
    if d == 0 || m == 0 {
        return Err(PcaError::invalid(format!(
            "observation matrix must have at least one feature and one sample, got {} x {}",
            d, m
        )));
    }

    if let Some(((row, col), value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PcaError::invalid(format!(
            "non-finite entry {} at feature {}, sample {}",
            value, row, col
        )));
    }

    Ok(())
}

/// Feature-wise centering for matrices laid out as features x samples.
pub trait CenterFeatures {
    /// Mean of every feature (row) across samples.
    fn feature_means(&self) -> Result<Array1<f64>>;

    /// Copy of the matrix with each feature's mean subtracted.
    fn centered(&self, means: &Array1<f64>) -> Result<Array2<f64>>;
}

impl<S> CenterFeatures for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn feature_means(&self) -> Result<Array1<f64>> {
        self.mean_axis(Axis(1))
            .ok_or_else(|| PcaError::invalid("cannot compute feature means without samples"))
    }

    fn centered(&self, means: &Array1<f64>) -> Result<Array2<f64>> {
        if means.len() != self.nrows() {
            return Err(PcaError::invalid(format!(
                "length of means ({}) does not match number of features ({})",
                means.len(),
                self.nrows()
            )));
        }

        let mut out = self.to_owned();
        for (mut row, &mean) in out.axis_iter_mut(Axis(0)).zip(means.iter()) {
            row -= mean;
        }
        Ok(out)
    }
}
