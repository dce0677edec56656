//! Choice of the singular vectors spanning the projection subspace.
//!
//! Any ordered subset of columns of `U` may be selected, not only the leading ones:
//! projecting onto low-variance directions is how the loss of information outside
//! the top components is made visible.

use crate::error::{PcaError, Result};
use log::warn;
use ndarray::{Array2, ArrayView2, Axis};
use std::collections::HashSet;

/// Ordered column indices into the left singular vectors.
///
/// Indices are kept signed so that a negative request coming from user input is
/// reported as out of range instead of being rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSelection {
    indices: Vec<i64>,
}

impl ComponentSelection {
    pub fn new<I: IntoIterator<Item = i64>>(indices: I) -> Self {
        ComponentSelection {
            indices: indices.into_iter().collect(),
        }
    }

    /// The `k` leading principal directions, `{0, ..., k - 1}`.
    pub fn leading(k: usize) -> Self {
        ComponentSelection {
            indices: (0..k as i64).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.indices
    }

    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.indices.len());
        !self.indices.iter().all(|i| seen.insert(*i))
    }

    /// Validates every index against `rank` singular vectors and returns them as
    /// column positions, in request order.
    ///
    /// # Errors
    /// - [`PcaError::InvalidInput`] for an empty selection.
    /// - [`PcaError::IndexOutOfRange`] for the first index outside `[0, rank)`.
    pub fn resolve(&self, rank: usize) -> Result<Vec<usize>> {
        if self.indices.is_empty() {
            return Err(PcaError::invalid("at least one component must be selected"));
        }

        self.indices
            .iter()
            .map(|&index| {
                if index < 0 || index as u64 >= rank as u64 {
                    Err(PcaError::IndexOutOfRange { index, rank })
                } else {
                    Ok(index as usize)
                }
            })
            .collect()
    }
}

impl From<&[usize]> for ComponentSelection {
    fn from(indices: &[usize]) -> Self {
        ComponentSelection::new(indices.iter().map(|&i| i as i64))
    }
}

impl Default for ComponentSelection {
    fn default() -> Self {
        ComponentSelection::leading(2)
    }
}

/// Gathers `P = U[:, idx]`, a `d x |idx|` basis.
pub fn select_components(u: ArrayView2<f64>, selection: &ComponentSelection) -> Result<Array2<f64>> {
    let columns = selection.resolve(u.ncols())?;
    if selection.has_duplicates() {
        warn!(
            "component selection {:?} repeats an index, the projection is rank-deficient",
            selection.as_slice()
        );
    }
    Ok(u.select(Axis(1), &columns))
}
