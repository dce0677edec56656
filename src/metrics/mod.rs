use crate::error::{PcaError, Result};
use ndarray::{Array1, ArrayView2, Axis};
use std::collections::BTreeMap;

/// Scatter of labelled points split into the part explained by the label means and
/// the part left inside each label group. Both terms are averaged over all points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSeparation {
    pub between: f64,
    pub within: f64,
    pub n_clusters: usize,
}

impl ClusterSeparation {
    /// `between / within`; infinite when every group collapses onto its mean.
    pub fn ratio(&self) -> f64 {
        if self.within == 0.0 {
            f64::INFINITY
        } else {
            self.between / self.within
        }
    }
}

/// Between- and within-label scatter of `coordinates` (`k x m`, one column per point).
pub fn cluster_separation(coordinates: ArrayView2<f64>, labels: &[i64]) -> Result<ClusterSeparation> {
    let m = coordinates.ncols();
    if m == 0 {
        return Err(PcaError::invalid("cannot measure separation without points"));
    }
    if labels.len() != m {
        return Err(PcaError::invalid(format!(
            "got {} labels for {} points",
            labels.len(),
            m
        )));
    }

    let k = coordinates.nrows();
    let mut sums: BTreeMap<i64, (Array1<f64>, usize)> = BTreeMap::new();
    for (point, &label) in coordinates.axis_iter(Axis(1)).zip(labels) {
        let entry = sums
            .entry(label)
            .or_insert_with(|| (Array1::zeros(k), 0));
        entry.0 += &point;
        entry.1 += 1;
    }

    let overall = coordinates.sum_axis(Axis(1)) / m as f64;
    let means: BTreeMap<i64, Array1<f64>> = sums
        .iter()
        .map(|(&label, (sum, count))| (label, sum / *count as f64))
        .collect();

    let between: f64 = sums
        .iter()
        .map(|(label, (_, count))| {
            let diff = &means[label] - &overall;
            *count as f64 * diff.dot(&diff)
        })
        .sum::<f64>()
        / m as f64;

    let within: f64 = coordinates
        .axis_iter(Axis(1))
        .zip(labels)
        .map(|(point, label)| {
            let diff = &point - &means[label];
            diff.dot(&diff)
        })
        .sum::<f64>()
        / m as f64;

    Ok(ClusterSeparation {
        between,
        within,
        n_clusters: sums.len(),
    })
}

/// Largest absolute coordinate, a quick measure of how far a projection spreads.
pub fn max_abs_coordinate(coordinates: ArrayView2<f64>) -> f64 {
    crate::utils::max_abs(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_two_tight_clusters() {
        let r = array![[0.0, 0.0, 10.0, 10.0], [1.0, -1.0, 1.0, -1.0]];
        let sep = cluster_separation(r.view(), &[1, 1, 2, 2]).unwrap();
        assert_eq!(sep.n_clusters, 2);
        assert_relative_eq!(sep.between, 25.0);
        assert_relative_eq!(sep.within, 1.0);
        assert_relative_eq!(sep.ratio(), 25.0);
    }

    #[test]
    fn test_total_scatter_decomposes() {
        let r = array![[1.0, 4.0, -2.0, 0.5, 3.0], [2.0, 0.0, 1.0, -1.0, 2.5]];
        let labels = [3, 1, 3, 2, 1];
        let sep = cluster_separation(r.view(), &labels).unwrap();

        let mean = r.sum_axis(Axis(1)) / 5.0;
        let total: f64 = r
            .axis_iter(Axis(1))
            .map(|p| {
                let d = &p - &mean;
                d.dot(&d)
            })
            .sum::<f64>()
            / 5.0;
        assert_relative_eq!(sep.between + sep.within, total, epsilon = 1e-12);
    }

    #[test]
    fn test_collapsed_groups() {
        let r = array![[1.0, 1.0, 5.0]];
        let sep = cluster_separation(r.view(), &[0, 0, 1]).unwrap();
        assert!(sep.ratio().is_infinite());
    }

    #[test]
    fn test_invalid_arguments() {
        let r = array![[1.0, 2.0]];
        assert!(cluster_separation(r.view(), &[1]).is_err());
        assert!(cluster_separation(ndarray::Array2::<f64>::zeros((2, 0)).view(), &[]).is_err());
    }

    #[test]
    fn test_max_abs_coordinate() {
        let r = array![[1.0, -4.0], [2.0, 3.0]];
        assert_relative_eq!(max_abs_coordinate(r.view()), 4.0);
    }
}
