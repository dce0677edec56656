use crate::dataset::Dataset;
use crate::dense::{validate_observations, CenterFeatures};
use crate::error::{PcaError, Result};
use crate::metrics::{cluster_separation, ClusterSeparation};
use crate::projection::project;
use crate::rank::ShapeReport;
use crate::selection::{select_components, ComponentSelection};
use crate::svd::{Svd, SvdBackend, SvdMethod};
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView2};

pub struct PcaBuilder<B: SvdBackend> {
    selection: ComponentSelection,
    center: bool,
    rank_tolerance: Option<f64>,
    backend: B,
}

impl<B: SvdBackend> PcaBuilder<B> {
    pub fn new(backend: B) -> Self {
        PcaBuilder {
            selection: ComponentSelection::default(),
            center: false,
            rank_tolerance: None,
            backend,
        }
    }

    /// Singular vectors to project onto, in order. Defaults to the two leading ones.
    pub fn components(mut self, selection: ComponentSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.selection = ComponentSelection::leading(n_components);
        self
    }

    /// Subtract each feature's mean before decomposing. Off by default, in which case
    /// the components are directions of largest second moment about the origin rather
    /// than of largest variance about the mean.
    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Threshold for the numerical rank in the shape report.
    pub fn rank_tolerance(mut self, tolerance: f64) -> Self {
        self.rank_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Pca<B> {
        Pca {
            selection: self.selection,
            center: self.center,
            rank_tolerance: self.rank_tolerance,
            backend: self.backend,
        }
    }
}

impl Default for PcaBuilder<SvdMethod> {
    fn default() -> Self {
        PcaBuilder::new(SvdMethod::default())
    }
}

/// Configured analysis: decompose, select, project. Holds no per-run state, so one
/// instance can analyze any number of matrices.
pub struct Pca<B: SvdBackend> {
    selection: ComponentSelection,
    center: bool,
    rank_tolerance: Option<f64>,
    backend: B,
}

impl<B: SvdBackend> Pca<B> {
    /// Runs the full pipeline on a `d x m` observation matrix.
    ///
    /// # Errors
    /// - [`PcaError::InvalidInput`] for an empty or non-finite matrix, or an empty selection.
    /// - [`PcaError::IndexOutOfRange`] when the selection exceeds `min(d, m)` components.
    /// - [`PcaError::DecompositionFailure`] when the SVD backend fails.
    pub fn analyze(&self, x: ArrayView2<f64>) -> Result<PcaOutcome> {
        validate_observations(&x)?;

        let feature_means = if self.center {
            Some(x.feature_means()?)
        } else {
            None
        };
        let centered;
        let working = match &feature_means {
            Some(means) => {
                centered = x.centered(means)?;
                centered.view()
            }
            None => x.view(),
        };

        let svd = Svd::compute_with(working, &self.backend)?;

        let shape = ShapeReport::from_svd(&svd, self.rank_tolerance);
        if shape.is_full_rank() {
            debug!("{}", shape);
        } else {
            warn!("observations are rank-deficient: {}", shape);
        }

        let indices = self.selection.resolve(svd.rank_bound())?;
        let basis = select_components(svd.u(), &self.selection)?;
        let coordinates = project(basis.view(), working)?;
        info!(
            "projected {} samples onto components {:?}",
            coordinates.ncols(),
            indices
        );

        Ok(PcaOutcome {
            shape,
            svd,
            feature_means,
            indices,
            basis,
            coordinates,
        })
    }

    /// Analyzes the observations of a dataset and pairs the coordinates with its labels.
    pub fn analyze_dataset(&self, dataset: &Dataset) -> Result<(PcaOutcome, LabelledProjection)> {
        let outcome = self.analyze(dataset.observations())?;
        let labelled = outcome.labelled(dataset.labels())?;
        Ok((outcome, labelled))
    }
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct PcaOutcome {
    shape: ShapeReport,
    svd: Svd,
    feature_means: Option<Array1<f64>>,
    indices: Vec<usize>,
    basis: Array2<f64>,
    coordinates: Array2<f64>,
}

impl PcaOutcome {
    pub fn shape(&self) -> &ShapeReport {
        &self.shape
    }

    pub fn svd(&self) -> &Svd {
        &self.svd
    }

    /// Means subtracted before the decomposition, when centering was requested.
    pub fn feature_means(&self) -> Option<&Array1<f64>> {
        self.feature_means.as_ref()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Selected singular vectors, `d x k`.
    pub fn basis(&self) -> ArrayView2<'_, f64> {
        self.basis.view()
    }

    /// Projected samples, `k x m`.
    pub fn coordinates(&self) -> ArrayView2<'_, f64> {
        self.coordinates.view()
    }

    /// Share of the total squared singular values carried by each component.
    ///
    /// This is a share of variance only when the run was centered. Without centering
    /// the squared singular values measure the second moment about the origin.
    pub fn explained_variance_ratio(&self) -> Array1<f64> {
        let energy = self.svd.s().mapv(|v| v * v);
        let total = energy.sum();
        if total > 0.0 {
            energy / total
        } else {
            Array1::zeros(energy.len())
        }
    }

    pub fn cumulative_explained_variance_ratio(&self) -> Array1<f64> {
        let mut running = 0.0;
        self.explained_variance_ratio().mapv(|ratio| {
            running += ratio;
            running
        })
    }

    /// Combined ratio of the selected components.
    pub fn selected_variance_ratio(&self) -> f64 {
        let ratios = self.explained_variance_ratio();
        self.indices.iter().map(|&i| ratios[i]).sum()
    }

    /// Projects new samples with the fitted basis, applying the same centering.
    pub fn project(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        validate_observations(&x)?;
        match &self.feature_means {
            Some(means) => project(self.basis.view(), x.centered(means)?.view()),
            None => project(self.basis.view(), x),
        }
    }

    pub fn labelled(&self, labels: &[i64]) -> Result<LabelledProjection> {
        LabelledProjection::new(self.coordinates.clone(), labels.to_vec())
    }
}

/// Projected coordinates with the original label of every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledProjection {
    coordinates: Array2<f64>,
    labels: Vec<i64>,
}

impl LabelledProjection {
    pub fn new(coordinates: Array2<f64>, labels: Vec<i64>) -> Result<Self> {
        if coordinates.ncols() != labels.len() {
            return Err(PcaError::invalid(format!(
                "got {} labels for {} projected samples",
                labels.len(),
                coordinates.ncols()
            )));
        }
        Ok(LabelledProjection {
            coordinates,
            labels,
        })
    }

    pub fn coordinates(&self) -> ArrayView2<'_, f64> {
        self.coordinates.view()
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn n_components(&self) -> usize {
        self.coordinates.nrows()
    }

    pub fn separation(&self) -> Result<ClusterSeparation> {
        cluster_separation(self.coordinates.view(), &self.labels)
    }
}
