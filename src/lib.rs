//! Principal component analysis through the thin singular value decomposition.
//!
//! Observations are laid out as a `d x m` matrix, one feature per row and one sample
//! per column. [`PcaBuilder`] wires the stages together: validate, decompose, select
//! singular vectors, project.

pub mod dataset;
pub mod dense;
pub mod error;
pub mod metrics;
pub mod pca;
pub mod present;
pub mod projection;
pub mod rank;
pub mod selection;
pub mod svd;
mod utils;

pub use error::{PcaError, Result};
pub use pca::{LabelledProjection, Pca, PcaBuilder, PcaOutcome};
pub use rank::ShapeReport;
pub use selection::{select_components, ComponentSelection};
pub use svd::{GolubKahanSvd, OneSidedJacobi, Svd, SvdBackend, SvdMethod};
pub use utils::{frobenius_norm, orthonormality_defect, subspace_distance};
