//! Scatter plots and text rendering of projection results.

use crate::pca::LabelledProjection;
use anyhow::{bail, Context};
use log::info;
use ndarray::ArrayView2;
use nshare::IntoNalgebra;
use plotters::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        ScatterOptions {
            title: "Projection onto selected components".to_string(),
            width: 900,
            height: 700,
            x_label: "component 1".to_string(),
            y_label: "component 2".to_string(),
        }
    }
}

/// Writes an SVG scatter of the first two projected coordinates, one color per label.
pub fn render_scatter<P: AsRef<Path>>(
    path: P,
    projection: &LabelledProjection,
    options: &ScatterOptions,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let coords = projection.coordinates();
    if coords.nrows() < 2 {
        bail!(
            "a scatter plot needs two projected components, got {}",
            coords.nrows()
        );
    }

    let (x_range, y_range) = (padded_range(coords, 0), padded_range(coords, 1));
    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .draw()?;

    let classes: BTreeSet<i64> = projection.labels().iter().copied().collect();
    for (idx, class) in classes.into_iter().enumerate() {
        let style = Palette99::pick(idx).filled();
        let points = coords
            .columns()
            .into_iter()
            .zip(projection.labels())
            .filter(|(_, label)| **label == class)
            .map(|(point, _)| (point[0], point[1]))
            .collect::<Vec<_>>();

        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 4, style)))?
            .label(format!("label {}", class))
            .legend(move |(x, y)| Circle::new((x + 8, y), 4, style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("scatter plot written to {}", path.display());
    Ok(())
}

fn padded_range(coords: ArrayView2<f64>, row: usize) -> std::ops::Range<f64> {
    let values = coords.row(row);
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = if hi > lo { 0.05 * (hi - lo) } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Pretty-prints a matrix with a fixed number of decimals.
pub fn format_matrix(a: ArrayView2<f64>, precision: usize) -> String {
    let matrix = a.into_nalgebra();
    format!("{:.*}", precision, matrix)
}
