//! # Matrix ingestion
//!
//! Turns tabular input into the strict contract the decomposition expects: a finite
//! `d x m` observation matrix (features x samples) plus one integer label per sample.
//! Shape and type problems are rejected here, at the boundary, instead of surfacing
//! halfway through the computation.

use crate::dense::validate_observations;
use crate::error::{PcaError, Result};
use anyhow::{anyhow, bail, Context};
use log::info;
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

mod encoder;
pub mod synthetic;

pub use encoder::LabelEncoder;

/// Observations laid out column-per-sample with aligned labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    observations: Array2<f64>,
    labels: Vec<i64>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// # Errors
    /// [`PcaError::InvalidInput`] when the matrix is empty, holds a non-finite entry or
    /// the number of labels differs from the number of columns.
    pub fn new(observations: Array2<f64>, labels: Vec<i64>) -> Result<Self> {
        validate_observations(&observations)?;
        if labels.len() != observations.ncols() {
            return Err(PcaError::invalid(format!(
                "got {} labels for {} samples",
                labels.len(),
                observations.ncols()
            )));
        }

        let feature_names = (0..observations.nrows())
            .map(|i| format!("feature_{}", i))
            .collect();

        Ok(Dataset {
            observations,
            labels,
            feature_names,
        })
    }

    /// Builds a dataset from a samples x features table, the layout of most files.
    pub fn from_samples(samples: ArrayView2<f64>, labels: Vec<i64>) -> Result<Self> {
        Self::new(samples.t().to_owned(), labels)
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.n_features() {
            return Err(PcaError::invalid(format!(
                "got {} feature names for {} features",
                names.len(),
                self.n_features()
            )));
        }
        self.feature_names = names;
        Ok(self)
    }

    pub fn n_features(&self) -> usize {
        self.observations.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.observations.ncols()
    }

    pub fn observations(&self) -> ArrayView2<'_, f64> {
        self.observations.view()
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Sorted label values present in the dataset.
    pub fn distinct_labels(&self) -> Vec<i64> {
        self.labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Which CSV column carries the labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelColumn {
    #[default]
    Last,
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
    pub label_column: LabelColumn,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            has_headers: true,
            label_column: LabelColumn::Last,
        }
    }
}

/// Reads a CSV file with one sample per row.
///
/// Every column except the label column must parse as a float. Labels are integer
/// codes unless an `encoder` is given, in which case every label is looked up in it.
pub fn load_csv<P: AsRef<Path>>(
    path: P,
    options: &CsvOptions,
    encoder: Option<&LabelEncoder>,
) -> anyhow::Result<Dataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_csv(file, options, encoder).with_context(|| format!("failed to load {}", path.display()))
}

/// Same as [`load_csv`] for any reader.
pub fn read_csv<R: io::Read>(
    reader: R,
    options: &CsvOptions,
    encoder: Option<&LabelEncoder>,
) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Option<Vec<String>> = if options.has_headers {
        let record = reader.headers().context("failed to read CSV header")?;
        Some(record.iter().map(str::to_string).collect())
    } else {
        None
    };

    let mut values = Vec::new();
    let mut raw_labels = Vec::new();
    let mut layout: Option<(usize, usize)> = None;

    for (row, record) in reader.records().enumerate() {
        let line = row + 1 + options.has_headers as usize;
        let record = record.with_context(|| format!("failed to read CSV line {}", line))?;

        let (width, label_idx) = match layout {
            Some(layout) => layout,
            None => {
                let width = record.len();
                let idx = resolve_label_column(&options.label_column, headers.as_deref(), width)?;
                layout = Some((width, idx));
                (width, idx)
            }
        };
        if record.len() != width {
            bail!(
                "line {} has {} fields, expected {}",
                line,
                record.len(),
                width
            );
        }

        for (col, field) in record.iter().enumerate() {
            if col == label_idx {
                raw_labels.push(field.to_string());
                continue;
            }
            let value: f64 = field.parse().map_err(|_| {
                anyhow!("line {}, column {}: '{}' is not a number", line, col, field)
            })?;
            values.push(value);
        }
    }

    let (width, label_idx) = layout.ok_or_else(|| anyhow!("CSV contains no records"))?;
    let n_samples = raw_labels.len();
    let n_features = width - 1;

    let labels = match encoder {
        Some(encoder) => encoder.encode_column(raw_labels.as_slice())?,
        None => raw_labels
            .iter()
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    anyhow!(
                        "label '{}' is not an integer code and no label encoder was given",
                        raw
                    )
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    let samples = Array2::from_shape_vec((n_samples, n_features), values)?;
    let mut dataset = Dataset::from_samples(samples.view(), labels)?;
    if let Some(headers) = headers {
        let names = headers
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, name)| name)
            .collect();
        dataset = dataset.with_feature_names(names)?;
    }

    info!(
        "loaded {} samples with {} features and {} distinct labels",
        n_samples,
        n_features,
        dataset.distinct_labels().len()
    );
    Ok(dataset)
}

fn resolve_label_column(
    column: &LabelColumn,
    headers: Option<&[String]>,
    width: usize,
) -> anyhow::Result<usize> {
    if width < 2 {
        bail!("need at least one feature column and one label column, got {} columns", width);
    }

    match column {
        LabelColumn::Last => Ok(width - 1),
        LabelColumn::Index(idx) if *idx < width => Ok(*idx),
        LabelColumn::Index(idx) => bail!("label column {} is outside {} columns", idx, width),
        LabelColumn::Name(name) => headers
            .ok_or_else(|| anyhow!("label column '{}' given by name but the CSV has no header", name))?
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("no column named '{}' in the header", name)),
    }
}
