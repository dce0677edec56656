use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use single_pca::dataset::synthetic::{iris_like, wine_like};
use single_pca::dataset::{load_csv, CsvOptions, Dataset, LabelColumn, LabelEncoder};
use single_pca::present::{format_matrix, render_scatter, ScatterOptions};
use single_pca::{ComponentSelection, PcaBuilder, SvdMethod};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "single-pca")]
#[command(about = "Project labelled observations onto selected singular vectors")]
#[command(version)]
struct Cli {
    /// CSV file, one sample per row, features plus one label column
    #[arg(required_unless_present = "synthetic", conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Use a generated dataset instead of a file
    #[arg(long, value_enum)]
    synthetic: Option<Preset>,

    /// Seed for the synthetic generator
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Field delimiter of the CSV file
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// The CSV file has no header row
    #[arg(long)]
    no_headers: bool,

    /// Label column, by zero-based index or header name (default: last column)
    #[arg(long)]
    label_column: Option<String>,

    /// Category to code mapping for textual labels, e.g. setosa=1,versicolor=2
    #[arg(long)]
    label_map: Option<LabelEncoder>,

    /// Indices of the singular vectors to project onto
    #[arg(short, long, value_delimiter = ',', default_value = "0,1", allow_negative_numbers = true)]
    components: Vec<i64>,

    /// Subtract feature means before decomposing
    #[arg(long)]
    center: bool,

    /// SVD routine
    #[arg(short, long, value_enum, default_value = "golub-kahan")]
    backend: Backend,

    /// Write an SVG scatter of the first two projected components
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Print the basis and projected coordinates
    #[arg(long)]
    print: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Iris,
    Wine,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    GolubKahan,
    Jacobi,
}

impl From<Backend> for SvdMethod {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::GolubKahan => SvdMethod::GolubKahan,
            Backend::Jacobi => SvdMethod::Jacobi,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = load_dataset(&cli)?;
    info!(
        "running on {} features x {} samples",
        dataset.n_features(),
        dataset.n_samples()
    );

    let pca = PcaBuilder::new(SvdMethod::from(cli.backend))
        .components(ComponentSelection::new(cli.components.iter().copied()))
        .center(cli.center)
        .build();
    let (outcome, labelled) = pca.analyze_dataset(&dataset)?;

    println!("{}", outcome.shape());
    println!("singular values: {:.4}", outcome.svd().s());
    let measure = if outcome.feature_means().is_some() {
        "variance"
    } else {
        "second moment (uncentered)"
    };
    println!(
        "explained {} ratio: {:.4}",
        measure,
        outcome.explained_variance_ratio()
    );
    println!(
        "components {:?} explain {:.2}% of the total {}",
        outcome.indices(),
        100.0 * outcome.selected_variance_ratio(),
        measure
    );

    let separation = labelled.separation()?;
    println!(
        "{} label groups: between {:.4}, within {:.4}, ratio {:.4}",
        separation.n_clusters,
        separation.between,
        separation.within,
        separation.ratio()
    );

    if cli.print {
        println!("basis (features x components):");
        println!("{}", format_matrix(outcome.basis(), 4));
        println!("projected coordinates (components x samples):");
        println!("{}", format_matrix(outcome.coordinates(), 4));
    }

    if let Some(path) = &cli.plot {
        let options = ScatterOptions {
            x_label: format!("component {}", outcome.indices()[0]),
            y_label: outcome
                .indices()
                .get(1)
                .map(|i| format!("component {}", i))
                .unwrap_or_default(),
            ..ScatterOptions::default()
        };
        render_scatter(path, &labelled, &options)?;
        println!("scatter plot written to {}", path.display());
    }

    Ok(())
}

fn load_dataset(cli: &Cli) -> Result<Dataset> {
    if let Some(preset) = cli.synthetic {
        let dataset = match preset {
            Preset::Iris => iris_like(cli.seed),
            Preset::Wine => wine_like(cli.seed),
        };
        return dataset.context("failed to generate synthetic dataset");
    }

    let Some(path) = &cli.input else {
        bail!("either an input file or --synthetic is required");
    };
    if !cli.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", cli.delimiter);
    }

    let label_column = match &cli.label_column {
        None => LabelColumn::Last,
        Some(raw) => match raw.parse::<usize>() {
            Ok(index) => LabelColumn::Index(index),
            Err(_) => LabelColumn::Name(raw.clone()),
        },
    };
    let options = CsvOptions {
        delimiter: cli.delimiter as u8,
        has_headers: !cli.no_headers,
        label_column,
    };

    load_csv(path, &options, cli.label_map.as_ref())
}
