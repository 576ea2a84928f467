//! One benchmark run: generate blobs, cluster with DBSCAN, print the scores.
//!
//! ```text
//! cargo run --example benchmark -- --config run.json --output clustered.csv
//! RUST_LOG=densebench=debug cargo run --example benchmark -- --dim 3 --nclusters 6
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use densebench::record::write_clustered;
use densebench::{run, BenchConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(about = "Density-clustering benchmark on synthetic blobs")]
struct Opts {
    /// JSON file with a `BenchConfig`; missing fields take defaults
    #[clap(long)]
    config: Option<PathBuf>,

    /// Override the dimensionality
    #[clap(long)]
    dim: Option<usize>,

    /// Override the number of clusters
    #[clap(long)]
    nclusters: Option<usize>,

    /// Override the seed
    #[clap(long)]
    seed: Option<u64>,

    /// Write the clustered table here; `-` for stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BenchConfig::from_json(&text)?
        }
        None => BenchConfig::default(),
    };
    if let Some(dim) = opts.dim {
        config.dim = dim;
    }
    if let Some(nclusters) = opts.nclusters {
        config.nclusters = nclusters;
    }
    if let Some(seed) = opts.seed {
        config.seed = seed;
    }

    let result = run(&config)?;

    if let Some(centers) = result.dataset.centers() {
        for pair in centers.pairwise_squared_distances() {
            println!("d2(center {}, center {}) = {}", pair.i, pair.j, pair.squared_distance);
        }
    }
    println!("{}", result.report);
    println!(
        "Clustering time: {:.3} ms",
        result.cluster_time.as_secs_f64() * 1e3
    );

    match opts.output {
        Some(path) if path.as_os_str() == "-" => {
            write_clustered(io::stdout().lock(), &result.dataset, &result.assignment)?;
        }
        Some(path) => {
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            write_clustered(BufWriter::new(file), &result.dataset, &result.assignment)?;
        }
        None => {}
    }
    Ok(())
}
