//! Density-clustering benchmarks on synthetic data.
//!
//! `densebench` generates Gaussian blobs around distinct hypercube vertices,
//! clusters them with DBSCAN, and scores the result against the known labels.
//!
//! - [`generate`]: centers and blob datasets, reproducible from a seed
//! - [`cluster`]: DBSCAN and the [`ClusterAssignment`] it produces
//! - [`metrics`]: homogeneity, completeness, V-measure, ARI, AMI, silhouette
//! - [`record`]: CSV interchange for datasets and clusterings
//! - [`pipeline`]: one configured run end to end
//!
//! ```
//! use densebench::{run, BenchConfig};
//!
//! let config = BenchConfig {
//!     npoints: 200,
//!     sigma: 0.1,
//!     eps: 0.4,
//!     min_pts: 5,
//!     ..BenchConfig::default()
//! };
//! let result = run(&config).unwrap();
//! println!("{}", result.report);
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod pipeline;
pub mod record;

pub use cluster::{ClusterAssignment, Clustering, Dbscan, NOISE};
pub use error::{Error, Result};
pub use generate::{generate, Centers, Dataset, Point};
pub use metrics::{evaluate, EvaluationReport, Evaluator, Metric};
pub use pipeline::{run, BenchConfig, BenchRun};
