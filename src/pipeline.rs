//! End-to-end benchmark runs: generate, cluster, evaluate.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, instrument, warn};

use crate::cluster::{ClusterAssignment, Clustering, Dbscan};
use crate::error::{Error, Result};
use crate::generate::{generate_with, BlobParams, Dataset};
use crate::metrics::{EvaluationReport, Evaluator};

/// Parameters for one benchmark run.
///
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Dimensionality of the generated points.
    pub dim: usize,
    /// Number of hypercube centers.
    pub nclusters: usize,
    /// Standard deviation around each center.
    pub sigma: f64,
    /// Number of generated points.
    pub npoints: usize,
    /// Seed for center and point generation.
    pub seed: u64,
    /// DBSCAN neighborhood radius.
    pub eps: f64,
    /// DBSCAN minimum neighborhood size, self included.
    pub min_pts: usize,
    /// Clusterings with fewer non-noise clusters are not scored.
    pub min_clusters: usize,
    /// Compute the silhouette coefficient.
    pub silhouette: bool,
    /// Shuffle generated points.
    pub shuffle: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            nclusters: 4,
            sigma: 0.3,
            npoints: 1000,
            seed: 0,
            eps: 0.3,
            min_pts: 10,
            min_clusters: 2,
            silhouette: true,
            shuffle: true,
        }
    }
}

impl BenchConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::infeasible(format!("invalid config: {e}")))
    }

    /// Blob generation parameters.
    pub fn blob_params(&self) -> BlobParams {
        BlobParams::new(self.npoints, self.sigma).with_shuffle(self.shuffle)
    }

    /// The configured clusterer.
    pub fn dbscan(&self) -> Dbscan {
        Dbscan::new(self.eps, self.min_pts)
    }

    /// The configured evaluator.
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new()
            .with_silhouette(self.silhouette)
            .with_min_clusters(self.min_clusters)
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct BenchRun {
    /// The generated dataset.
    pub dataset: Dataset,
    /// The clustering of `dataset`.
    pub assignment: ClusterAssignment,
    /// Scores for `assignment`.
    pub report: EvaluationReport,
    /// Wall time spent in clustering.
    pub cluster_time: Duration,
}

/// Cluster and score an existing dataset.
///
/// A clustering with too few clusters still yields a report, with counts and
/// the skipped metrics.
pub fn cluster_and_evaluate<C: Clustering>(
    dataset: &Dataset,
    clusterer: &C,
    evaluator: &Evaluator,
) -> Result<(ClusterAssignment, EvaluationReport, Duration)> {
    let start = Instant::now();
    let assignment = info_span!("cluster", algorithm = clusterer.name())
        .in_scope(|| clusterer.fit(dataset.points()))?;
    let elapsed = start.elapsed();
    info!(
        algorithm = clusterer.name(),
        n_clusters = assignment.n_clusters(),
        n_noise = assignment.n_noise(),
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "clustering finished"
    );

    let report = evaluator.evaluate(dataset, &assignment)?;
    if !report.is_complete() {
        warn!(omitted = report.omitted().len(), "report is partial");
    }
    Ok((assignment, report, elapsed))
}

/// Generate a dataset from `config`, run DBSCAN on it, and score the result.
///
/// # Errors
///
/// Configuration errors (`InfeasibleConfiguration`, `InvalidParameter`) abort.
/// A degenerate clustering does not; see [`cluster_and_evaluate`].
#[instrument(skip_all, fields(dim = config.dim, nclusters = config.nclusters, npoints = config.npoints))]
pub fn run(config: &BenchConfig) -> Result<BenchRun> {
    let dataset = generate_with(config.dim, config.nclusters, &config.blob_params(), config.seed)?;
    let (assignment, report, cluster_time) =
        cluster_and_evaluate(&dataset, &config.dbscan(), &config.evaluator())?;
    Ok(BenchRun {
        dataset,
        assignment,
        report,
        cluster_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = BenchConfig::from_json(r#"{ "dim": 3, "sigma": 0.1 }"#).unwrap();
        assert_eq!(cfg.dim, 3);
        assert_eq!(cfg.sigma, 0.1);
        assert_eq!(cfg.npoints, 1000);
        assert_eq!(cfg.min_pts, 10);
        assert_eq!(cfg.eps, 0.3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = BenchConfig::from_json(r#"{ "dimension": 3 }"#).unwrap_err();
        assert!(matches!(err, Error::InfeasibleConfiguration { .. }));
    }

    #[test]
    fn config_json_round_trip() {
        let cfg = BenchConfig {
            nclusters: 3,
            seed: 17,
            ..BenchConfig::default()
        };
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(BenchConfig::from_json(&text).unwrap(), cfg);
    }

    #[test]
    fn well_separated_run_is_fully_scored() {
        let cfg = BenchConfig {
            dim: 3,
            nclusters: 3,
            sigma: 0.1,
            npoints: 150,
            eps: 0.4,
            min_pts: 5,
            ..BenchConfig::default()
        };
        let run = run(&cfg).unwrap();
        assert_eq!(run.dataset.len(), 150);
        assert_eq!(run.assignment.len(), 150);
        assert_eq!(run.report.n_clusters(), 3);
        assert!(run.report.is_complete());
        assert!(run.report.get(Metric::AdjustedRandIndex).unwrap() > 0.95);
        assert!(run.report.get(Metric::Silhouette).unwrap() > 0.5);
    }

    #[test]
    fn degenerate_run_reports_counts_without_scores() {
        // A radius this small leaves every point as noise.
        let cfg = BenchConfig {
            npoints: 100,
            eps: 1e-6,
            ..BenchConfig::default()
        };
        let run = run(&cfg).unwrap();
        assert_eq!(run.report.n_clusters(), 0);
        assert_eq!(run.report.n_noise(), 100);
        assert!(run.report.scores().is_empty());
        assert!(!run.report.is_complete());
    }

    #[test]
    fn infeasible_config_aborts() {
        let cfg = BenchConfig {
            dim: 2,
            nclusters: 5,
            ..BenchConfig::default()
        };
        assert!(matches!(run(&cfg), Err(Error::InfeasibleConfiguration { .. })));
    }

    #[test]
    fn invalid_eps_aborts() {
        let cfg = BenchConfig {
            npoints: 20,
            eps: 0.0,
            ..BenchConfig::default()
        };
        assert!(matches!(run(&cfg), Err(Error::InvalidParameter { name: "epsilon", .. })));
    }
}
