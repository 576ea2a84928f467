//! Clustering quality metrics.
//!
//! ## Comparison against ground truth
//!
//! - **Homogeneity / completeness / V-measure**: conditional-entropy scores in
//!   `[0, 1]`. Homogeneity is 1 when every cluster holds a single class;
//!   completeness is 1 when every class sits in a single cluster.
//! - **Adjusted Rand index**: pair-counting agreement corrected for chance.
//! - **Adjusted mutual information**: mutual information corrected for chance
//!   and normalized by the mean of the two entropies.
//!
//! These only see the contingency table between the two labelings, so they are
//! invariant to renaming labels. Noise counts as one more inferred label.
//!
//! ## Intrinsic
//!
//! - **Silhouette coefficient**: compactness versus separation from the
//!   feature vectors and inferred labels alone. Needs at least two non-noise
//!   clusters.
//!
//! ## Reports
//!
//! [`Evaluator`] bundles everything into an [`EvaluationReport`]. Metrics that
//! cannot be computed for a degenerate clustering are recorded as omitted
//! instead of failing the whole evaluation.

mod contingency;
mod silhouette;
mod supervised;

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, instrument, warn};

use crate::cluster::ClusterAssignment;
use crate::error::{Error, Result};
use crate::generate::Dataset;

pub use silhouette::{silhouette_samples, silhouette_score};
pub use supervised::{
    adjusted_mutual_info, adjusted_rand_index, completeness, homogeneity,
    homogeneity_completeness_v_measure, v_measure, HcvScore,
};

/// A named score in an [`EvaluationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    /// Homogeneity.
    Homogeneity,
    /// Completeness.
    Completeness,
    /// V-measure.
    VMeasure,
    /// Adjusted Rand index.
    AdjustedRandIndex,
    /// Adjusted mutual information.
    AdjustedMutualInfo,
    /// Silhouette coefficient.
    Silhouette,
}

impl Metric {
    /// The comparison metrics, in report order.
    pub const COMPARISON: [Metric; 5] = [
        Metric::Homogeneity,
        Metric::Completeness,
        Metric::VMeasure,
        Metric::AdjustedRandIndex,
        Metric::AdjustedMutualInfo,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Homogeneity => "Homogeneity",
            Metric::Completeness => "Completeness",
            Metric::VMeasure => "V-measure",
            Metric::AdjustedRandIndex => "Adjusted Rand Index",
            Metric::AdjustedMutualInfo => "Adjusted Mutual Information",
            Metric::Silhouette => "Silhouette Coefficient",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scores and counts for one clustering of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    n_clusters: usize,
    n_noise: usize,
    scores: BTreeMap<Metric, f64>,
    omitted: Vec<(Metric, Error)>,
}

impl EvaluationReport {
    /// Number of non-noise clusters.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Number of noise points.
    pub fn n_noise(&self) -> usize {
        self.n_noise
    }

    /// Score for `metric`, if it was computed.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }

    /// All computed scores.
    pub fn scores(&self) -> &BTreeMap<Metric, f64> {
        &self.scores
    }

    /// Metrics that were skipped, each with the reason.
    pub fn omitted(&self) -> &[(Metric, Error)] {
        &self.omitted
    }

    /// Whether every requested metric was computed.
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Estimated number of clusters: {}", self.n_clusters)?;
        write!(f, "Estimated number of noise points: {}", self.n_noise)?;
        for (metric, value) in &self.scores {
            write!(f, "\n{metric}: {value:.3}")?;
        }
        for (metric, reason) in &self.omitted {
            write!(f, "\n{metric}: skipped ({reason})")?;
        }
        Ok(())
    }
}

/// Configurable evaluation of a clustering against its dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    silhouette: bool,
    min_clusters: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            silhouette: true,
            min_clusters: 2,
        }
    }
}

impl Evaluator {
    /// Evaluator with silhouette scoring on and a two-cluster minimum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to compute the silhouette coefficient.
    pub fn with_silhouette(mut self, silhouette: bool) -> Self {
        self.silhouette = silhouette;
        self
    }

    /// Minimum number of non-noise clusters before any metric is computed.
    ///
    /// `0` always evaluates the comparison metrics.
    pub fn with_min_clusters(mut self, min_clusters: usize) -> Self {
        self.min_clusters = min_clusters;
        self
    }

    fn requested(&self) -> Vec<Metric> {
        let mut metrics = Metric::COMPARISON.to_vec();
        if self.silhouette {
            metrics.push(Metric::Silhouette);
        }
        metrics
    }

    /// Score `assignment` against `dataset`.
    ///
    /// # Errors
    ///
    /// `InputShapeMismatch` if the assignment does not cover the dataset.
    /// Degenerate clusterings do not fail; the affected metrics are listed in
    /// [`EvaluationReport::omitted`].
    #[instrument(skip_all, fields(n = dataset.len(), n_clusters = assignment.n_clusters()))]
    pub fn evaluate(&self, dataset: &Dataset, assignment: &ClusterAssignment) -> Result<EvaluationReport> {
        if dataset.len() != assignment.len() {
            return Err(Error::InputShapeMismatch {
                what: "assignment length",
                expected: dataset.len(),
                found: assignment.len(),
            });
        }

        let mut report = EvaluationReport {
            n_clusters: assignment.n_clusters(),
            n_noise: assignment.n_noise(),
            scores: BTreeMap::new(),
            omitted: Vec::new(),
        };

        if let Err(err) = assignment.require_clusters(self.min_clusters) {
            warn!(%err, "too few clusters, skipping evaluation");
            report.omitted = self
                .requested()
                .into_iter()
                .map(|m| (m, err.clone()))
                .collect();
            return Ok(report);
        }

        let truth = dataset.true_labels();
        let pred = assignment.labels();

        let hcv = homogeneity_completeness_v_measure(&truth, pred)?;
        report.scores.insert(Metric::Homogeneity, hcv.homogeneity);
        report.scores.insert(Metric::Completeness, hcv.completeness);
        report.scores.insert(Metric::VMeasure, hcv.v_measure);
        report
            .scores
            .insert(Metric::AdjustedRandIndex, adjusted_rand_index(&truth, pred)?);
        report
            .scores
            .insert(Metric::AdjustedMutualInfo, adjusted_mutual_info(&truth, pred)?);

        if self.silhouette {
            match silhouette_score(dataset.points(), pred) {
                Ok(s) => {
                    report.scores.insert(Metric::Silhouette, s);
                }
                Err(err @ Error::DegenerateClustering { .. }) => {
                    warn!(%err, "silhouette undefined");
                    report.omitted.push((Metric::Silhouette, err));
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            homogeneity = hcv.homogeneity,
            completeness = hcv.completeness,
            ari = ?report.get(Metric::AdjustedRandIndex),
            "evaluation finished"
        );
        Ok(report)
    }
}

/// Evaluate with the default [`Evaluator`].
pub fn evaluate(dataset: &Dataset, assignment: &ClusterAssignment) -> Result<EvaluationReport> {
    Evaluator::default().evaluate(dataset, assignment)
}
