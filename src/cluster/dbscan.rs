//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN groups points based on neighborhood density. Unlike k-means, it:
//!
//! - Discovers clusters of arbitrary shape
//! - Automatically determines the number of clusters
//! - Identifies noise points (outliers)
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: Maximum distance between two points to be neighbors.
//! - **MinPts**: Minimum neighborhood size for a point to be "core". The point
//!   itself counts toward its own neighborhood.
//! - **Core point**: Has at least MinPts points within ε.
//! - **Border point**: Within ε of a core point but not core itself.
//! - **Noise point**: Neither core nor border.
//!
//! ## Algorithm Steps
//!
//! 1. Compute every ε-neighborhood. Queries are independent, so they run in
//!    parallel on the rayon pool.
//! 2. For each unlabeled core point P, in input order:
//!    - Start a new cluster at P.
//!    - Breadth-first: every neighbor of a core point in the frontier joins the
//!      cluster; core neighbors are added to the frontier.
//! 3. Whatever is still unlabeled is noise.
//!
//! Step 2 is serial and is the only writer of the label vector.
//!
//! A border point within ε of cores from two different clusters keeps the
//! first cluster that reaches it. Core membership never depends on order, so
//! the partition of core points is fixed; only such shared border points can
//! move when the input is reordered.
//!
//! ## Complexity
//!
//! - **Time**: O(n²) distance evaluations for the neighborhoods.
//! - **Space**: O(n + Σ|N(p)|) for the stored neighborhoods.
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use std::collections::VecDeque;

use rayon::prelude::*;
use tracing::{debug, instrument};

use super::assignment::ClusterAssignment;
use super::traits::Clustering;
use super::util::{self, squared_euclidean};
use crate::error::{Error, Result};
use crate::generate::Dataset;

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Dbscan {
    /// Epsilon: maximum distance for neighborhood.
    epsilon: f64,
    /// Minimum points (self included) for core point classification.
    min_pts: usize,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum distance between two points to be neighbors.
    /// * `min_pts` - Minimum number of points, the point itself included, to form a dense region.
    ///
    /// # Typical Values
    ///
    /// - `epsilon`: Often determined by k-distance plot (k = min_pts - 1).
    /// - `min_pts`: 2 * dimension is a common heuristic.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self { epsilon, min_pts }
    }

    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Neighborhood radius.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Minimum neighborhood size for a core point.
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// All points within epsilon of `point_idx`, itself included, ascending.
    fn region_query<P: AsRef<[f64]>>(&self, data: &[P], point_idx: usize) -> Vec<usize> {
        let eps2 = self.epsilon * self.epsilon;
        let point = data[point_idx].as_ref();
        data.iter()
            .enumerate()
            .filter(|(_, other)| squared_euclidean(point, other.as_ref()) <= eps2)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Expand one cluster breadth-first from the core point `seed`.
    fn expand_cluster(
        &self,
        seed: usize,
        neighborhoods: &[Vec<usize>],
        is_core: &[bool],
        labels: &mut [Option<usize>],
        cluster_id: usize,
    ) {
        labels[seed] = Some(cluster_id);
        let mut frontier = VecDeque::from([seed]);

        while let Some(p) = frontier.pop_front() {
            for &q in &neighborhoods[p] {
                if labels[q].is_some() {
                    // Either already in this cluster, or a border point claimed first elsewhere.
                    continue;
                }
                labels[q] = Some(cluster_id);
                if is_core[q] {
                    frontier.push_back(q);
                }
            }
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

impl Clustering for Dbscan {
    fn name(&self) -> &'static str {
        "dbscan"
    }

    #[instrument(skip(self, data), fields(n = data.len(), eps = self.epsilon, min_pts = self.min_pts))]
    fn fit<P: AsRef<[f64]> + Sync>(&self, data: &[P]) -> Result<ClusterAssignment> {
        self.validate()?;
        util::common_dim(data)?;

        let n = data.len();
        if n == 0 {
            return Ok(ClusterAssignment::from_parts(Vec::new(), Vec::new(), 0));
        }

        let neighborhoods: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| self.region_query(data, i))
            .collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|nb| nb.len() >= self.min_pts)
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut cluster_id = 0usize;
        for point_idx in 0..n {
            if labels[point_idx].is_some() || !is_core[point_idx] {
                continue;
            }
            self.expand_cluster(point_idx, &neighborhoods, &is_core, &mut labels, cluster_id);
            cluster_id += 1;
        }

        let assignment = ClusterAssignment::from_parts(labels, is_core, cluster_id);
        debug!(
            n_clusters = assignment.n_clusters(),
            n_noise = assignment.n_noise(),
            n_core = assignment.core_sample_indices().len(),
            "dbscan finished"
        );
        Ok(assignment)
    }
}

/// Run DBSCAN over a dataset's points.
pub fn cluster(dataset: &Dataset, eps: f64, min_pts: usize) -> Result<ClusterAssignment> {
    Dbscan::new(eps, min_pts).fit(dataset.points())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            // Cluster 1: around (0, 0)
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![0.1, 0.1],
            vec![0.05, 0.05],
            // Cluster 2: around (5, 5)
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
            vec![5.1, 5.1],
            vec![5.05, 5.05],
        ]
    }

    #[test]
    fn two_clusters() {
        let a = Dbscan::new(0.3, 3).fit(&two_blobs()).unwrap();

        assert_eq!(a.len(), 10);
        assert_eq!(a.n_clusters(), 2);
        assert_eq!(a.n_noise(), 0);
        assert_eq!(
            a.clusters(),
            vec![(0..5).collect::<Vec<_>>(), (5..10).collect::<Vec<_>>()]
        );
    }

    #[test]
    fn outlier_is_noise() {
        let mut data = two_blobs();
        data.insert(4, vec![100.0, 100.0]);

        let a = Dbscan::new(0.3, 3).fit(&data).unwrap();

        assert_eq!(a.label(4), None);
        assert_eq!(a.n_noise(), 1);
        for i in (0..data.len()).filter(|&i| i != 4) {
            assert!(a.label(i).is_some());
        }
    }

    #[test]
    fn all_noise() {
        let data = vec![
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![0.0, 10.0],
            vec![10.0, 10.0],
        ];

        let a = Dbscan::new(0.5, 3).fit(&data).unwrap();

        assert_eq!(a.n_clusters(), 0);
        assert_eq!(a.n_noise(), 4);
        assert!(a.core_sample_indices().is_empty());
    }

    #[test]
    fn min_pts_counts_the_point_itself() {
        // Two points exactly eps apart: each neighborhood is {self, other}.
        let data = vec![vec![0.0], vec![1.0]];
        assert_eq!(Dbscan::new(1.0, 2).fit(&data).unwrap().n_clusters(), 1);
        assert_eq!(Dbscan::new(1.0, 3).fit(&data).unwrap().n_clusters(), 0);
    }

    #[test]
    fn min_pts_one_makes_every_point_core() {
        let data = vec![vec![0.0], vec![10.0], vec![20.0]];
        let a = Dbscan::new(1.0, 1).fit(&data).unwrap();
        assert_eq!(a.n_clusters(), 3);
        assert_eq!(a.n_noise(), 0);
    }

    #[test]
    fn border_point_joins_but_does_not_extend() {
        // 0..=2 are dense, 3 is a border point of that group, 4 is isolated.
        let data = vec![vec![0.0], vec![0.1], vec![0.2], vec![0.9], vec![1.7]];
        let a = Dbscan::new(0.75, 3).fit(&data).unwrap();

        assert_eq!(a.core_sample_indices(), vec![0, 1, 2]);
        assert_eq!(a.clusters(), vec![vec![0, 1, 2, 3]]);
        assert_eq!(a.noise_indices(), vec![4]);
    }

    #[test]
    fn shared_border_point_goes_to_first_cluster() {
        // Two dense groups whose only link is the non-core point at 1.0.
        let data = vec![
            vec![0.0],
            vec![0.05],
            vec![0.1],
            vec![0.15],
            vec![1.0],
            vec![1.85],
            vec![1.9],
            vec![1.95],
            vec![2.0],
        ];
        let a = Dbscan::new(0.88, 4).fit(&data).unwrap();

        assert_eq!(a.n_clusters(), 2);
        assert!(!a.core_mask()[4]);
        assert_eq!(a.label(4), a.label(0));
        assert_ne!(a.label(4), a.label(8));
    }

    #[test]
    fn chain_is_connected() {
        let data: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64 * 0.3, 0.0]).collect();

        let a = Dbscan::new(0.5, 2).fit(&data).unwrap();

        assert_eq!(a.n_clusters(), 1);
        assert_eq!(a.n_noise(), 0);
    }

    #[test]
    fn empty_input_gives_empty_assignment() {
        let data: Vec<Vec<f64>> = vec![];
        let a = Dbscan::new(0.5, 3).fit(&data).unwrap();
        assert!(a.is_empty());
        assert_eq!(a.n_clusters(), 0);
        assert_eq!(a.n_noise(), 0);
    }

    #[test]
    fn invalid_params() {
        let data = vec![vec![0.0, 0.0]];

        assert!(Dbscan::new(0.0, 3).fit(&data).is_err());
        assert!(Dbscan::new(-1.0, 3).fit(&data).is_err());
        assert!(Dbscan::new(f64::NAN, 3).fit(&data).is_err());
        assert!(matches!(
            Dbscan::new(0.5, 0).fit(&data),
            Err(Error::InvalidParameter { name: "min_pts", .. })
        ));
    }

    #[test]
    fn ragged_input_is_a_shape_mismatch() {
        let data = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(
            Dbscan::default().fit(&data),
            Err(Error::InputShapeMismatch { .. })
        ));
    }

    #[test]
    fn partition_survives_reordering() {
        let data = two_blobs();
        let reversed: Vec<Vec<f64>> = data.iter().rev().cloned().collect();

        let a = Dbscan::new(0.3, 3).fit(&data).unwrap();
        let b = Dbscan::new(0.3, 3).fit(&reversed).unwrap();

        // Map b's clusters back to original indices.
        let n = data.len();
        let mut back: Vec<Vec<usize>> = b
            .clusters()
            .into_iter()
            .map(|c| {
                let mut m: Vec<usize> = c.into_iter().map(|i| n - 1 - i).collect();
                m.sort_unstable();
                m
            })
            .collect();
        back.sort();
        assert_eq!(a.clusters(), back);
    }

    #[test]
    fn builder_overrides() {
        let d = Dbscan::default().with_epsilon(0.2).with_min_pts(7);
        assert_eq!(d.epsilon(), 0.2);
        assert_eq!(d.min_pts(), 7);
    }
}
