use std::collections::HashMap;

use crate::error::{Error, Result};

/// Interchange value for noise points.
pub const NOISE: i64 = -1;

/// Inferred labels for one clustering run, in point order.
///
/// `None` marks noise. Cluster ids are dense in `0..n_clusters()`, but only the
/// partition they induce is meaningful; see [`ClusterAssignment::clusters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<Option<usize>>,
    core: Vec<bool>,
    n_clusters: usize,
}

impl ClusterAssignment {
    /// Build from labels and a core-point mask of the same length.
    ///
    /// Cluster ids need not be dense; `n_clusters` counts the distinct ones.
    pub fn new(labels: Vec<Option<usize>>, core: Vec<bool>) -> Result<Self> {
        if labels.len() != core.len() {
            return Err(Error::InputShapeMismatch {
                what: "core mask length",
                expected: labels.len(),
                found: core.len(),
            });
        }
        let mut ids: Vec<usize> = labels.iter().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(Self {
            n_clusters: ids.len(),
            labels,
            core,
        })
    }

    pub(crate) fn from_parts(labels: Vec<Option<usize>>, core: Vec<bool>, n_clusters: usize) -> Self {
        debug_assert_eq!(labels.len(), core.len());
        Self {
            labels,
            core,
            n_clusters,
        }
    }

    /// Build from interchange labels, where any negative value is noise.
    ///
    /// Core points are not recorded in the interchange table, so the mask is all `false`.
    pub fn from_label_ids(ids: &[i64]) -> Result<Self> {
        let labels = ids
            .iter()
            .map(|&l| usize::try_from(l).ok())
            .collect::<Vec<_>>();
        Self::new(labels, vec![false; ids.len()])
    }

    /// Number of labeled points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in point order, `None` for noise.
    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    /// Label of the point at `index`, `None` for noise.
    ///
    /// For generated datasets the index equals the point id.
    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied().flatten()
    }

    /// Labels with noise mapped to [`NOISE`].
    pub fn label_ids(&self) -> Vec<i64> {
        self.labels
            .iter()
            .map(|l| l.map_or(NOISE, |c| c as i64))
            .collect()
    }

    /// Whether each point is a core point.
    pub fn core_mask(&self) -> &[bool] {
        &self.core
    }

    /// Indices of core points, ascending.
    pub fn core_sample_indices(&self) -> Vec<usize> {
        self.core
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| c.then_some(i))
            .collect()
    }

    /// Number of distinct non-noise clusters.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Number of noise points.
    pub fn n_noise(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }

    /// The partition as sorted member lists, ordered by smallest member.
    ///
    /// Two assignments that differ only in cluster numbering have equal `clusters()`.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut slot: HashMap<usize, usize> = HashMap::with_capacity(self.n_clusters);
        let mut out: Vec<Vec<usize>> = Vec::with_capacity(self.n_clusters);
        for (i, label) in self.labels.iter().enumerate() {
            let Some(c) = *label else { continue };
            let k = *slot.entry(c).or_insert_with(|| {
                out.push(Vec::new());
                out.len() - 1
            });
            out[k].push(i);
        }
        out
    }

    /// Indices of noise points, ascending.
    pub fn noise_indices(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.is_none().then_some(i))
            .collect()
    }

    /// Fail with `DegenerateClustering` when fewer than `min` clusters were found.
    pub fn require_clusters(&self, min: usize) -> Result<()> {
        if self.n_clusters < min {
            return Err(Error::DegenerateClustering {
                found: self.n_clusters,
                required: min,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_ids() {
        let a = ClusterAssignment::new(
            vec![Some(1), None, Some(1), Some(4), None],
            vec![true, false, false, true, false],
        )
        .unwrap();
        assert_eq!(a.n_clusters(), 2);
        assert_eq!(a.n_noise(), 2);
        assert_eq!(a.label_ids(), vec![1, -1, 1, 4, -1]);
        assert_eq!(a.core_sample_indices(), vec![0, 3]);
        assert_eq!(a.noise_indices(), vec![1, 4]);
        assert_eq!(a.label(3), Some(4));
        assert_eq!(a.label(1), None);
        assert_eq!(a.label(99), None);
    }

    #[test]
    fn clusters_ignore_numbering() {
        let a = ClusterAssignment::from_label_ids(&[0, 0, 1, -1, 1]).unwrap();
        let b = ClusterAssignment::from_label_ids(&[7, 7, 3, -1, 3]).unwrap();
        assert_eq!(a.clusters(), vec![vec![0, 1], vec![2, 4]]);
        assert_eq!(a.clusters(), b.clusters());
    }

    #[test]
    fn negative_ids_are_noise() {
        let a = ClusterAssignment::from_label_ids(&[-1, -5, 0]).unwrap();
        assert_eq!(a.n_noise(), 2);
        assert_eq!(a.n_clusters(), 1);
    }

    #[test]
    fn require_clusters_reports_degeneracy() {
        let a = ClusterAssignment::from_label_ids(&[0, 0, -1]).unwrap();
        assert!(a.require_clusters(1).is_ok());
        assert_eq!(
            a.require_clusters(2).unwrap_err(),
            Error::DegenerateClustering {
                found: 1,
                required: 2
            }
        );
    }

    #[test]
    fn mismatched_core_mask_is_rejected() {
        let err = ClusterAssignment::new(vec![Some(0)], vec![]).unwrap_err();
        assert!(matches!(err, Error::InputShapeMismatch { .. }));
    }
}
