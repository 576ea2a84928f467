//! Isotropic Gaussian blobs around hypercube centers.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, instrument};

use super::centers::{generate_centers, Centers};
use crate::error::{Error, Result};

/// A generated (or loaded) sample with its ground-truth label.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: u64,
    coords: Vec<f64>,
    true_label: usize,
}

impl Point {
    /// Create a point.
    pub fn new(id: u64, coords: Vec<f64>, true_label: usize) -> Self {
        Self {
            id,
            coords,
            true_label,
        }
    }

    /// Stable point id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Coordinates.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Index of the generating center.
    pub fn true_label(&self) -> usize {
        self.true_label
    }
}

impl AsRef<[f64]> for Point {
    fn as_ref(&self) -> &[f64] {
        &self.coords
    }
}

/// An ordered, frozen collection of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    dim: usize,
    points: Vec<Point>,
    centers: Option<Centers>,
}

impl Dataset {
    /// Assemble a dataset, checking that every point has `dim` coordinates,
    /// that ids are unique and, when centers are given, that every label
    /// indexes one of them.
    pub fn new(dim: usize, points: Vec<Point>, centers: Option<Centers>) -> Result<Self> {
        if let Some(c) = &centers {
            if c.dim() != dim {
                return Err(Error::InputShapeMismatch {
                    what: "center dimension",
                    expected: dim,
                    found: c.dim(),
                });
            }
        }
        let mut ids = HashSet::with_capacity(points.len());
        for p in &points {
            if !ids.insert(p.id) {
                return Err(Error::DuplicatePointId { id: p.id });
            }
            if p.coords.len() != dim {
                return Err(Error::InputShapeMismatch {
                    what: "point dimension",
                    expected: dim,
                    found: p.coords.len(),
                });
            }
            if let Some(c) = &centers {
                if p.true_label >= c.len() {
                    return Err(Error::InputShapeMismatch {
                        what: "true label range",
                        expected: c.len(),
                        found: p.true_label,
                    });
                }
            }
        }
        Ok(Self {
            dim,
            points,
            centers,
        })
    }

    /// Dimensionality of every point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the dataset has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in generation order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Originating centers; `None` for datasets loaded from records.
    pub fn centers(&self) -> Option<&Centers> {
        self.centers.as_ref()
    }

    /// Ground-truth labels in point order.
    pub fn true_labels(&self) -> Vec<usize> {
        self.points.iter().map(Point::true_label).collect()
    }
}

/// Parameters for [`generate_blobs`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlobParams {
    /// Total number of points.
    pub npoints: usize,
    /// Standard deviation of every coordinate around its center.
    pub sigma: f64,
    /// Shuffle the center order of points before sampling.
    pub shuffle: bool,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            npoints: 1000,
            sigma: 1.0,
            shuffle: true,
        }
    }
}

impl BlobParams {
    /// Create parameters with shuffling enabled.
    pub fn new(npoints: usize, sigma: f64) -> Self {
        Self {
            npoints,
            sigma,
            ..Self::default()
        }
    }

    /// Enable or disable shuffling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

/// Number of points per center: `npoints / k` each, remainder to the first centers.
pub fn balanced_counts(npoints: usize, nclusters: usize) -> Vec<usize> {
    if nclusters == 0 {
        return Vec::new();
    }
    let base = npoints / nclusters;
    let extra = npoints % nclusters;
    (0..nclusters)
        .map(|i| base + usize::from(i < extra))
        .collect()
}

/// Draw a labeled dataset around `centers`.
///
/// Ids run `0..npoints` in generation order.
///
/// # Errors
///
/// `InfeasibleConfiguration` when sigma is not a positive finite number, when
/// there are no centers, or when `npoints` is smaller than the center count.
#[instrument(skip(centers, rng), fields(nclusters = centers.len(), dim = centers.dim()))]
pub fn generate_blobs<R: Rng + ?Sized>(
    centers: &Centers,
    params: &BlobParams,
    rng: &mut R,
) -> Result<Dataset> {
    if !(params.sigma.is_finite() && params.sigma > 0.0) {
        return Err(Error::infeasible(format!(
            "sigma must be positive and finite, got {}",
            params.sigma
        )));
    }
    if centers.is_empty() {
        return Err(Error::infeasible("at least one center is required"));
    }
    if params.npoints < centers.len() {
        return Err(Error::infeasible(format!(
            "{} points cannot cover {} centers",
            params.npoints,
            centers.len()
        )));
    }

    let counts = balanced_counts(params.npoints, centers.len());
    let mut labels: Vec<usize> = Vec::with_capacity(params.npoints);
    for (label, &count) in counts.iter().enumerate() {
        labels.extend(std::iter::repeat(label).take(count));
    }
    if params.shuffle {
        labels.shuffle(rng);
    }

    let noise = Normal::new(0.0, params.sigma)
        .map_err(|e| Error::infeasible(format!("invalid sigma: {e}")))?;

    let dim = centers.dim();
    let mut points = Vec::with_capacity(params.npoints);
    for (id, &label) in labels.iter().enumerate() {
        let center = centers.as_slice()[label].coords();
        let coords = center.iter().map(|&c| c + noise.sample(rng)).collect();
        points.push(Point::new(id as u64, coords, label));
    }

    debug!(npoints = points.len(), ?counts, "blobs generated");

    Ok(Dataset {
        dim,
        points,
        centers: Some(centers.clone()),
    })
}

/// Generate centers and blobs from a single seed.
///
/// The same arguments always produce bit-identical datasets.
pub fn generate(
    dim: usize,
    nclusters: usize,
    sigma: f64,
    npoints: usize,
    seed: u64,
) -> Result<Dataset> {
    generate_with(dim, nclusters, &BlobParams::new(npoints, sigma), seed)
}

/// Like [`generate`] with explicit blob parameters.
pub fn generate_with(dim: usize, nclusters: usize, params: &BlobParams, seed: u64) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = generate_centers(dim, nclusters, &mut rng)?;
    generate_blobs(&centers, params, &mut rng)
}
