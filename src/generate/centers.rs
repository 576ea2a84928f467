//! Hypercube vertex centers.
//!
//! A center is a vertex of the `dim`-dimensional cube `{-1, +1}^dim`, encoded as a
//! bitmask: bit `b` set means coordinate `b` is `+1`, unset means `-1`. Two
//! centers whose masks differ in `k` bits are exactly `4k` apart in squared
//! Euclidean distance, since each differing coordinate contributes `(1 - (-1))^2`.
//!
//! Masks are stored as little-endian `u64` words, so any `dim` is supported.

use std::collections::HashSet;

use rand::seq::index;
use rand::Rng;
use tracing::{debug, instrument, trace};

use crate::cluster::util::squared_euclidean;
use crate::error::{Error, Result};

/// A single hypercube vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Center {
    words: Vec<u64>,
    coords: Vec<f64>,
}

impl Center {
    /// Build a center from its vertex bitmask.
    ///
    /// Bits at positions `>= dim` are ignored.
    pub fn from_mask_words(dim: usize, words: &[u64]) -> Self {
        let n_words = dim.div_ceil(64);
        let mut masked = vec![0u64; n_words];
        for (w, out) in masked.iter_mut().enumerate() {
            *out = words.get(w).copied().unwrap_or(0) & word_mask(dim, w);
        }
        let coords = (0..dim)
            .map(|b| {
                if masked[b / 64] & (1u64 << (b % 64)) != 0 {
                    1.0
                } else {
                    -1.0
                }
            })
            .collect();
        Self {
            words: masked,
            coords,
        }
    }

    /// Coordinates, each `-1.0` or `+1.0`.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Dimensionality.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// The vertex bitmask words.
    pub fn mask_words(&self) -> &[u64] {
        &self.words
    }

    /// Number of coordinates in which two centers differ.
    pub fn hamming(&self, other: &Center) -> u32 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

impl AsRef<[f64]> for Center {
    fn as_ref(&self) -> &[f64] {
        &self.coords
    }
}

/// Squared distance between one unordered pair of centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterPair {
    /// Index of the first center.
    pub i: usize,
    /// Index of the second center (`j > i`).
    pub j: usize,
    /// Squared Euclidean distance.
    pub squared_distance: f64,
}

/// A set of pairwise-distinct centers sharing one dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct Centers {
    dim: usize,
    centers: Vec<Center>,
}

impl Centers {
    /// Build from explicit centers, checking dimensions and distinctness.
    pub fn new(dim: usize, centers: Vec<Center>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(centers.len());
        for c in &centers {
            if c.dim() != dim {
                return Err(Error::InputShapeMismatch {
                    what: "center dimension",
                    expected: dim,
                    found: c.dim(),
                });
            }
            if !seen.insert(c.words.clone()) {
                return Err(Error::infeasible("centers must be pairwise distinct"));
            }
        }
        Ok(Self { dim, centers })
    }

    /// Dimensionality of every center.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of centers.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Whether there are no centers.
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Center at index `i`.
    pub fn get(&self, i: usize) -> Option<&Center> {
        self.centers.get(i)
    }

    /// All centers in generation order.
    pub fn as_slice(&self) -> &[Center] {
        &self.centers
    }

    /// Iterate over centers.
    pub fn iter(&self) -> std::slice::Iter<'_, Center> {
        self.centers.iter()
    }

    /// Bit distance between centers `i` and `j`, `None` if either index is out of range.
    pub fn hamming(&self, i: usize, j: usize) -> Option<u32> {
        Some(self.get(i)?.hamming(self.get(j)?))
    }

    /// Squared distance for every unordered pair, in `(i, j)` lexicographic order.
    pub fn pairwise_squared_distances(&self) -> Vec<CenterPair> {
        let n = self.centers.len();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                out.push(CenterPair {
                    i,
                    j,
                    squared_distance: squared_euclidean(
                        self.centers[i].coords(),
                        self.centers[j].coords(),
                    ),
                });
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Centers {
    type Item = &'a Center;
    type IntoIter = std::slice::Iter<'a, Center>;

    fn into_iter(self) -> Self::IntoIter {
        self.centers.iter()
    }
}

/// Pick `nclusters` distinct vertices of `{-1, +1}^dim` uniformly at random.
///
/// Sparse vertex sets use rejection sampling against a seen-set. Once more
/// than half the vertices are requested the sampler draws indices without
/// replacement from the explicit vertex range instead, which bounds the work.
///
/// # Errors
///
/// `InfeasibleConfiguration` when `dim == 0`, `nclusters == 0`, or
/// `nclusters > 2^dim`. The check happens before any sampling.
#[instrument(skip(rng))]
pub fn generate_centers<R: Rng + ?Sized>(
    dim: usize,
    nclusters: usize,
    rng: &mut R,
) -> Result<Centers> {
    if dim == 0 {
        return Err(Error::infeasible("dimension must be at least 1"));
    }
    if nclusters == 0 {
        return Err(Error::infeasible("cluster count must be at least 1"));
    }

    // `None` means the vertex count exceeds anything `usize` can request.
    let capacity: Option<u64> = if dim < 64 { Some(1u64 << dim) } else { None };
    if let Some(cap) = capacity {
        if nclusters as u64 > cap {
            return Err(Error::infeasible(format!(
                "{nclusters} clusters requested but a {dim}-dimensional hypercube has only {cap} vertices"
            )));
        }
    }

    let centers = match capacity {
        Some(cap) if (nclusters as u64).saturating_mul(2) > cap => {
            debug!(capacity = cap, "dense vertex set, sampling without replacement");
            index::sample(rng, cap as usize, nclusters)
                .into_iter()
                .map(|v| Center::from_mask_words(dim, &[v as u64]))
                .collect::<Vec<_>>()
        }
        _ => rejection_sample(dim, nclusters, rng),
    };

    let centers = Centers { dim, centers };

    let pairs = centers.pairwise_squared_distances();
    for p in &pairs {
        trace!(i = p.i, j = p.j, d2 = p.squared_distance, "center separation");
    }
    if let Some(min) = pairs.iter().map(|p| p.squared_distance).min_by(f64::total_cmp) {
        debug!(min_squared_distance = min, "centers generated");
    }

    Ok(centers)
}

fn rejection_sample<R: Rng + ?Sized>(dim: usize, nclusters: usize, rng: &mut R) -> Vec<Center> {
    let n_words = dim.div_ceil(64);
    let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(nclusters);
    let mut centers = Vec::with_capacity(nclusters);

    while centers.len() < nclusters {
        let words: Vec<u64> = (0..n_words)
            .map(|w| rng.random::<u64>() & word_mask(dim, w))
            .collect();
        if seen.insert(words.clone()) {
            centers.push(Center::from_mask_words(dim, &words));
        }
    }
    centers
}

/// Mask of the valid bits in word `w` for a `dim`-bit vertex.
fn word_mask(dim: usize, w: usize) -> u64 {
    let bits = dim.saturating_sub(w * 64).min(64);
    if bits == 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mask_bits_map_to_coordinates() {
        let c = Center::from_mask_words(3, &[0b101]);
        assert_eq!(c.coords(), &[1.0, -1.0, 1.0]);
    }

    #[test]
    fn mask_bits_above_dim_are_dropped() {
        let a = Center::from_mask_words(2, &[0b111]);
        let b = Center::from_mask_words(2, &[0b011]);
        assert_eq!(a, b);
    }

    #[test]
    fn wide_masks_span_multiple_words() {
        let c = Center::from_mask_words(70, &[0, 1 << 5]);
        assert_eq!(c.dim(), 70);
        assert_eq!(c.coords()[69], 1.0);
        assert_eq!(c.coords()[68], -1.0);
        assert_eq!(c.mask_words().len(), 2);
    }

    #[test]
    fn all_vertices_of_a_square() {
        let mut rng = StdRng::seed_from_u64(0);
        let centers = generate_centers(2, 4, &mut rng).unwrap();
        assert_eq!(centers.len(), 4);
        let mut seen: Vec<Vec<u64>> = centers.iter().map(|c| c.mask_words().to_vec()).collect();
        seen.sort();
        assert_eq!(seen, vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn too_many_clusters_is_infeasible() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_centers(3, 9, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InfeasibleConfiguration { .. }));
    }

    #[test]
    fn zero_dim_or_clusters_is_infeasible() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_centers(0, 1, &mut rng).is_err());
        assert!(generate_centers(4, 0, &mut rng).is_err());
    }

    #[test]
    fn squared_distance_is_four_times_hamming() {
        let mut rng = StdRng::seed_from_u64(11);
        let centers = generate_centers(10, 30, &mut rng).unwrap();
        for p in centers.pairwise_squared_distances() {
            let k = centers.hamming(p.i, p.j).unwrap();
            assert_eq!(p.squared_distance, 4.0 * k as f64);
        }
    }

    #[test]
    fn hamming_out_of_range_is_none() {
        let mut rng = StdRng::seed_from_u64(5);
        let centers = generate_centers(3, 2, &mut rng).unwrap();
        assert_eq!(centers.hamming(0, 0), Some(0));
        assert!(centers.hamming(0, 1).is_some());
        assert_eq!(centers.hamming(0, 2), None);
        assert_eq!(centers.hamming(9, 1), None);
    }

    #[test]
    fn high_dimensional_centers_are_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        let centers = generate_centers(100, 50, &mut rng).unwrap();
        assert_eq!(centers.len(), 50);
        for p in centers.pairwise_squared_distances() {
            assert!(p.squared_distance > 0.0);
        }
    }

    #[test]
    fn explicit_centers_reject_duplicates() {
        let a = Center::from_mask_words(2, &[1]);
        let err = Centers::new(2, vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, Error::InfeasibleConfiguration { .. }));
    }
}
