//! Silhouette coefficient (Rousseeuw, 1987).
//!
//! For a point `i` in cluster `C`:
//!
//! ```text
//! a(i) = mean distance from i to the other members of C
//! b(i) = min over clusters C' != C of the mean distance from i to C'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! Noise points are left out entirely: they neither receive a score nor count
//! as members of any cluster. A point alone in its cluster scores 0.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::cluster::util::{common_dim, euclidean};
use crate::error::{Error, Result};

/// Per-point silhouette values, `None` for noise points.
///
/// # Errors
///
/// - `InputShapeMismatch` if `data` and `labels` differ in length or rows differ in dimension.
/// - `DegenerateClustering` if fewer than two non-noise clusters are present.
pub fn silhouette_samples<P>(data: &[P], labels: &[Option<usize>]) -> Result<Vec<Option<f64>>>
where
    P: AsRef<[f64]> + Sync,
{
    if data.len() != labels.len() {
        return Err(Error::InputShapeMismatch {
            what: "label length",
            expected: data.len(),
            found: labels.len(),
        });
    }
    common_dim(data)?;

    // Dense cluster index per point, in order of first appearance.
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let member_of: Vec<Option<usize>> = labels
        .iter()
        .map(|l| {
            l.map(|c| {
                let next = slot.len();
                *slot.entry(c).or_insert(next)
            })
        })
        .collect();
    let k = slot.len();
    if k < 2 {
        return Err(Error::DegenerateClustering {
            found: k,
            required: 2,
        });
    }

    let mut sizes = vec![0usize; k];
    for c in member_of.iter().flatten() {
        sizes[*c] += 1;
    }

    let scores: Vec<Option<f64>> = (0..data.len())
        .into_par_iter()
        .map(|i| {
            let own = member_of[i]?;
            if sizes[own] == 1 {
                return Some(0.0);
            }

            let mut sums = vec![0.0f64; k];
            let x = data[i].as_ref();
            for (j, m) in member_of.iter().enumerate() {
                if let Some(c) = *m {
                    if j != i {
                        sums[c] += euclidean(x, data[j].as_ref());
                    }
                }
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            Some(if denom > 0.0 { (b - a) / denom } else { 0.0 })
        })
        .collect();

    Ok(scores)
}

/// Mean silhouette over all non-noise points.
///
/// # Errors
///
/// Same as [`silhouette_samples`].
pub fn silhouette_score<P>(data: &[P], labels: &[Option<usize>]) -> Result<f64>
where
    P: AsRef<[f64]> + Sync,
{
    let samples = silhouette_samples(data, labels)?;
    let (sum, count) = samples
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    Ok(sum / count as f64)
}
