use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Co-occurrence counts between two labelings of the same points.
///
/// Rows are classes of the first labeling, columns classes of the second,
/// both numbered in order of first appearance. Only the counts matter, so the
/// table is identical (up to row/column order) under any relabeling.
#[derive(Debug, Clone)]
pub(crate) struct Contingency {
    n: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    /// Non-zero cells as `(row, col, count)`.
    cells: Vec<(usize, usize, usize)>,
}

impl Contingency {
    pub(crate) fn new<A, B>(a: &[A], b: &[B]) -> Result<Self>
    where
        A: Eq + Hash,
        B: Eq + Hash,
    {
        if a.len() != b.len() {
            return Err(Error::InputShapeMismatch {
                what: "label length",
                expected: a.len(),
                found: b.len(),
            });
        }

        let row_ids = dense_ids(a);
        let col_ids = dense_ids(b);
        let n_rows = row_ids.iter().copied().max().map_or(0, |m| m + 1);
        let n_cols = col_ids.iter().copied().max().map_or(0, |m| m + 1);

        let mut rows = vec![0usize; n_rows];
        let mut cols = vec![0usize; n_cols];
        let mut cell_counts: HashMap<(usize, usize), usize> = HashMap::new();
        for (&r, &c) in row_ids.iter().zip(col_ids.iter()) {
            rows[r] += 1;
            cols[c] += 1;
            *cell_counts.entry((r, c)).or_insert(0) += 1;
        }

        let mut cells: Vec<(usize, usize, usize)> = cell_counts
            .into_iter()
            .map(|((r, c), count)| (r, c, count))
            .collect();
        cells.sort_unstable();

        Ok(Self {
            n: a.len(),
            rows,
            cols,
            cells,
        })
    }

    pub(crate) fn n(&self) -> usize {
        self.n
    }

    pub(crate) fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub(crate) fn cols(&self) -> &[usize] {
        &self.cols
    }

    pub(crate) fn cells(&self) -> &[(usize, usize, usize)] {
        &self.cells
    }

    /// Mutual information in nats.
    pub(crate) fn mutual_information(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let mi: f64 = self
            .cells
            .iter()
            .map(|&(r, c, count)| {
                let nij = count as f64;
                let outer = self.rows[r] as f64 * self.cols[c] as f64;
                (nij / n) * (n * nij / outer).ln()
            })
            .sum();
        // Rounding can push an independent table slightly below zero.
        mi.max(0.0)
    }

    pub(crate) fn row_entropy(&self) -> f64 {
        entropy(&self.rows, self.n)
    }

    pub(crate) fn col_entropy(&self) -> f64 {
        entropy(&self.cols, self.n)
    }
}

/// Map each label to a dense id in order of first appearance.
fn dense_ids<L: Eq + Hash>(labels: &[L]) -> Vec<usize> {
    let mut seen: HashMap<&L, usize> = HashMap::new();
    labels
        .iter()
        .map(|l| {
            let next = seen.len();
            *seen.entry(l).or_insert(next)
        })
        .collect()
}

/// Shannon entropy (nats) of a distribution given as counts summing to `n`.
pub(crate) fn entropy(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let h: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum();
    h.max(0.0)
}

/// `ln(k!)` for `k` in `0..=n`.
pub(crate) fn ln_factorials(n: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(n + 1);
    out.push(0.0);
    let mut acc = 0.0;
    for k in 1..=n {
        acc += (k as f64).ln();
        out.push(acc);
    }
    out
}
