//! Metrics comparing an inferred partition against ground truth.
//!
//! All scores depend only on the contingency table of the two labelings, so
//! renaming the labels of either side by a bijection leaves them unchanged.
//! Noise is just another label here.

use std::hash::Hash;

use super::contingency::{ln_factorials, Contingency};
use crate::error::Result;

/// Homogeneity, completeness, and their harmonic mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HcvScore {
    /// Each cluster contains only members of a single class.
    pub homogeneity: f64,
    /// All members of a class are assigned to the same cluster.
    pub completeness: f64,
    /// Harmonic mean of homogeneity and completeness.
    pub v_measure: f64,
}

/// Entropy-based homogeneity, completeness, and V-measure (Rosenberg & Hirschberg, 2007).
///
/// Homogeneity is `I(C; K) / H(C)` and completeness `I(C; K) / H(K)`, where `C`
/// is the true labeling and `K` the inferred one. A zero entropy makes the
/// corresponding score 1. Empty inputs score 1 on all three.
pub fn homogeneity_completeness_v_measure<T, P>(labels_true: &[T], labels_pred: &[P]) -> Result<HcvScore>
where
    T: Eq + Hash,
    P: Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;
    if table.n() == 0 {
        return Ok(HcvScore {
            homogeneity: 1.0,
            completeness: 1.0,
            v_measure: 1.0,
        });
    }

    let h_true = table.row_entropy();
    let h_pred = table.col_entropy();
    let mi = table.mutual_information();

    let homogeneity = if h_true == 0.0 { 1.0 } else { (mi / h_true).min(1.0) };
    let completeness = if h_pred == 0.0 { 1.0 } else { (mi / h_pred).min(1.0) };
    let v_measure = if homogeneity + completeness == 0.0 {
        0.0
    } else {
        2.0 * homogeneity * completeness / (homogeneity + completeness)
    };

    Ok(HcvScore {
        homogeneity,
        completeness,
        v_measure,
    })
}

/// Homogeneity alone.
pub fn homogeneity<T: Eq + Hash, P: Eq + Hash>(labels_true: &[T], labels_pred: &[P]) -> Result<f64> {
    Ok(homogeneity_completeness_v_measure(labels_true, labels_pred)?.homogeneity)
}

/// Completeness alone.
pub fn completeness<T: Eq + Hash, P: Eq + Hash>(labels_true: &[T], labels_pred: &[P]) -> Result<f64> {
    Ok(homogeneity_completeness_v_measure(labels_true, labels_pred)?.completeness)
}

/// V-measure alone.
pub fn v_measure<T: Eq + Hash, P: Eq + Hash>(labels_true: &[T], labels_pred: &[P]) -> Result<f64> {
    Ok(homogeneity_completeness_v_measure(labels_true, labels_pred)?.v_measure)
}

#[inline]
fn comb2(x: f64) -> f64 {
    x * (x - 1.0) / 2.0
}

/// Adjusted Rand index (Hubert & Arabie, 1985).
///
/// Counts agreeing point pairs and corrects for the agreement expected by
/// chance. 1 is a perfect match, values near 0 are chance level, and negative
/// values are worse than chance.
///
/// Two identical trivial partitions (both a single cluster, or both all
/// singletons) and empty inputs score 1.
pub fn adjusted_rand_index<T, P>(labels_true: &[T], labels_pred: &[P]) -> Result<f64>
where
    T: Eq + Hash,
    P: Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;
    let n = table.n();
    let (n_rows, n_cols) = (table.rows().len(), table.cols().len());
    if n == 0 || (n_rows == n_cols && (n_rows == 1 || n_rows == n)) {
        return Ok(1.0);
    }

    let index: f64 = table.cells().iter().map(|&(_, _, c)| comb2(c as f64)).sum();
    let sum_rows: f64 = table.rows().iter().map(|&c| comb2(c as f64)).sum();
    let sum_cols: f64 = table.cols().iter().map(|&c| comb2(c as f64)).sum();

    let expected = sum_rows * sum_cols / comb2(n as f64);
    let max_index = (sum_rows + sum_cols) / 2.0;
    let denom = max_index - expected;
    if denom == 0.0 {
        return Ok(1.0);
    }
    Ok((index - expected) / denom)
}

/// Expected mutual information of two labelings with the table's marginals,
/// under the hypergeometric model of random labelings (Vinh et al., 2009).
fn expected_mutual_information(table: &Contingency) -> f64 {
    let n = table.n();
    if n == 0 {
        return 0.0;
    }
    let lf = ln_factorials(n);
    let nf = n as f64;

    let mut emi = 0.0;
    for &a in table.rows() {
        for &b in table.cols() {
            let lo = (a + b).saturating_sub(n).max(1);
            let hi = a.min(b);
            // Terms of the log hypergeometric probability that do not depend on nij.
            let fixed = lf[a] + lf[b] + lf[n - a] + lf[n - b] - lf[n];
            for nij in lo..=hi {
                let nijf = nij as f64;
                let log_p = fixed - lf[nij] - lf[a - nij] - lf[b - nij] - lf[n + nij - a - b];
                let term = (nijf / nf) * (nf * nijf / (a as f64 * b as f64)).ln();
                emi += term * log_p.exp();
            }
        }
    }
    emi
}

/// Adjusted mutual information with arithmetic-mean normalization.
///
/// `(MI - E[MI]) / (mean(H(true), H(pred)) - E[MI])`. Both partitions being a
/// single cluster, or empty inputs, score 1.
pub fn adjusted_mutual_info<T, P>(labels_true: &[T], labels_pred: &[P]) -> Result<f64>
where
    T: Eq + Hash,
    P: Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;
    let (n_rows, n_cols) = (table.rows().len(), table.cols().len());
    if table.n() == 0 || (n_rows == 1 && n_cols == 1) {
        return Ok(1.0);
    }

    let mi = table.mutual_information();
    let emi = expected_mutual_information(&table);
    let normalizer = (table.row_entropy() + table.col_entropy()) / 2.0;

    let mut denom = normalizer - emi;
    // Keep the sign while avoiding a division by zero.
    if denom < 0.0 {
        denom = denom.min(-f64::EPSILON);
    } else {
        denom = denom.max(f64::EPSILON);
    }
    Ok((mi - emi) / denom)
}
