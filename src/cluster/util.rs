use crate::error::{Error, Result};

#[inline]
pub(crate) fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[inline]
pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Check that every row has the same length and return it (0 for empty input).
pub(crate) fn common_dim<P: AsRef<[f64]>>(data: &[P]) -> Result<usize> {
    let Some(first) = data.first() else {
        return Ok(0);
    };
    let d = first.as_ref().len();
    for point in data.iter().skip(1) {
        let found = point.as_ref().len();
        if found != d {
            return Err(Error::InputShapeMismatch {
                what: "point dimension",
                expected: d,
                found,
            });
        }
    }
    Ok(d)
}
