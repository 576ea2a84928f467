//! Tabular interchange format for datasets and clusterings.
//!
//! One row per point:
//!
//! ```text
//! id,point,true_cluster[,inferred_cluster]
//! 0,"{0.93,-1.12}",1,0
//! ```
//!
//! Points are written as `{x1,x2,...,xn}`. `inferred_cluster` is present only
//! after clustering; noise is `-1`. Reading and writing go through any
//! `std::io::Read`/`Write`, so storage is up to the caller.

use std::io;

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterAssignment;
use crate::error::{Error, Result};
use crate::generate::{Dataset, Point};

/// One row of the interchange table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Point id.
    pub id: u64,
    /// Coordinates as `{x1,...,xn}`.
    pub point: String,
    /// Ground-truth cluster.
    pub true_cluster: usize,
    /// Inferred cluster, `-1` for noise; absent before clustering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_cluster: Option<i64>,
}

/// Encode coordinates as `{x1,x2,...}`.
///
/// Uses the shortest representation that parses back to the same `f64`.
pub fn format_point(coords: &[f64]) -> String {
    let body = coords
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}

/// Decode `{x1,x2,...}`. `{}` is a zero-dimensional point.
pub fn parse_point(s: &str) -> Result<Vec<f64>> {
    let inner = s
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| Error::record(format!("point {s:?} is not wrapped in braces")))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|e| Error::record(format!("bad coordinate {part:?} in {s:?}: {e}")))
        })
        .collect()
}

/// Records for a dataset, optionally with inferred labels.
pub fn to_records(dataset: &Dataset, assignment: Option<&ClusterAssignment>) -> Result<Vec<PointRecord>> {
    let ids = match assignment {
        Some(a) if a.len() != dataset.len() => {
            return Err(Error::InputShapeMismatch {
                what: "assignment length",
                expected: dataset.len(),
                found: a.len(),
            })
        }
        Some(a) => Some(a.label_ids()),
        None => None,
    };
    Ok(dataset
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| PointRecord {
            id: p.id(),
            point: format_point(p.coords()),
            true_cluster: p.true_label(),
            inferred_cluster: ids.as_ref().map(|ids| ids[i]),
        })
        .collect())
}

fn write_records<W: io::Write>(writer: W, records: &[PointRecord]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    for record in records {
        w.serialize(record)?;
    }
    w.flush().map_err(|e| Error::record(e.to_string()))?;
    Ok(())
}

/// Write `id,point,true_cluster` rows with a header.
pub fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<()> {
    write_records(writer, &to_records(dataset, None)?)
}

/// Write `id,point,true_cluster,inferred_cluster` rows with a header.
pub fn write_clustered<W: io::Write>(
    writer: W,
    dataset: &Dataset,
    assignment: &ClusterAssignment,
) -> Result<()> {
    write_records(writer, &to_records(dataset, Some(assignment))?)
}

/// Read rows written by [`write_dataset`] or [`write_clustered`].
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<PointRecord>> {
    let mut r = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for row in r.deserialize::<PointRecord>() {
        out.push(row?);
    }
    Ok(out)
}

impl Dataset {
    /// Rebuild a dataset from interchange rows, in row order.
    ///
    /// The result has no centers, since the table does not carry them.
    /// Repeated ids are rejected with `DuplicatePointId`.
    pub fn from_records(records: &[PointRecord]) -> Result<Self> {
        let mut points = Vec::with_capacity(records.len());
        for r in records {
            points.push(Point::new(r.id, parse_point(&r.point)?, r.true_cluster));
        }
        let dim = points.first().map_or(0, |p| p.coords().len());
        Dataset::new(dim, points, None)
    }
}

impl ClusterAssignment {
    /// Inferred labels from interchange rows, in row order.
    ///
    /// Fails if any row lacks `inferred_cluster`.
    pub fn from_records(records: &[PointRecord]) -> Result<Self> {
        let ids = records
            .iter()
            .map(|r| {
                r.inferred_cluster
                    .ok_or_else(|| Error::record(format!("row {} has no inferred_cluster", r.id)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_label_ids(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{Clustering, Dbscan};
    use crate::generate::generate;

    #[test]
    fn point_text_round_trip_is_exact() {
        let coords = vec![0.1, -2.0, 1.0 / 3.0, 123456.789];
        let text = format_point(&coords);
        assert_eq!(text, "{0.1,-2,0.3333333333333333,123456.789}");
        assert_eq!(parse_point(&text).unwrap(), coords);
    }

    #[test]
    fn parse_accepts_whitespace() {
        assert_eq!(parse_point(" { 1.5 , -2 } ").unwrap(), vec![1.5, -2.0]);
        assert_eq!(parse_point("{}").unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn parse_rejects_malformed_points() {
        for bad in ["1,2", "{1,2", "{1,,2}", "{a}", "[1,2]"] {
            assert!(
                matches!(parse_point(bad), Err(Error::Record { .. })),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn dataset_csv_has_no_inferred_column() {
        let ds = generate(2, 2, 0.2, 4, 0).unwrap();
        let mut buf = Vec::new();
        write_dataset(&mut buf, &ds).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id,point,true_cluster\n"));

        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.inferred_cluster.is_none()));

        let back = Dataset::from_records(&records).unwrap();
        assert_eq!(back.points(), ds.points());
        assert!(back.centers().is_none());
        assert!(ClusterAssignment::from_records(&records).is_err());
    }

    #[test]
    fn clustered_csv_restores_labels() {
        let ds = generate(2, 4, 0.1, 80, 3).unwrap();
        let a = Dbscan::new(0.5, 4).fit(ds.points()).unwrap();

        let mut buf = Vec::new();
        write_clustered(&mut buf, &ds, &a).unwrap();
        let records = read_records(buf.as_slice()).unwrap();

        assert_eq!(Dataset::from_records(&records).unwrap().points(), ds.points());
        let back = ClusterAssignment::from_records(&records).unwrap();
        assert_eq!(back.label_ids(), a.label_ids());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let text = "id,point,true_cluster\n0,\"{1,2}\",0\n1,\"{1}\",0\n";
        let records = read_records(text.as_bytes()).unwrap();
        assert!(matches!(
            Dataset::from_records(&records),
            Err(Error::InputShapeMismatch { .. })
        ));
    }

    #[test]
    fn repeated_id_is_rejected() {
        let text = "id,point,true_cluster\n0,\"{1,2}\",0\n1,\"{3,4}\",1\n0,\"{5,6}\",1\n";
        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            Dataset::from_records(&records).unwrap_err(),
            Error::DuplicatePointId { id: 0 }
        );
    }

    #[test]
    fn bad_csv_is_a_record_error() {
        let text = "id,point,true_cluster\nzero,\"{1}\",0\n";
        assert!(matches!(read_records(text.as_bytes()), Err(Error::Record { .. })));
    }
}
