use super::assignment::ClusterAssignment;
use crate::error::Result;

/// Common interface for hard clustering algorithms (one label or noise per point).
pub trait Clustering {
    /// Short algorithm name used in logs.
    fn name(&self) -> &'static str;

    /// Cluster `data` and return one label per input point, in input order.
    fn fit<P: AsRef<[f64]> + Sync>(&self, data: &[P]) -> Result<ClusterAssignment>;
}
