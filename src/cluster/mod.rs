//! Density-based clustering.
//!
//! ### DBSCAN
//!
//! Density-based clustering that can discover non-convex clusters and identify
//! outliers (noise points). DBSCAN does not require specifying the number of
//! clusters in advance; it needs a neighborhood radius `eps` and a minimum
//! neighborhood size `min_pts`.
//!
//! Results come back as a [`ClusterAssignment`]: one `Option<usize>` label per
//! input point (`None` is noise) plus the core-point mask. Cluster numbering is
//! arbitrary; compare assignments through [`ClusterAssignment::clusters`].
//!
//! ## Usage
//!
//! ```rust
//! use densebench::cluster::{Clustering, Dbscan};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//!     vec![50.0, 50.0],
//! ];
//!
//! let a = Dbscan::new(0.5, 2).fit(&data).unwrap();
//! assert_eq!(a.n_clusters(), 2);
//! assert_eq!(a.label(0), a.label(1));
//! assert_ne!(a.label(0), a.label(2));
//! assert_eq!(a.label(4), None);
//! ```

mod assignment;
mod dbscan;
mod traits;
pub(crate) mod util;

pub use assignment::{ClusterAssignment, NOISE};
pub use dbscan::{cluster, Dbscan};
pub use traits::Clustering;
