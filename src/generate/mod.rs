//! Synthetic labeled point clouds.
//!
//! Generation happens in two steps:
//!
//! 1. [`generate_centers`] picks distinct vertices of the hypercube `{-1, +1}^dim`.
//! 2. [`generate_blobs`] draws isotropic Gaussian samples around them, splitting
//!    `npoints` as evenly as possible across centers.
//!
//! [`generate`] chains both from a single seed.
//!
//! ```rust
//! use densebench::generate::generate;
//!
//! let ds = generate(2, 4, 0.3, 400, 0).unwrap();
//! assert_eq!(ds.len(), 400);
//! assert_eq!(ds.centers().unwrap().len(), 4);
//! ```

mod blobs;
mod centers;

pub use blobs::{balanced_counts, generate, generate_blobs, generate_with, BlobParams, Dataset, Point};
pub use centers::{generate_centers, Center, CenterPair, Centers};
