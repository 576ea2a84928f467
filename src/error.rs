use thiserror::Error;

/// Errors returned by generation, clustering, and evaluation in this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The requested generation parameters cannot be satisfied.
    ///
    /// Raised for cluster counts above `2^dim`, non-positive sigma, or fewer
    /// points than centers.
    #[error("infeasible configuration: {message}")]
    InfeasibleConfiguration {
        /// Human-readable explanation.
        message: String,
    },

    /// Fewer non-noise clusters were found than an operation needs.
    #[error("degenerate clustering: found {found} non-noise clusters, need at least {required}")]
    DegenerateClustering {
        /// Number of non-noise clusters found.
        found: usize,
        /// Minimum number of clusters required.
        required: usize,
    },

    /// Lengths of labels, points, or feature vectors disagree.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    InputShapeMismatch {
        /// Which input disagreed.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Two points in one dataset share an id.
    #[error("duplicate point id {id}")]
    DuplicatePointId {
        /// The repeated id.
        id: u64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Malformed interchange record or CSV failure.
    #[error("record error: {message}")]
    Record {
        /// Human-readable explanation.
        message: String,
    },
}

impl Error {
    pub(crate) fn infeasible(message: impl Into<String>) -> Self {
        Self::InfeasibleConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn record(message: impl Into<String>) -> Self {
        Self::Record {
            message: message.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::record(err.to_string())
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
