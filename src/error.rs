use thiserror::Error;

/// Errors reported by the clustering engine.
///
/// All variants describe invalid input and are raised before the first iteration runs.
/// Empty clusters and hitting the iteration cap are *not* errors; see
/// [`KMeansState::empty_clusters`](crate::KMeansState) and
/// [`RunStatus::MaxIterationsReached`](crate::RunStatus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// The dataset contains no samples.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Samples were declared with zero dimensions.
    #[error("samples must have at least one dimension")]
    ZeroDimensions,

    /// A buffer does not match the declared sample layout.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Expected amount of values
        expected: usize,
        /// Amount of values actually supplied
        actual: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite value at flat index {index}")]
    NonFiniteValue { index: usize },

    /// A coordinate is so large that squared distances between points could overflow.
    #[error("value at flat index {index} is too large, squared distances would overflow")]
    ValueOutOfRange { index: usize },

    /// `k` is zero or larger than the amount of samples.
    #[error("invalid k = {k}: must be in 1..={sample_cnt}")]
    InvalidK { k: usize, sample_cnt: usize },

    /// The initialization method name is not known.
    #[error("unknown initialization method '{0}'")]
    UnknownInitMethod(String),

    /// A precomputed (manual) centroid set has the wrong amount of centroids.
    #[error("expected {expected} centroids, got {actual}")]
    CentroidCount { expected: usize, actual: usize },

    /// An assignment refers to a cluster that does not exist.
    #[error("sample {index} assigned to cluster {cluster}, but k = {k}")]
    AssignmentOutOfRange { index: usize, cluster: usize, k: usize },
}

impl KMeansError {
    /// Every variant is a parameter validation failure.
    pub fn is_invalid_parameter(&self) -> bool {
        match self {
            KMeansError::EmptyDataset
            | KMeansError::ZeroDimensions
            | KMeansError::DimensionMismatch { .. }
            | KMeansError::NonFiniteValue { .. }
            | KMeansError::ValueOutOfRange { .. }
            | KMeansError::InvalidK { .. }
            | KMeansError::UnknownInitMethod(_)
            | KMeansError::CentroidCount { .. }
            | KMeansError::AssignmentOutOfRange { .. } => true,
        }
    }
}
