use crate::Primitive;

mod euclideandistance;

pub use euclideandistance::EuclideanDistance;

/// Metric used to compare a sample against a centroid.
///
/// Both slices always have the same length (the sample dimensionality).
pub trait DistanceFunction<T: Primitive>: Sync + Send {
    /// The distance between **a** and **b**. Must be symmetric and non-negative.
    fn distance(&self, a: &[T], b: &[T]) -> T;

    /// Squared distance. Used for ranking centroids and for k-means++ weights.
    #[inline(always)]
    fn distance_sq(&self, a: &[T], b: &[T]) -> T {
        let d = self.distance(a, b);
        d * d
    }
}
