use crate::{DistanceFunction, Primitive};

#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistance;

impl<T: Primitive> DistanceFunction<T> for EuclideanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        <Self as DistanceFunction<T>>::distance_sq(self, a, b).sqrt()
    }

    #[inline(always)]
    fn distance_sq(&self, a: &[T], b: &[T]) -> T {
        a.iter()
            .zip(b.iter())
            .map(|(&sp, &cp)| sp - cp) // <sample> - <centroid>
            .map(|v| v * v)            // <vec_components> ^2
            .sum()
    }
}
