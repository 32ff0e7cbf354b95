use num::{Float, NumCast, Zero};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// Floating point type the clustering runs on. Implemented for [`f32`] and [`f64`].
pub trait Primitive: Add + AddAssign + Sum + Sub + SubAssign + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> + for<'a> Sub<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}

/// Convert a sample count into `T`. Exact for every count `f32`/`f64` can represent.
pub(crate) fn count_as<T: Primitive>(cnt: usize) -> T {
    T::from(cnt).unwrap_or_else(T::max_value)
}
