use crate::primitive::count_as;
use crate::{KMeansError, Primitive};

/// Group sample indices by their cluster. Cluster `i` of the result holds the indices of all samples
/// assigned to centroid `i`, in ascending order. Clusters without samples stay empty.
pub fn partition(assignments: &[usize], k: usize) -> Vec<Vec<usize>> {
	let mut clusters = vec![Vec::new(); k];
	assignments.iter().cloned().enumerate()
		.for_each(|(sample_idx, centroid_id)| clusters[centroid_id].push(sample_idx));
	clusters
}

fn check_finite<T: Primitive>(values: &[T]) -> Result<(), KMeansError> {
	match values.iter().position(|v| !v.is_finite()) {
		Some(index) => Err(KMeansError::NonFiniteValue { index }),
		None => Ok(())
	}
}

/// Largest absolute coordinate for which any sum of squared distances over a dataset of
/// **sample_cnt** x **sample_dims** values stays below `T::max_value() / 2`.
pub(crate) fn coordinate_limit<T: Primitive>(sample_cnt: usize, sample_dims: usize) -> T {
	// per axis |a - b| <= 2 * limit
	let terms: T = count_as(sample_cnt.saturating_mul(sample_dims).saturating_mul(8));
	(T::max_value() / terms).sqrt()
}

/// Reject non-finite values and values beyond **limit** (see [`coordinate_limit`]).
pub(crate) fn check_coordinates<T: Primitive>(values: &[T], limit: T) -> Result<(), KMeansError> {
	check_finite(values)?;
	match values.iter().position(|v| v.abs() > limit) {
		Some(index) => Err(KMeansError::ValueOutOfRange { index }),
		None => Ok(())
	}
}

/// Validate a flat centroid buffer and return the amount of centroids it holds.
pub(crate) fn centroid_count<T: Primitive>(centroids: &[T], sample_dims: usize, limit: T) -> Result<usize, KMeansError> {
	if centroids.is_empty() || centroids.len() % sample_dims != 0 {
		let expected = std::cmp::max(1, (centroids.len() + sample_dims - 1) / sample_dims) * sample_dims;
		return Err(KMeansError::DimensionMismatch { expected, actual: centroids.len() });
	}
	check_coordinates(centroids, limit)?;
	Ok(centroids.len() / sample_dims)
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-15))
}

#[cfg(test)]
pub(crate) mod testing {
	/// Install the logger once for the whole test binary.
	pub fn init_log() {
		let _ = env_logger::builder().is_test(true).try_init();
	}

	/// Four samples in two well separated pairs: (0,0), (0,1), (10,0), (10,1).
	pub fn two_pairs() -> Vec<f64> {
		vec![0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0]
	}

	/// Samples where the second of three clusters loses all its members in the third iteration,
	/// when seeded with [`empty_at_third_iteration_seeds`].
	pub fn empty_at_third_iteration() -> Vec<f64> {
		vec![12.0, 2.0, 7.0, 7.0, 6.0, 10.0, 10.0, 9.0, 9.0, 0.0]
	}

	pub fn empty_at_third_iteration_seeds() -> Vec<f64> {
		vec![3.0, 12.0, 12.0, 8.0, 6.0, 6.0]
	}

	pub fn assert_slice_approx_eq(actual: &[f64], should: &[f64], tol: f64) {
		assert_eq!(actual.len(), should.len(), "length mismatch: {:?} vs {:?}", actual, should);
		actual.iter().zip(should.iter()).for_each(|(&a, &s)| assert_approx_eq!(a, s, tol));
	}
}
