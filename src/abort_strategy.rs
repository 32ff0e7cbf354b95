use crate::{DistanceFunction, EuclideanDistance, Primitive};

/// Check whether a centroid set stopped moving.
///
/// Returns **true** iff every centroid of **current** lies within Euclidean distance **epsilon** of the
/// centroid with the same index in **previous**. An empty **previous** (no earlier iteration) or centroid
/// sets of differing size never count as converged.
pub fn has_converged<T: Primitive>(previous: &[T], current: &[T], sample_dims: usize, epsilon: T) -> bool {
	if previous.is_empty() || sample_dims == 0 || previous.len() != current.len() {
		return false;
	}
	previous.chunks_exact(sample_dims)
		.zip(current.chunks_exact(sample_dims))
		.all(|(p, c)| EuclideanDistance.distance(p, c) <= epsilon)
}

/// Enum with possible abort strategies.
/// These strategies specify when a running iteration (with the k-means calculation) is aborted.
/// Aborting due to the strategy is reported as [`RunStatus::Converged`](crate::RunStatus::Converged).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
	/// Stops as soon as no centroid moved more than **epsilon** during an iteration (see [`has_converged`]).
	/// ## Fields:
	/// - **epsilon**: Largest centroid movement that still counts as "not moving"
	CentroidShift { epsilon: T },
	/// This strategy aborts the calculation directly after an iteration produced no improvement where `improvement > threshold`
	/// for the first time.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	NoImprovement { threshold: T },
	/// This strategy aborts the calculation, when there have not been any improvements after **x** iterations,
	/// where `improvement > threshold`.
	/// ## Fields:
	/// - **x**: The amount of consecutive without improvement, after which the calculation is aborted
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	/// - **abort_on_negative**: Specifies whether the strategy instantly aborts when a negative improvement occured (**true**), or if
	/// negative improvements are handled as "no improvements" (**false**).
	NoImprovementForXIterations { x: usize, threshold: T, abort_on_negative: bool }
}
impl<T: Primitive> Default for AbortStrategy<T> {
	fn default() -> Self {
		AbortStrategy::CentroidShift { epsilon: T::from(1e-4).unwrap_or_else(T::epsilon) }
	}
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self, sample_dims: usize) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::CentroidShift{epsilon} => Box::new(CentroidShiftLogic { epsilon, sample_dims }),
			AbortStrategy::NoImprovementForXIterations{x,threshold,abort_on_negative} => Box::new(NoImprovementForXIterationsLogic {
				x, threshold, abort_on_negative,
				prev_error: T::infinity(),
				no_improvement_counter: 0
			}),
			AbortStrategy::NoImprovement{threshold} => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			})
		}
	}
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended.
	/// ## Arguments
	/// - **previous**: Centroids before the iteration's update step
	/// - **current**: Centroids after the iteration's update step
	/// - **error**: The new **error** (distsum), after an iteration
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation should abort
	fn next(&mut self, previous: &[T], current: &[T], error: T) -> bool;
}


pub(crate) struct CentroidShiftLogic<T: Primitive> {
	epsilon: T,
	sample_dims: usize
}
impl<T: Primitive> AbortStrategyLogic<T> for CentroidShiftLogic<T> {
	fn next(&mut self, previous: &[T], current: &[T], _error: T) -> bool {
		!has_converged(previous, current, self.sample_dims, self.epsilon)
	}
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, _previous: &[T], _current: &[T], error: T) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		improvement > self.threshold
	}
}


pub(crate) struct NoImprovementForXIterationsLogic<T: Primitive> {
	x: usize,
	threshold: T,
	abort_on_negative: bool,
	prev_error: T,
	no_improvement_counter: usize
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementForXIterationsLogic<T> {
	fn next(&mut self, _previous: &[T], _current: &[T], error: T) -> bool {
		let improvement = self.prev_error - error;
		self.prev_error = error;
		if self.abort_on_negative && improvement < T::zero() { // Negative improvement, and instant abort is requested
			return false;
		}
		if improvement > self.threshold { // positive improvement: reset no-improv-counter
			self.no_improvement_counter = 0;
		} else { // Still no improvement, count 1 up
			self.no_improvement_counter += 1;
		}
		self.no_improvement_counter < self.x
	}
}
