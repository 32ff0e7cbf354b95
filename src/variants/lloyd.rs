use crate::abort_strategy::AbortStrategyLogic;
use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive};
use serde::Serialize;
use std::iter::FusedIterator;
use std::sync::atomic::Ordering;

/// Lifecycle of a single k-means run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
	/// Centroids are initialized, no iteration ran yet
	Seeded,
	/// At least one iteration ran, more may follow
	Iterating,
	/// The abort strategy stopped the run
	Converged,
	/// The iteration cap was hit before the abort strategy stopped the run
	MaxIterationsReached,
	/// The cancel flag was raised
	Cancelled
}
impl RunStatus {
	/// Whether no further iteration will be produced.
	pub fn is_terminal(&self) -> bool {
		matches!(self, RunStatus::Converged | RunStatus::MaxIterationsReached | RunStatus::Cancelled)
	}
}


pub(crate) struct Lloyd<T, D> {
	_p: std::marker::PhantomData<(T, D)>
}
impl<T, D> Lloyd<T, D> where T: Primitive, D: DistanceFunction<T> {
	/// Recompute the centroids from the current assignments and return the new distance sum.
	fn update_centroids(kmean: &KMeans<T, D>, state: &mut KMeansState<T>) -> T {
		let mut sums = vec![T::zero(); state.centroids.len()];
		let mut new_distsum = T::zero();

		let (centroid_frequency, assignments, centroid_distances) = (&mut state.centroid_frequency, &state.assignments, &state.centroid_distances);
		rayon::scope(|s| {
			s.spawn(|_| {
				KMeans::<T, D>::update_cluster_frequencies(assignments, centroid_frequency);
			});
			s.spawn(|_| {
				kmean.sum_clusters(assignments, &mut sums);
			});
			s.spawn(|_| {
				new_distsum = centroid_distances.iter().cloned().sum();
			});
		});

		state.empty_clusters = KMeans::<T, D>::apply_means(&mut state.centroids, &sums, &state.centroid_frequency, kmean.sample_dims);
		if !state.empty_clusters.is_empty() {
			log::warn!("iteration {}: empty clusters {:?} keep their previous centroid", state.iteration + 1, state.empty_clusters);
		}
		new_distsum
	}

	#[inline(always)] pub fn calculate<'a, F>(kmean: &KMeans<T, D>, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<Trajectory<T>, KMeansError>
				where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
		Ok(LloydSteps::new(kmean, k, init, config)?.into_trajectory())
	}
}


/// Lazy, step-through k-means run (Lloyd). Created by [`KMeans::kmeans_lloyd_steps`].
///
/// Every call to [`Iterator::next`] runs exactly one (assign, update) pair and yields the resulting
/// [`KMeansState`] snapshot. Once [`LloydSteps::status`] is terminal, no more snapshots are produced.
/// Stopping to pull snapshots is always safe, the dataset is never modified.
pub struct LloydSteps<'k, 'a, T: Primitive, D: DistanceFunction<T>> {
	kmean: &'k KMeans<T, D>,
	config: &'k KMeansConfig<'a, T>,
	seed_centroids: Vec<T>,
	state: KMeansState<T>,
	abort_strategy: Box<dyn AbortStrategyLogic<T>>,
	status: RunStatus
}
impl<'k, 'a, T: Primitive, D: DistanceFunction<T>> LloydSteps<'k, 'a, T, D> {
	pub(crate) fn new<F>(kmean: &'k KMeans<T, D>, k: usize, init: F, config: &'k KMeansConfig<'a, T>) -> Result<Self, KMeansError>
				where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
		let seed_centroids = kmean.initialize(k, init, config)?;
		log::debug!("seeded {} centroids over {} samples (max_iter {}, {:?})",
			k, kmean.sample_cnt, config.max_iter(), config.abort_strategy());

		let state = Self::seeded_state(kmean, k, &seed_centroids);
		// Notify subscriber
		(config.init_done)(&state);

		Ok(Self {
			kmean, config, seed_centroids, state,
			abort_strategy: config.abort_strategy.create_logic(kmean.sample_dims),
			status: RunStatus::Seeded
		})
	}

	fn seeded_state(kmean: &KMeans<T, D>, k: usize, seed_centroids: &[T]) -> KMeansState<T> {
		let mut state = KMeansState::new(kmean.sample_cnt, kmean.sample_dims, k);
		state.centroids.copy_from_slice(seed_centroids);
		state.distsum = T::infinity();
		state
	}

	pub fn status(&self) -> RunStatus { self.status }
	/// Amount of iterations run so far.
	pub fn iteration(&self) -> usize { self.state.iteration }
	/// The centroids produced by the initialization [row-major].
	pub fn seed_centroids(&self) -> &[T] { &self.seed_centroids }

	/// Rewind to the seeded centroids. The initialization is not executed again, so
	/// the replayed snapshots are identical to the ones produced before.
	pub fn restart(&mut self) {
		self.state = Self::seeded_state(self.kmean, self.state.k, &self.seed_centroids);
		self.abort_strategy = self.config.abort_strategy.create_logic(self.kmean.sample_dims);
		self.status = RunStatus::Seeded;
	}

	/// Run the remaining iterations and collect them.
	pub fn into_trajectory(mut self) -> Trajectory<T> {
		let snapshots: Vec<KMeansState<T>> = self.by_ref().collect();
		Trajectory { seed_centroids: self.seed_centroids, snapshots, status: self.status }
	}

	fn cancelled(&self) -> bool {
		self.config.cancel.map_or(false, |flag| flag.load(Ordering::Relaxed))
	}

	fn step(&mut self) -> KMeansState<T> {
		let previous_centroids = self.state.centroids.clone();
		self.kmean.update_cluster_assignments(&mut self.state, None);
		let new_distsum = Lloyd::update_centroids(self.kmean, &mut self.state);
		self.state.iteration += 1;

		// Notify subscriber about finished iteration
		(self.config.iteration_done)(&self.state, self.state.iteration, new_distsum);
		let proceed = self.abort_strategy.next(&previous_centroids, &self.state.centroids, new_distsum);
		self.state.distsum = new_distsum;

		self.status = if !proceed {
			RunStatus::Converged
		} else if self.state.iteration >= self.config.max_iter {
			RunStatus::MaxIterationsReached
		} else {
			RunStatus::Iterating
		};
		log::debug!("iteration {}: distsum {:e}", self.state.iteration, new_distsum);
		if self.status.is_terminal() {
			log::info!("run finished after {} iterations: {:?}", self.state.iteration, self.status);
		}
		self.state.clone()
	}
}
impl<'k, 'a, T: Primitive, D: DistanceFunction<T>> Iterator for LloydSteps<'k, 'a, T, D> {
	type Item = KMeansState<T>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.status.is_terminal() {
			return None;
		}
		if self.cancelled() {
			self.status = RunStatus::Cancelled;
			log::info!("run cancelled after {} iterations", self.state.iteration);
			return None;
		}
		if self.state.iteration >= self.config.max_iter {
			self.status = RunStatus::MaxIterationsReached;
			log::info!("run finished after {} iterations: {:?}", self.state.iteration, self.status);
			return None;
		}
		Some(self.step())
	}
}
impl<'k, 'a, T: Primitive, D: DistanceFunction<T>> FusedIterator for LloydSteps<'k, 'a, T, D> {}


/// Complete record of a k-means run, as returned by [`KMeans::kmeans_lloyd`].
///
/// Holds one snapshot per executed iteration. Iterating over it replays the run without
/// recomputing anything.
#[derive(Clone, Debug)]
pub struct Trajectory<T: Primitive> {
	seed_centroids: Vec<T>,
	snapshots: Vec<KMeansState<T>>,
	status: RunStatus
}
impl<T: Primitive> Trajectory<T> {
	pub fn seed_centroids(&self) -> &[T] { &self.seed_centroids }
	pub fn snapshots(&self) -> &[KMeansState<T>] { &self.snapshots }
	pub fn iter(&self) -> std::slice::Iter<'_, KMeansState<T>> { self.snapshots.iter() }
	/// Amount of iterations the run executed.
	pub fn len(&self) -> usize { self.snapshots.len() }
	pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }
	pub fn status(&self) -> RunStatus { self.status }
	pub fn converged(&self) -> bool { self.status == RunStatus::Converged }
	/// Snapshot of the last iteration. `None` if the run stopped before its first iteration.
	pub fn final_state(&self) -> Option<&KMeansState<T>> { self.snapshots.last() }
	pub fn into_snapshots(self) -> Vec<KMeansState<T>> { self.snapshots }
}
impl<'t, T: Primitive> IntoIterator for &'t Trajectory<T> {
	type Item = &'t KMeansState<T>;
	type IntoIter = std::slice::Iter<'t, KMeansState<T>>;
	fn into_iter(self) -> Self::IntoIter { self.snapshots.iter() }
}
