use crate::{helpers, AbortStrategy, DistanceFunction, EuclideanDistance, InitMethod, KMeansError, Primitive};
use crate::primitive::count_as;
use crate::variants::{Lloyd, LloydSteps, Trajectory};
use std::{cell::RefCell, cmp::Ordering, sync::atomic::AtomicBool};
use rayon::prelude::*;
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// Boxed centroid initialization, as returned by [`KMeans::init_method`].
pub type InitFn<T, D> = Box<dyn for<'c> FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError>>;

/// Amount of iterations after which a run stops with [`RunStatus::MaxIterationsReached`](crate::RunStatus::MaxIterationsReached),
/// unless configured otherwise.
pub const DEFAULT_MAX_ITER: usize = 100;

/// This is a structure holding various configuration options for the a k-means calculations, such as
/// the random number generator to use, or a couple of callbacks, that can be set to get status information from
/// a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current[`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Iteration cap
    pub(crate) max_iter: usize,
    /// Cooperative cancellation, checked before every iteration
    pub(crate) cancel: Option<&'a AtomicBool>
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            abort_strategy: AbortStrategy::default(),
            max_iter: DEFAULT_MAX_ITER,
            cancel: None
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
    pub fn max_iter(&self) -> usize { self.max_iter }
    pub fn abort_strategy(&self) -> AbortStrategy<T> { self.abort_strategy }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("max_iter", &self.max_iter)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::CentroidShift`] `{ epsilon: 1e-4 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Limit the maximum amount of iterations.
    /// ## Default
    /// [`DEFAULT_MAX_ITER`]
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter; self
    }
    /// Set a flag that, once raised, stops a running calculation before its next iteration.
    pub fn cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
        self.config.cancel = Some(cancel); self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation.
/// Every yielded snapshot of a run is one instance of it.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **iteration**: Number of (assign, update) pairs executed so far; `0` for the seeded state
/// - **distsum**: The sum of squared distances from all samples to the centroid they were assigned to in this iteration
/// - **centroids**: Cluster centers after the update step [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest cluster (meaningless while `iteration == 0`)
/// - **centroid_distances**: Vector containing each sample's (squared) distance to its centroid
/// - **empty_clusters**: Clusters that received no samples in this iteration and kept their previous centroid
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub iteration: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub empty_clusters: Vec<usize>,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            iteration: 0,
            distsum: T::zero(),
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            centroid_distances: vec![T::infinity();sample_cnt],
            empty_clusters: Vec::new(),
            sample_dims
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }

    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Coordinates of centroid **idx**.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Materialized partition: sample indices per cluster.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        helpers::partition(&self.assignments, self.k)
    }
}




/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] snapshots.
///
/// ## Building blocks
/// - Initialization [`KMeans::initialize`]
/// - Assignment step [`KMeans::assign`]
/// - Update step [`KMeans::update`]
/// - Convergence check [`has_converged`](crate::has_converged)
///
/// ## Supported variants
/// - k-Means clustering (Lloyd), run to convergence [`KMeans::kmeans_lloyd`]
/// - k-Means clustering (Lloyd), one iteration at a time [`KMeans::kmeans_lloyd_steps`]
///
/// ## Supported initialization methods
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
/// - Farthest-First [`KMeans::init_farthest_first`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed / manual [`KMeans::init_precomputed`]
pub struct KMeans<T: Primitive, D: DistanceFunction<T> = EuclideanDistance> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>,
    pub(crate) distance: D
}
impl<T: Primitive, D: DistanceFunction<T>> KMeans<T, D> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    /// - **distance**: Metric used to find the nearest centroid
    ///
    /// ## Errors
    /// Fails for an empty dataset, zero dimensions, a buffer that does not hold exactly
    /// `sample_cnt * sample_dims` values, non-finite coordinates, or coordinates so large that
    /// the sum of squared distances over the dataset could overflow ([`KMeansError::ValueOutOfRange`]).
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize, distance: D) -> Result<Self, KMeansError> {
        if sample_cnt == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if sample_dims == 0 {
            return Err(KMeansError::ZeroDimensions);
        }
        if samples.len() != sample_cnt * sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: sample_cnt * sample_dims, actual: samples.len() });
        }
        helpers::check_coordinates(&samples, helpers::coordinate_limit(sample_cnt, sample_dims))?;

        Ok(Self { sample_cnt, sample_dims, samples, distance })
    }

    /// Create a new instance from individual points. All points must have the same dimensionality.
    pub fn from_points<P: AsRef<[T]>>(points: &[P], distance: D) -> Result<Self, KMeansError> {
        let sample_dims = points.first().map(|p| p.as_ref().len()).ok_or(KMeansError::EmptyDataset)?;
        let mut samples = Vec::with_capacity(points.len() * sample_dims);
        for p in points.iter().map(|p| p.as_ref()) {
            if p.len() != sample_dims {
                return Err(KMeansError::DimensionMismatch { expected: sample_dims, actual: p.len() });
            }
            samples.extend_from_slice(p);
        }
        Self::new(samples, points.len(), sample_dims, distance)
    }

    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    pub fn sample_dims(&self) -> usize { self.sample_dims }
    pub fn samples(&self) -> &[T] { &self.samples }

    /// Coordinates of sample **idx**.
    pub fn sample(&self, idx: usize) -> &[T] {
        &self.samples[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Largest absolute coordinate accepted for samples and centroids of this dataset.
    pub(crate) fn coordinate_limit(&self) -> T {
        helpers::coordinate_limit(self.sample_cnt, self.sample_dims)
    }

    pub(crate) fn validate_k(&self, k: usize) -> Result<(), KMeansError> {
        if k == 0 || k > self.sample_cnt {
            return Err(KMeansError::InvalidK { k, sample_cnt: self.sample_cnt });
        }
        Ok(())
    }

    fn check_assignments(&self, assignments: &[usize], k: usize) -> Result<(), KMeansError> {
        if assignments.len() != self.sample_cnt {
            return Err(KMeansError::DimensionMismatch { expected: self.sample_cnt, actual: assignments.len() });
        }
        match assignments.iter().position(|&a| a >= k) {
            Some(index) => Err(KMeansError::AssignmentOutOfRange { index, cluster: assignments[index], k }),
            None => Ok(())
        }
    }

    fn assign_into(&self, centroids: &[T], k: usize, assignments: &mut [usize], centroid_distances: &mut [T]) {
        let dims = self.sample_dims;
        self.samples.par_chunks_exact(dims)
            .zip(assignments.par_iter_mut())
            .zip(centroid_distances.par_iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                // min_by keeps the first of equal minima -> ties go to the lowest centroid index
                let (best_idx, best_dist) = centroids.chunks_exact(dims).take(k)
                    .map(|c| self.distance.distance_sq(s, c))
                    .enumerate()
                    .min_by(|(_,d0), (_,d1)| d0.partial_cmp(d1).unwrap_or(Ordering::Equal))
                    .unwrap_or((0, T::infinity()));
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
    }

    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>) {
        let k = limit_k.unwrap_or(state.k);
        self.assign_into(&state.centroids, k, &mut state.assignments, &mut state.centroid_distances);
    }

    pub(crate) fn update_cluster_frequencies(assignments: &[usize], centroid_frequency: &mut[usize]) {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        assignments.iter().cloned()
            .for_each(|centroid_id| centroid_frequency[centroid_id] += 1);
    }

    /// Add every sample onto the sum of its cluster. **sums** is row-major, like the centroids.
    pub(crate) fn sum_clusters(&self, assignments: &[usize], sums: &mut [T]) {
        let dims = self.sample_dims;
        sums.iter_mut().for_each(|v| *v = T::zero());
        self.samples.chunks_exact(dims)
            .zip(assignments.iter().cloned())
            .for_each(|(s, centroid_id)| {
                sums[centroid_id * dims..(centroid_id + 1) * dims].iter_mut()
                    .zip(s.iter().cloned())
                    .for_each(|(c, sv)| *c += sv);
            });
    }

    /// Replace every centroid of a non-empty cluster by the mean of its members.
    /// Centroids of empty clusters stay where they are; their indices are returned.
    pub(crate) fn apply_means(centroids: &mut [T], sums: &[T], centroid_frequency: &[usize], sample_dims: usize) -> Vec<usize> {
        let mut empty_clusters = Vec::new();
        centroids.chunks_exact_mut(sample_dims)
            .zip(sums.chunks_exact(sample_dims))
            .zip(centroid_frequency.iter().cloned())
            .enumerate()
            .for_each(|(idx, ((c, sum), cfreq))| {
                if cfreq == 0 {
                    empty_clusters.push(idx);
                    return;
                }
                let cfreq: T = count_as(cfreq);
                c.iter_mut().zip(sum.iter().cloned()).for_each(|(cv, sv)| *cv = sv / cfreq);
            });
        empty_clusters
    }

    /// Assignment step: map every sample to the index of its nearest centroid.
    /// Ties are resolved in favour of the lowest centroid index.
    ///
    /// ## Arguments
    /// - **centroids**: Centroid set [row-major], holding any amount `>= 1` of centroids
    ///
    /// ## Returns
    /// One centroid index per sample, in sample order.
    pub fn assign(&self, centroids: &[T]) -> Result<Vec<usize>, KMeansError> {
        let k = helpers::centroid_count(centroids, self.sample_dims, self.coordinate_limit())?;
        let mut assignments = vec![0usize; self.sample_cnt];
        let mut centroid_distances = vec![T::infinity(); self.sample_cnt];
        self.assign_into(centroids, k, &mut assignments, &mut centroid_distances);
        Ok(assignments)
    }

    /// Update step: recompute every centroid as the mean of the samples assigned to it.
    /// A centroid whose cluster is empty keeps its position from **previous_centroids**.
    ///
    /// ## Arguments
    /// - **assignments**: One centroid index per sample, as returned by [`KMeans::assign`]
    /// - **previous_centroids**: Centroid set [row-major] the assignments were computed against
    pub fn update(&self, assignments: &[usize], previous_centroids: &[T]) -> Result<Vec<T>, KMeansError> {
        let k = helpers::centroid_count(previous_centroids, self.sample_dims, self.coordinate_limit())?;
        self.check_assignments(assignments, k)?;

        let mut centroid_frequency = vec![0usize; k];
        let mut sums = vec![T::zero(); previous_centroids.len()];
        Self::update_cluster_frequencies(assignments, &mut centroid_frequency);
        self.sum_clusters(assignments, &mut sums);

        let mut centroids = previous_centroids.to_vec();
        let empty_clusters = Self::apply_means(&mut centroids, &sums, &centroid_frequency, self.sample_dims);
        if !empty_clusters.is_empty() {
            log::warn!("empty clusters {:?} keep their previous centroid", empty_clusters);
        }
        Ok(centroids)
    }

    /// Produce an initial centroid set of **k** centroids [row-major], using the given initialization method.
    ///
    /// ## Errors
    /// [`KMeansError::InvalidK`] if `k == 0` or `k > sample_cnt`, before the initialization runs.
    /// Initialization methods may fail with their own validation errors (see [`KMeans::init_precomputed`]).
    pub fn initialize<'a, F>(&self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<Vec<T>, KMeansError>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
        self.validate_k(k)?;
        let mut state = KMeansState::new(self.sample_cnt, self.sample_dims, k);
        init(self, &mut state, config)?;
        helpers::check_coordinates(&state.centroids, self.coordinate_limit())?;
        Ok(state.centroids)
    }

    /// Normal K-Means algorithm implementation (Lloyd), run until the abort strategy stops it,
    /// the iteration cap is reached, or the cancel flag is raised.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// The [`Trajectory`]: one snapshot per iteration, plus the reason the run stopped.
    ///
    /// ## Example
    /// ```rust
    /// use stepwise_kmeans::*;
    /// fn main() -> Result<(), KMeansError> {
    ///     let (sample_cnt, sample_dims, k) = (2000, 2, 4);
    ///
    ///     // Generate some random data
    ///     let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    ///     samples.iter_mut().for_each(|v| *v = rand::random());
    ///
    ///     // Calculate kmeans, using kmean++ as initialization-method
    ///     let kmean = KMeans::new(samples, sample_cnt, sample_dims, EuclideanDistance)?;
    ///     let result = kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &KMeansConfig::default())?;
    ///
    ///     println!("Status: {:?} after {} iterations", result.status(), result.len());
    ///     if let Some(last) = result.final_state() {
    ///         println!("Centroids: {:?}", last.centroids);
    ///         println!("Cluster-Assignments: {:?}", last.assignments);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<Trajectory<T>, KMeansError>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
        Lloyd::calculate(self, k, init, config)
    }

    /// Step-through variant of [`KMeans::kmeans_lloyd`]. Initialization runs immediately, every
    /// iteration runs lazily when the returned iterator is advanced.
    ///
    /// ## Example
    /// ```rust
    /// use stepwise_kmeans::*;
    /// fn main() -> Result<(), KMeansError> {
    ///     let samples = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
    ///     let kmean = KMeans::new(samples, 4, 2, EuclideanDistance)?;
    ///     let conf = KMeansConfig::default();
    ///     let mut steps = kmean.kmeans_lloyd_steps(2, KMeans::init_precomputed(vec![0.0, 0.0, 10.0, 0.0]), &conf)?;
    ///
    ///     let first = steps.next().unwrap();
    ///     assert_eq!(first.centroids, vec![0.0, 0.5, 10.0, 0.5]);
    ///     assert_eq!(steps.status(), RunStatus::Iterating);
    ///     Ok(())
    /// }
    /// ```
    pub fn kmeans_lloyd_steps<'k, 'a, F>(&'k self, k: usize, init: F, config: &'k KMeansConfig<'a, T>) -> Result<LloydSteps<'k, 'a, T, D>, KMeansError>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
        LloydSteps::new(self, k, init, config)
    }

    /// K-Means++ initialization method
    ///
    /// ## Description
    /// This initialization method starts by selecting one sample as first centroid.
    /// Proceeding from there, the method iteratively selects one new centroid (per iteration) by weighting
    /// every sample with its squared distance to the nearest centroid chosen so far, and drawing one sample
    /// with probability proportional to that weight. This leads to a tendency of selecting centroids, that are
    /// far away from the already selected ones.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }

    /// Farthest-First initialization method
    ///
    /// ## Description
    /// Selects one random sample as first centroid, then greedily adds the sample that is farthest away
    /// from its nearest already selected centroid. Deterministic once the first pick is fixed.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_farthest_first(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError> {
        crate::inits::farthestfirst::calculate(kmean, state, config)
    }

    /// Random sample initialization method (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method randomly selects k distinct samples (by index) as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// Precomputed (manual) initialization method
    ///
    /// ## Description
    /// Uses externally supplied centroids [row-major] as they are, for example points a user picked on a chart.
    /// Fails with [`KMeansError::CentroidCount`] unless exactly `k` centroids are supplied.
    pub fn init_precomputed(centroids: Vec<T>) -> impl for<'c> FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<(), KMeansError> {
        move |kmean, state, config| crate::inits::precomputed::calculate(kmean, state, config, centroids)
    }

    /// Look up the initialization for a named [`InitMethod`]. **centroids** is only used by [`InitMethod::Manual`],
    /// which fails at initialization time when none were supplied.
    pub fn init_method(method: InitMethod, centroids: Option<Vec<T>>) -> InitFn<T, D> where D: 'static {
        match method {
            InitMethod::RandomSample => Box::new(Self::init_random_sample),
            InitMethod::FarthestFirst => Box::new(Self::init_farthest_first),
            InitMethod::KMeanPlusPlus => Box::new(Self::init_kmeanplusplus),
            InitMethod::Manual => Box::new(Self::init_precomputed(centroids.unwrap_or_default())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::*;

    fn kmean(samples: Vec<f64>, dims: usize) -> KMeans<f64> {
        let sample_cnt = samples.len() / dims;
        KMeans::new(samples, sample_cnt, dims, EuclideanDistance).unwrap()
    }

    #[test]
    fn construction_validation() {
        assert_eq!(KMeans::new(Vec::<f64>::new(), 0, 2, EuclideanDistance).err(), Some(KMeansError::EmptyDataset));
        assert_eq!(KMeans::new(vec![1.0f64], 1, 0, EuclideanDistance).err(), Some(KMeansError::ZeroDimensions));
        assert_eq!(KMeans::new(vec![1.0f64, 2.0, 3.0], 2, 2, EuclideanDistance).err(),
            Some(KMeansError::DimensionMismatch { expected: 4, actual: 3 }));
        assert_eq!(KMeans::new(vec![1.0f64, f64::INFINITY], 1, 2, EuclideanDistance).err(),
            Some(KMeansError::NonFiniteValue { index: 1 }));
        assert_eq!(KMeans::from_points(&[vec![1.0f64, 2.0], vec![3.0]], EuclideanDistance).err(),
            Some(KMeansError::DimensionMismatch { expected: 2, actual: 1 }));
        let kmean = KMeans::from_points(&[[1.0f64, 2.0], [3.0, 4.0]], EuclideanDistance).unwrap();
        assert_eq!(kmean.sample(1), &[3.0, 4.0]);
    }

    #[test]
    fn padding_free_cluster_assignments() {
        calculate_cluster_assignments(1);
        calculate_cluster_assignments(2);
        calculate_cluster_assignments(3);
        calculate_cluster_assignments(17);
    }

    fn calculate_cluster_assignments(sample_dims: usize) {
        let sample_cnt = 1000;
        let k = 5;
        let mut rnd = StdRng::seed_from_u64(1337);

        let mut samples = vec![0.0f64;sample_cnt * sample_dims];
        samples.iter_mut().for_each(|i| *i = rnd.gen_range(0.0..1.0));
        let kmean = kmean(samples, sample_dims);
        let centroids = kmean.samples()[..k * sample_dims].to_vec();

        // calculate assignments using method that (hopefully) works.
        let should_assignments: Vec<usize> = kmean.samples().chunks_exact(sample_dims)
            .map(|s| {
                let mut best = (0, f64::INFINITY);
                for (ci, c) in centroids.chunks_exact(sample_dims).enumerate() {
                    let d: f64 = s.iter().zip(c.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
                    if d < best.1 { best = (ci, d); }
                }
                best.0
            })
            .collect();

        assert_eq!(kmean.assign(&centroids).unwrap(), should_assignments);
    }

    #[test]
    fn assign_is_a_partition_with_lowest_index_tie_break() {
        let kmean = kmean(vec![0.0, 0.0, 5.0, 0.0, 10.0, 0.0], 2);
        // (5,0) is equally far from both centroids
        let assignments = kmean.assign(&[0.0, 0.0, 10.0, 0.0]).unwrap();
        assert_eq!(assignments, vec![0, 0, 1]);
        let clusters = helpers::partition(&assignments, 2);
        assert_eq!(clusters.iter().map(|c| c.len()).sum::<usize>(), kmean.sample_cnt());
    }

    #[test]
    fn assign_rejects_bad_centroids() {
        let kmean = kmean(two_pairs(), 2);
        assert!(kmean.assign(&[]).is_err());
        assert_eq!(kmean.assign(&[0.0, 0.0, 1.0]), Err(KMeansError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn update_returns_means_and_keeps_empty_centroids() {
        init_log();
        let kmean = kmean(two_pairs(), 2);
        let previous = vec![0.0, 0.0, 10.0, 0.0, 42.0, 42.0];
        let centroids = kmean.update(&[0, 0, 1, 1], &previous).unwrap();
        assert_slice_approx_eq(&centroids, &[0.0, 0.5, 10.0, 0.5, 42.0, 42.0], 1e-12);
    }

    #[test]
    fn update_validates_assignments() {
        let kmean = kmean(two_pairs(), 2);
        assert_eq!(kmean.update(&[0, 0, 1], &[0.0, 0.0, 1.0, 1.0]),
            Err(KMeansError::DimensionMismatch { expected: 4, actual: 3 }));
        assert_eq!(kmean.update(&[0, 0, 2, 1], &[0.0, 0.0, 1.0, 1.0]),
            Err(KMeansError::AssignmentOutOfRange { index: 2, cluster: 2, k: 2 }));
    }

    #[test]
    fn oversized_coordinates_are_rejected() {
        let err = KMeans::new(vec![0.0f64, 1e200, 2e200], 3, 1, EuclideanDistance).err();
        assert_eq!(err, Some(KMeansError::ValueOutOfRange { index: 1 }));
        assert!(KMeansError::ValueOutOfRange { index: 1 }.is_invalid_parameter());

        let kmean = kmean(vec![0.0, 2e150, 3e150], 1);
        assert_eq!(kmean.assign(&[0.0, 3e200]), Err(KMeansError::ValueOutOfRange { index: 1 }));
        assert_eq!(kmean.update(&[0, 1, 1], &[0.0, -3e200]), Err(KMeansError::ValueOutOfRange { index: 1 }));
    }

    #[test]
    fn large_coordinates_keep_nearest_centroid() {
        let kmean = kmean(vec![0.0, 2e150, 3e150], 1);
        assert_eq!(kmean.assign(&[0.0, 3e150]).unwrap(), vec![0, 1, 1]);

        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(2)).build();
        let result = kmean.kmeans_lloyd(2, KMeans::init_kmeanplusplus, &conf).unwrap();
        let last = result.final_state().unwrap();
        assert!(last.distsum.is_finite());
        assert_eq!(last.clusters().iter().map(|c| c.len()).sum::<usize>(), 3);
    }

    #[test]
    fn config_builder() {
        let conf = KMeansConfig::<f64>::default();
        assert_eq!(conf.max_iter(), DEFAULT_MAX_ITER);
        assert_eq!(conf.abort_strategy(), AbortStrategy::default());

        let conf = KMeansConfig::build()
            .max_iter(7)
            .abort_strategy(AbortStrategy::NoImprovement { threshold: 0.5f64 })
            .build();
        assert_eq!(conf.max_iter(), 7);
        assert_eq!(conf.abort_strategy(), AbortStrategy::NoImprovement { threshold: 0.5 });
    }

    #[test]
    fn initialize_rejects_invalid_k() {
        let kmean = kmean(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0], 2);
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(1)).build();
        assert_eq!(kmean.initialize(5, KMeans::init_random_sample, &conf), Err(KMeansError::InvalidK { k: 5, sample_cnt: 3 }));
        assert_eq!(kmean.initialize(0, KMeans::init_kmeanplusplus, &conf), Err(KMeansError::InvalidK { k: 0, sample_cnt: 3 }));
        assert!(KMeansError::InvalidK { k: 0, sample_cnt: 3 }.is_invalid_parameter());
    }

    #[test]
    fn initialize_by_method_name() {
        let kmean = kmean(two_pairs(), 2);
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(7)).build();
        for name in ["random", "farthest", "kmeans++"] {
            let method: InitMethod = name.parse().unwrap();
            let centroids = kmean.initialize(3, KMeans::init_method(method, None), &conf).unwrap();
            assert_eq!(centroids.len(), 3 * 2);
        }
        let manual = kmean.initialize(2, KMeans::init_method(InitMethod::Manual, Some(vec![1.0, 1.0, 2.0, 2.0])), &conf);
        assert_eq!(manual, Ok(vec![1.0, 1.0, 2.0, 2.0]));
        let missing = kmean.initialize(2, KMeans::init_method(InitMethod::Manual, None), &conf);
        assert_eq!(missing, Err(KMeansError::CentroidCount { expected: 2, actual: 0 }));
    }

    #[test]
    fn kmean_is_shared_between_parallel_runs() {
        let kmean = kmean(two_pairs(), 2);
        let results: Vec<usize> = (1..=4usize).into_par_iter()
            .map(|k| {
                let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(k as u64)).build();
                kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &conf).unwrap().final_state().unwrap().k
            })
            .collect();
        assert_eq!(results, vec![1, 2, 3, 4]);
    }
}
