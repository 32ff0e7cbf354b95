//! # stepwise-kmeans - API documentation
//!
//! Stepwise-kmeans is a small rust library for k-means clustering, built to be watched while it runs.
//!
//! ## Design target
//! Besides running k-means to convergence, every run can be driven one iteration at a time, and each
//! iteration is recorded as a [`KMeansState`] snapshot, so a client can render how the clusters form.
//! Samples are given using a raw, row-major vector, instead of any high-level matrix crate.
//! The assignment step is parallelized with rayon.
//!
//! ## Supported variants
//! - run to convergence: [`KMeans::kmeans_lloyd`], returning a [`Trajectory`]
//! - step-through: [`KMeans::kmeans_lloyd_steps`], returning the lazy [`LloydSteps`] iterator
//!
//! For the individual building blocks (initialize, assign, update, convergence check), see [`KMeans`].
//!
//! ## Supported centroid initializations
//! The outcome of each K-Means run depends on the initialization of its clusters. Random sample,
//! farthest-first, K-Mean++ and manually supplied centroids are implemented; see [`KMeans`] and [`InitMethod`].
//! Seed the random generator through [`KMeansConfigBuilder::random_generator`] for repeatable runs.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use stepwise_kmeans::*;
//!
//! fn main() -> Result<(), KMeansError> {
//!     let samples = vec![0.0f64, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0];
//!     let kmean = KMeans::new(samples, 4, 2, EuclideanDistance)?;
//!     let conf = KMeansConfig::build().max_iter(50).build();
//!
//!     let result = kmean.kmeans_lloyd(2, KMeans::init_precomputed(vec![0.0, 0.0, 10.0, 0.0]), &conf)?;
//!     for state in &result {
//!         println!("Iteration {}: {:?}", state.iteration, state.centroids);
//!     }
//!     assert_eq!(result.status(), RunStatus::Converged);
//!     assert_eq!(result.final_state().unwrap().clusters(), vec![vec![0, 1], vec![2, 3]]);
//!     Ok(())
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. This struct is generic over the underlying primitive
//! type, that should be used for the calculations. To use KMeans, an instance of this struct is created, taking
//! over the sample data into its ownership. The data is validated once, on construction.
//!
//! Calling a run method on the struct does not mutate it, so multiple runs can be done in parallel.
//! Internally, a new instance of [`KMeansState`] is used to store the state of a K-Means calculation.
//!
//! The [`wire`] module holds the JSON request/response types used by the `kmeans-batch` binary.

#[macro_use] mod helpers;
mod abort_strategy;
mod api;
mod distances;
mod error;
mod inits;
mod primitive;
mod variants;
pub mod wire;

pub use abort_strategy::{has_converged, AbortStrategy};
pub use api::{InitFn, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState, DEFAULT_MAX_ITER};
pub use distances::{DistanceFunction, EuclideanDistance};
pub use error::KMeansError;
pub use helpers::partition;
pub use inits::InitMethod;
pub use primitive::Primitive;
pub use variants::{LloydSteps, RunStatus, Trajectory};


#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use super::*;

    #[test] fn complete_lloyd_small_f64() { complete_lloyd::<f64>(200, 20, 10); }
    #[test] fn complete_lloyd_big_f64() { complete_lloyd::<f64>(5000, 2, 8); }
    #[test] fn complete_lloyd_small_f32() { complete_lloyd::<f32>(200, 20, 10); }
    #[test] fn complete_lloyd_big_f32() { complete_lloyd::<f32>(5000, 2, 8); }
    fn complete_lloyd<T: Primitive>(sample_cnt: usize, sample_dims: usize, k: usize) {
        let mut rnd = rand::rngs::StdRng::seed_from_u64(1337);
        let mut samples = vec![T::zero();sample_cnt * sample_dims];
        samples.iter_mut().for_each(|v| *v = rnd.gen_range(T::zero()..T::one()));
        let kmean = KMeans::new(samples, sample_cnt, sample_dims, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(rnd).build();

        let result = kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &conf).unwrap();
        assert!(!result.is_empty());
        assert!(result.len() <= DEFAULT_MAX_ITER);
        for state in &result {
            assert_eq!(state.centroids.len(), k * sample_dims);
            assert_eq!(state.centroid_frequency.iter().sum::<usize>(), sample_cnt);
            assert_eq!(state.clusters().iter().map(|c| c.len()).sum::<usize>(), sample_cnt);
        }
        let distsums: Vec<T> = result.iter().map(|s| s.distsum).collect();
        // Lloyd never increases the distance sum (up to rounding)
        distsums.windows(2).for_each(|w| assert!(w[1] <= w[0] + w[0] * T::from(1e-3).unwrap()));
    }

    #[test]
    fn too_many_clusters() {
        let kmean = KMeans::new(vec![0.0f64, 0.0, 1.0, 1.0, 2.0, 2.0], 3, 2, EuclideanDistance).unwrap();
        let err = kmean.kmeans_lloyd(5, KMeans::init_kmeanplusplus, &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, KMeansError::InvalidK { k: 5, sample_cnt: 3 });
        assert!(err.is_invalid_parameter());
    }
}
