use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive};
use rand::prelude::*;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    {
        // Randomly select first centroid
        let first_idx = config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt);
        state.set_centroid_from_iter(0, kmean.sample(first_idx).iter().cloned());
    }
    for k in 1..state.k {
        // For each following centroid...
        // Calculate (squared) distances to the nearest centroid chosen so far
        kmean.update_cluster_assignments(state, Some(k));

        let distsum: T = state.centroid_distances.iter().cloned().sum();
        let mut rnd = config.rnd.borrow_mut();
        if !distsum.is_finite() {
            log::warn!("k-means++ weights overflowed (total {}), picking centroid {} uniformly", distsum, k);
        }
        let sampled_centroid_id = if distsum > T::zero() && distsum.is_finite() {
            // Walk the cumulative weights until the drawn threshold is reached.
            // Samples with weight 0 already coincide with a centroid and are never drawn.
            let threshold = rnd.gen_range(T::zero()..distsum);
            let mut cumulative = T::zero();
            state.centroid_distances.iter().cloned()
                .position(|w| {
                    cumulative += w;
                    w > T::zero() && cumulative >= threshold
                })
                .or_else(|| state.centroid_distances.iter().rposition(|&w| w > T::zero()))
                .unwrap_or(kmean.sample_cnt - 1)
        } else {
            // No usable weights: every sample sits on a chosen centroid, or the metric overflowed
            rnd.gen_range(0..kmean.sample_cnt)
        };
        state.set_centroid_from_iter(k, kmean.sample(sampled_centroid_id).iter().cloned());
        log::debug!("k-means++ picked sample {} as centroid {} (total weight {:e})", sampled_centroid_id, k, distsum);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EuclideanDistance;
    use rand::rngs::mock::StepRng;

    #[test]
    fn returns_k_dataset_points() {
        let mut rnd = StdRng::seed_from_u64(1337);
        let samples: Vec<f64> = (0..400).map(|_| rnd.gen_range(0.0..100.0)).collect();
        let kmean = KMeans::new(samples, 200, 2, EuclideanDistance).unwrap();
        for k in [1, 2, 7, 200] {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(k as u64)).build();
            let centroids = kmean.initialize(k, KMeans::init_kmeanplusplus, &conf).unwrap();
            assert_eq!(centroids.len(), k * 2);
            for c in centroids.chunks_exact(2) {
                assert!(kmean.samples().chunks_exact(2).any(|s| s == c));
            }
        }
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let samples: Vec<f64> = (0..100).map(|i| ((i * 37) % 101) as f64).collect();
        let kmean = KMeans::new(samples, 50, 2, EuclideanDistance).unwrap();
        let run = || {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(42)).build();
            kmean.initialize(5, KMeans::init_kmeanplusplus, &conf).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn zero_weight_samples_are_never_drawn() {
        // Generator always yields 0: first centroid is sample 0 and the threshold is 0.
        let kmean = KMeans::new(vec![0.0f64, 1.0, 5.0, 100.0], 4, 1, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(StepRng::new(0, 0)).build();
        let centroids = kmean.initialize(2, KMeans::init_kmeanplusplus, &conf).unwrap();
        assert_eq!(centroids, vec![0.0, 1.0]);
    }

    #[test]
    fn threshold_selects_cumulative_weight_bucket() {
        // First pick is sample 0 -> weights [0, 9, 4, 1], total 14
        let kmean = KMeans::new(vec![0.0f64, 3.0, 2.0, 1.0], 4, 1, EuclideanDistance).unwrap();
        // Draws: 0 for the first pick, then 1 << 63 -> threshold 0.5 * 14 = 7, inside (0, 9]
        let conf = KMeansConfig::build().random_generator(StepRng::new(0, 1 << 63)).build();
        assert_eq!(kmean.initialize(2, KMeans::init_kmeanplusplus, &conf), Ok(vec![0.0, 3.0]));
        // Draws: 0, then 3 << 62 -> threshold 0.75 * 14 = 10.5, inside (9, 13]
        let conf = KMeansConfig::build().random_generator(StepRng::new(0, 3 << 62)).build();
        assert_eq!(kmean.initialize(2, KMeans::init_kmeanplusplus, &conf), Ok(vec![0.0, 2.0]));
    }

    #[test]
    fn all_samples_identical() {
        let kmean = KMeans::new(vec![3.0f32; 10], 5, 2, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(5)).build();
        let centroids = kmean.initialize(3, KMeans::init_kmeanplusplus, &conf).unwrap();
        assert_eq!(centroids, vec![3.0f32; 6]);
    }
}
