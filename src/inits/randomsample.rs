use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive};
use std::ops::DerefMut;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    // Distinct by sample index, so duplicate coordinates can still be picked more than once
    let chosen = rand::seq::index::sample(config.rnd.borrow_mut().deref_mut(), kmean.sample_cnt, state.k);
    chosen.iter()
        .enumerate()
        .for_each(|(ci, si)| { // Copy randomly chosen centroids into state.centroids
            state.set_centroid_from_iter(ci, kmean.sample(si).iter().cloned());
        });
    log::debug!("random sample init picked samples {:?}", chosen.into_vec());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EuclideanDistance;
    use rand::prelude::*;

    #[test]
    fn picks_k_distinct_samples() {
        // all samples unique -> distinct indices means distinct coordinates
        let samples: Vec<f64> = (0..50).flat_map(|i| [i as f64, (i * i) as f64]).collect();
        let kmean = KMeans::new(samples, 50, 2, EuclideanDistance).unwrap();
        for seed in 0..20 {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let centroids = kmean.initialize(10, KMeans::init_random_sample, &conf).unwrap();
            let mut picked: Vec<usize> = centroids.chunks_exact(2).map(|c| c[0] as usize).collect();
            assert!(centroids.chunks_exact(2).all(|c| c[1] == c[0] * c[0]));
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), 10);
        }
    }

    #[test]
    fn duplicate_coordinates_are_fine() {
        let kmean = KMeans::new(vec![1.0f32; 8], 4, 2, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(3)).build();
        let centroids = kmean.initialize(4, KMeans::init_random_sample, &conf).unwrap();
        assert_eq!(centroids, vec![1.0f32; 8]);
    }

    #[test]
    fn k_equal_sample_cnt_takes_every_sample() {
        let kmean = KMeans::new(vec![0.0f64, 1.0, 2.0], 3, 1, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(11)).build();
        let mut centroids = kmean.initialize(3, KMeans::init_random_sample, &conf).unwrap();
        centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(centroids, vec![0.0, 1.0, 2.0]);
    }
}
