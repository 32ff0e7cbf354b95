use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive};
use rand::prelude::*;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<(), KMeansError>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    let first_idx = config.rnd.borrow_mut().gen_range(0..kmean.sample_cnt);
    state.set_centroid_from_iter(0, kmean.sample(first_idx).iter().cloned());

    for k in 1..state.k {
        // (squared) distance of every sample to its nearest chosen centroid
        kmean.update_cluster_assignments(state, Some(k));

        // strict '>' -> ties go to the first sample in dataset order
        let (farthest_idx, _) = state.centroid_distances.iter().cloned().enumerate()
            .fold((0, T::neg_infinity()), |(best_idx, best_dist), (idx, dist)| {
                if dist > best_dist { (idx, dist) } else { (best_idx, best_dist) }
            });
        state.set_centroid_from_iter(k, kmean.sample(farthest_idx).iter().cloned());
        log::debug!("farthest-first picked sample {} as centroid {}", farthest_idx, k);
    }
    Ok(())
}
