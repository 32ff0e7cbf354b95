use crate::{helpers, DistanceFunction, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive};

#[inline(always)]
pub fn calculate<T, D>(
    kmean: &KMeans<T, D>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<(), KMeansError>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    if computed.len() % kmean.sample_dims != 0 {
        return Err(KMeansError::DimensionMismatch { expected: state.k * kmean.sample_dims, actual: computed.len() });
    }
    let supplied = computed.len() / kmean.sample_dims;
    if supplied != state.k {
        return Err(KMeansError::CentroidCount { expected: state.k, actual: supplied });
    }
    helpers::check_coordinates(&computed, kmean.coordinate_limit())?;
    state.centroids = computed;
    Ok(())
}
