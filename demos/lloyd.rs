use stepwise_kmeans::*;

fn main() -> Result<(), KMeansError> {
    env_logger::init();
    let (sample_cnt, sample_dims, k) = (20000, 2, 4);

    // Generate some random data
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rand::random());

    let init_done = |_: &KMeansState<f64>| println!("Initialization completed.");
    let iteration_done = |s: &KMeansState<f64>, nr: usize, new_distsum: f64|
        println!("Iteration {} - Error: {:.2} -> {:.2} | Improvement: {:.2}",
            nr, s.distsum, new_distsum, s.distsum - new_distsum);
    let conf = KMeansConfig::build()
        .init_done(&init_done)
        .iteration_done(&iteration_done)
        .build();

    // Calculate kmeans, using kmean++ as initialization-method
    let kmean = KMeans::new(samples, sample_cnt, sample_dims, EuclideanDistance)?;
    let result = kmean.kmeans_lloyd(k, KMeans::init_kmeanplusplus, &conf)?;

    println!("{:?} after {} iterations", result.status(), result.len());
    if let Some(last) = result.final_state() {
        println!("Centroids: {:?}", last.centroids);
        println!("Cluster sizes: {:?}", last.centroid_frequency);
        println!("Error: {}", last.distsum);
    }
    Ok(())
}
