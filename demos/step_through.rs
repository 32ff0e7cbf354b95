use rand::prelude::*;
use stepwise_kmeans::wire::generate_dataset;
use stepwise_kmeans::*;

fn main() -> Result<(), KMeansError> {
    env_logger::init();
    let mut rnd = StdRng::seed_from_u64(42);
    let points: Vec<[f64; 2]> = generate_dataset(100, &mut rnd).iter().map(|p| [p.x, p.y]).collect();

    let kmean = KMeans::from_points(&points, EuclideanDistance)?;
    let conf = KMeansConfig::build().random_generator(rnd).build();
    let mut steps = kmean.kmeans_lloyd_steps(3, KMeans::init_farthest_first, &conf)?;
    println!("seeded: {:?}", steps.seed_centroids());

    for state in steps.by_ref() {
        println!("iteration {:>2}: distsum {:>10.3}, cluster sizes {:?}", state.iteration, state.distsum, state.centroid_frequency);
        if !state.empty_clusters.is_empty() {
            println!("              empty clusters {:?}", state.empty_clusters);
        }
    }
    println!("{:?}", steps.status());

    // Replay from the same seeds
    steps.restart();
    println!("replayed {} iterations", steps.count());
    Ok(())
}
