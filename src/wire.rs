//! JSON request/response contract of the clustering service.
//!
//! A request carries a 2-D dataset as `{x, y}` points, the amount of clusters and the name of the
//! initialization method. The reply either holds the final clusters and centroids, or, in step mode,
//! one entry per iteration plus the reason the run stopped.

use crate::{helpers, AbortStrategy, EuclideanDistance, InitMethod, KMeans, KMeansConfig, KMeansError, KMeansState, RunStatus};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of both coordinates produced by [`generate_dataset`].
pub const DATASET_EXTENT: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    fn coords(&self) -> [f64; 2] { [self.x, self.y] }
}

fn points_from_flat(flat: &[f64]) -> Vec<Point> {
    flat.chunks_exact(2).map(|c| Point { x: c[0], y: c[1] }).collect()
}

fn group_points(points: &[Point], assignments: &[usize], k: usize) -> Vec<Vec<Point>> {
    helpers::partition(assignments, k).into_iter()
        .map(|members| members.into_iter().map(|idx| points[idx]).collect())
        .collect()
}

/// A clustering request.
///
/// ```json
/// {"data": [{"x": 1.0, "y": 2.0}, ...], "k": 3, "initMethod": "kmeans++"}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    pub data: Vec<Point>,
    pub k: usize,
    pub init_method: String,
    /// Initial centroids, required by the `manual` method and ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroids: Option<Vec<Point>>,
    /// Reply with every iteration instead of the final result only
    #[serde(default)]
    pub step: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<usize>,
    /// Convergence threshold for the centroid movement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
}

/// Final clustering: the points of every cluster, and the centroids in the same order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterResponse {
    pub clusters: Vec<Vec<Point>>,
    pub centroids: Vec<Point>,
}

/// One iteration of a step-mode reply.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub iteration: usize,
    pub clusters: Vec<Vec<Point>>,
    pub centroids: Vec<Point>,
}
impl Step {
    fn from_state(points: &[Point], state: &KMeansState<f64>) -> Self {
        Self {
            iteration: state.iteration,
            clusters: group_points(points, &state.assignments, state.k),
            centroids: points_from_flat(&state.centroids),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepsResponse {
    pub steps: Vec<Step>,
    pub status: RunStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterReply {
    Final(ClusterResponse),
    Steps(StepsResponse),
}

impl ClusterRequest {
    /// Run the clustering this request describes.
    ///
    /// **default_seed** seeds the random generator when the request carries no `seed` of its own.
    /// Without any seed the generator is seeded from system entropy.
    pub fn run(&self, default_seed: Option<u64>) -> Result<ClusterReply, KMeansError> {
        let method: InitMethod = self.init_method.parse()?;
        let coords: Vec<[f64; 2]> = self.data.iter().map(Point::coords).collect();
        let kmean = KMeans::from_points(&coords, EuclideanDistance)?;

        let rnd = match self.seed.or(default_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut builder = KMeansConfig::build().random_generator(rnd);
        if let Some(max_iter) = self.max_iter {
            builder = builder.max_iter(max_iter);
        }
        if let Some(epsilon) = self.epsilon {
            builder = builder.abort_strategy(AbortStrategy::CentroidShift { epsilon });
        }
        let config = builder.build();

        let manual_centroids = self.centroids.as_ref()
            .map(|c| c.iter().flat_map(Point::coords).collect::<Vec<f64>>());
        if manual_centroids.is_some() && method != InitMethod::Manual {
            log::debug!("ignoring supplied centroids for init method {}", method);
        }
        log::debug!("clustering {} points into {} clusters, init method {}", self.data.len(), self.k, method);

        let trajectory = kmean.kmeans_lloyd(self.k, KMeans::init_method(method, manual_centroids), &config)?;

        if self.step {
            return Ok(ClusterReply::Steps(StepsResponse {
                steps: trajectory.iter().map(|s| Step::from_state(&self.data, s)).collect(),
                status: trajectory.status(),
            }));
        }
        let response = match trajectory.final_state() {
            Some(last) => ClusterResponse {
                clusters: group_points(&self.data, &last.assignments, last.k),
                centroids: points_from_flat(&last.centroids),
            },
            // No iteration ran: report the partition induced by the seeded centroids
            None => ClusterResponse {
                clusters: group_points(&self.data, &kmean.assign(trajectory.seed_centroids())?, self.k),
                centroids: points_from_flat(trajectory.seed_centroids()),
            },
        };
        Ok(ClusterReply::Final(response))
    }
}

/// Generate **n** points, uniformly distributed over `[0, 100)` on both axes.
pub fn generate_dataset<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Point> {
    (0..n)
        .map(|_| Point { x: rng.gen_range(0.0..DATASET_EXTENT), y: rng.gen_range(0.0..DATASET_EXTENT) })
        .collect()
}
