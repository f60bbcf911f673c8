//! Seeded k-means with k-means++ initialisation and several restarts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use super::features::squared_distance;
use crate::config::ClusteringConfig;
use crate::error::ModelSkip;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMeans {
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeans {
    /// Runs `config.restarts` independent fits and keeps the lowest inertia.
    pub fn fit(data: &[Vec<f64>], k: usize, config: &ClusteringConfig) -> Result<Self, ModelSkip> {
        if k == 0 || data.len() < k {
            return Err(ModelSkip::InsufficientPopulation {
                available: data.len(),
                required: k.max(1),
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut best: Option<KMeans> = None;

        for restart in 0..config.restarts.max(1) {
            let initial = plus_plus_init(data, k, &mut rng);
            let candidate = lloyd(data, initial, config.max_iterations, config.tolerance);
            debug!(restart, inertia = candidate.inertia, "k-means restart finished");

            let better = best
                .as_ref()
                .map(|current| candidate.inertia < current.inertia)
                .unwrap_or(true);
            if better {
                best = Some(candidate);
            }
        }

        best.ok_or(ModelSkip::InsufficientPopulation {
            available: data.len(),
            required: k,
        })
    }

    pub fn predict(&self, point: &[f64]) -> usize {
        nearest(&self.centroids, point).0
    }

    pub fn labels(&self, data: &[Vec<f64>]) -> Vec<usize> {
        data.iter().map(|point| self.predict(point)).collect()
    }
}

fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(index, centroid)| (index, squared_distance(centroid, point)))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        })
}

fn plus_plus_init(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![data[rng.gen_range(0..data.len())].clone()];

    while centroids.len() < k {
        let distances: Vec<f64> = data
            .iter()
            .map(|point| nearest(&centroids, point).1)
            .collect();
        let total: f64 = distances.iter().sum();

        let next = if total <= 0.0 {
            rng.gen_range(0..data.len())
        } else {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = data.len() - 1;
            for (index, distance) in distances.iter().enumerate() {
                if target < *distance {
                    chosen = index;
                    break;
                }
                target -= distance;
            }
            chosen
        };
        centroids.push(data[next].clone());
    }

    centroids
}

fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iterations: usize, tolerance: f64) -> KMeans {
    let dims = centroids[0].len();
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;
        let mut sums = vec![vec![0.0; dims]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];

        for point in data {
            let (cluster, _) = nearest(&centroids, point);
            counts[cluster] += 1;
            for (sum, value) in sums[cluster].iter_mut().zip(point) {
                *sum += value;
            }
        }

        let mut shift = 0.0;
        for (index, centroid) in centroids.iter_mut().enumerate() {
            // Empty clusters keep their previous centroid.
            if counts[index] == 0 {
                continue;
            }
            let updated: Vec<f64> = sums[index]
                .iter()
                .map(|sum| sum / counts[index] as f64)
                .collect();
            shift += squared_distance(centroid, &updated);
            *centroid = updated;
        }

        if shift <= tolerance {
            break;
        }
    }

    let inertia = data
        .iter()
        .map(|point| nearest(&centroids, point).1)
        .sum();

    KMeans {
        centroids,
        inertia,
        iterations,
    }
}
