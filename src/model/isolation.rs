//! Isolation forest anomaly detector.
//!
//! Scores follow the usual convention: `score_sample` is the negated anomaly
//! score `2^(-E[h(x)] / c(n))`, and `decision` subtracts the offset chosen so
//! that roughly `contamination` of the training rows fall below zero.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::config::AnomalyConfig;
use crate::error::ModelSkip;
use crate::stats::percentile;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
    pub offset: f64,
    pub contamination: f64,
}

impl IsolationForest {
    pub fn fit(data: &[Vec<f64>], config: &AnomalyConfig) -> Result<Self, ModelSkip> {
        if data.len() < 2 {
            return Err(ModelSkip::InsufficientPopulation {
                available: data.len(),
                required: 2,
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let sample_size = config.max_samples.min(data.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        let trees = (0..config.trees)
            .map(|_| {
                let rows: Vec<&[f64]> = sample(&mut rng, data.len(), sample_size)
                    .into_iter()
                    .map(|index| data[index].as_slice())
                    .collect();
                grow(&rows, 0, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
            contamination: config.contamination,
        };

        let training_scores: Vec<f64> = data.iter().map(|row| forest.score_sample(row)).collect();
        forest.offset = contamination_offset(&training_scores, config.contamination);
        Ok(forest)
    }

    /// Negated anomaly score; lower is more anomalous.
    pub fn score_sample(&self, point: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return -0.5;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| path_length(tree, point, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        let normalizer = average_path_length(self.sample_size);
        if normalizer <= 0.0 {
            return -0.5;
        }
        -(2f64.powf(-mean_path / normalizer))
    }

    /// Negative values are outliers.
    pub fn decision(&self, point: &[f64]) -> f64 {
        self.score_sample(point) - self.offset
    }
}

/// Score below which `contamination` of `scores` fall.
pub fn contamination_offset(scores: &[f64], contamination: f64) -> f64 {
    percentile(scores, contamination * 100.0)
}

fn grow(rows: &[&[f64]], depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let dims = rows[0].len();
    let splittable: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|feature| {
            let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                (lo.min(row[feature]), hi.max(row[feature]))
            });
            (max > min).then_some((feature, min, max))
        })
        .collect();

    if splittable.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
        rows.iter().copied().partition(|row| row[feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(&left, depth + 1, height_limit, rng)),
        right: Box::new(grow(&right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Expected path length of an unsuccessful search in a binary search tree of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut data: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let jitter = (i % 7) as f64 * 0.05;
                vec![1.0 + jitter, 2.0 - jitter]
            })
            .collect();
        data.push(vec![25.0, -30.0]);
        data
    }

    #[test]
    fn isolated_point_scores_lowest() {
        let data = cluster_with_outlier();
        let forest = IsolationForest::fit(&data, &AnomalyConfig::default()).expect("fits");
        let outlier = forest.decision(&data[40]);
        let typical = forest.decision(&data[3]);
        assert!(outlier < typical);
        assert!(outlier < 0.0);
    }

    #[test]
    fn fitting_is_reproducible_with_same_seed() {
        let data = cluster_with_outlier();
        let config = AnomalyConfig::default();
        let first = IsolationForest::fit(&data, &config).expect("fits");
        let second = IsolationForest::fit(&data, &config).expect("fits");
        assert_eq!(first, second);
    }

    #[test]
    fn average_path_length_matches_known_values() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.2447).abs() < 1e-3);
    }

    #[test]
    fn offset_rises_with_contamination() {
        let scores = [-0.7, -0.6, -0.5, -0.45, -0.44, -0.43, -0.42, -0.41, -0.40, -0.39];
        let low = contamination_offset(&scores, 0.05);
        let high = contamination_offset(&scores, 0.15);
        assert!(low < high);
        assert_eq!(contamination_offset(&scores, 0.0), -0.7);
    }

    #[test]
    fn single_row_is_not_enough() {
        let err = IsolationForest::fit(&[vec![1.0]], &AnomalyConfig::default())
            .expect_err("too small");
        assert!(matches!(err, ModelSkip::InsufficientPopulation { .. }));
    }
}
