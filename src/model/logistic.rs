use serde::Serialize;

use crate::config::AttritionConfig;

/// Binary logistic regression fitted by full-batch gradient descent with an
/// L2 penalty on the weights (the intercept is not penalised).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
}

impl LogisticRegression {
    pub fn fit(data: &[Vec<f64>], targets: &[bool], sample_weights: &[f64], config: &AttritionConfig) -> Self {
        let dims = data.first().map(Vec::len).unwrap_or(0);
        let mut weights = vec![0.0; dims];
        let mut intercept = 0.0;
        let mut iterations = 0;

        let total_weight: f64 = sample_weights.iter().sum();
        if total_weight <= 0.0 {
            return Self {
                weights,
                intercept,
                iterations,
            };
        }
        let penalty = 1.0 / (config.inverse_regularization * total_weight);

        for _ in 0..config.max_iterations {
            iterations += 1;
            let mut weight_gradient = vec![0.0; dims];
            let mut intercept_gradient = 0.0;

            for ((row, target), sample_weight) in data.iter().zip(targets).zip(sample_weights) {
                let predicted = sigmoid(linear(&weights, intercept, row));
                let error = sample_weight * (predicted - if *target { 1.0 } else { 0.0 });
                for (gradient, value) in weight_gradient.iter_mut().zip(row) {
                    *gradient += error * value;
                }
                intercept_gradient += error;
            }

            let mut largest_step: f64 = 0.0;
            for (weight, gradient) in weights.iter_mut().zip(&weight_gradient) {
                let step = gradient / total_weight + penalty * *weight;
                *weight -= config.learning_rate * step;
                largest_step = largest_step.max(step.abs());
            }
            let intercept_step = intercept_gradient / total_weight;
            intercept -= config.learning_rate * intercept_step;
            largest_step = largest_step.max(intercept_step.abs());

            if largest_step < config.tolerance {
                break;
            }
        }

        Self {
            weights,
            intercept,
            iterations,
        }
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(linear(&self.weights, self.intercept, row))
    }

    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) >= 0.5
    }

    pub fn accuracy(&self, data: &[Vec<f64>], targets: &[bool]) -> Option<f64> {
        if data.is_empty() {
            return None;
        }
        let correct = data
            .iter()
            .zip(targets)
            .filter(|(row, target)| self.predict(row) == **target)
            .count();
        Some(correct as f64 / data.len() as f64)
    }
}

/// Weights inversely proportional to class frequency, `n / (2 * count)`.
pub fn balanced_weights(targets: &[bool]) -> Vec<f64> {
    let positives = targets.iter().filter(|t| **t).count();
    let negatives = targets.len() - positives;
    let weight_for = |count: usize| {
        if count == 0 {
            0.0
        } else {
            targets.len() as f64 / (2.0 * count as f64)
        }
    };
    let positive_weight = weight_for(positives);
    let negative_weight = weight_for(negatives);
    targets
        .iter()
        .map(|t| if *t { positive_weight } else { negative_weight })
        .collect()
}

fn linear(weights: &[f64], intercept: f64, row: &[f64]) -> f64 {
    intercept + weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learns_a_separable_boundary() {
        let data: Vec<Vec<f64>> = (-10..=10).map(|i| vec![i as f64 / 5.0]).collect();
        let targets: Vec<bool> = data.iter().map(|row| row[0] > 0.0).collect();
        let weights = vec![1.0; data.len()];
        let model = LogisticRegression::fit(&data, &targets, &weights, &AttritionConfig::default());

        assert!(model.weights[0] > 0.0);
        assert!(model.predict_proba(&[2.0]) > 0.8);
        assert!(model.predict_proba(&[-2.0]) < 0.2);
        assert!(model.accuracy(&data, &targets).expect("non-empty") >= 0.9);
    }

    #[test]
    fn balanced_weights_equalize_class_mass() {
        let targets = vec![true, false, false, false];
        let weights = balanced_weights(&targets);
        assert_eq!(weights, vec![2.0, 2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0]);
        let positive_mass: f64 = weights[..1].iter().sum();
        let negative_mass: f64 = weights[1..].iter().sum();
        assert!((positive_mass - negative_mass).abs() < 1e-9);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn accuracy_of_empty_split_is_none() {
        let model = LogisticRegression {
            weights: vec![0.0],
            intercept: 0.0,
            iterations: 0,
        };
        assert_eq!(model.accuracy(&[], &[]), None);
    }
}
