use serde::Serialize;

use super::features::FeatureMatrix;

/// Per-column z-score transform using the population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(data: &[Vec<f64>]) -> Self {
        let columns = data.first().map(Vec::len).unwrap_or(0);
        let rows = data.len().max(1) as f64;

        let means: Vec<f64> = (0..columns)
            .map(|c| data.iter().map(|row| row[c]).sum::<f64>() / rows)
            .collect();

        let scales = (0..columns)
            .map(|c| {
                let variance = data
                    .iter()
                    .map(|row| (row[c] - means[c]).powi(2))
                    .sum::<f64>()
                    / rows;
                let std = variance.sqrt();
                // Constant columns pass through centred but unscaled.
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Self { means, scales }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }

    pub fn transform(&self, data: &[Vec<f64>]) -> FeatureMatrix {
        data.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn fit_transform(data: &[Vec<f64>]) -> (Self, FeatureMatrix) {
        let scaler = Self::fit(data);
        let scaled = scaler.transform(data);
        (scaler, scaled)
    }
}
