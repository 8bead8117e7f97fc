use super::ProbabilityModel;
use crate::config::ForestConfig;
use crate::error::{OracleError, Result};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Bagging learner: a random forest regressed on 0/1 labels, so every leaf
/// holds the positive rate of its bootstrap sample.
pub struct BaggedForest {
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl BaggedForest {
    pub fn fit(x: &[Vec<f64>], y: &[u8], config: &ForestConfig, seed: u64) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(OracleError::Model(format!(
                "forest needs matching non-empty inputs, got {} rows and {} labels",
                x.len(),
                y.len()
            )));
        }
        let x_matrix = DenseMatrix::from_2d_vec(&x.to_vec())
            .map_err(|e| OracleError::Model(format!("Matrix error: {}", e)))?;
        let targets: Vec<f64> = y.iter().map(|&l| l as f64).collect();

        let params = RandomForestRegressorParameters::default()
            .with_n_trees(config.n_trees)
            .with_max_depth(config.max_depth)
            .with_min_samples_split(config.min_samples_split)
            .with_seed(seed);

        let model = RandomForestRegressor::fit(&x_matrix, &targets, params)
            .map_err(|e| OracleError::Model(format!("Training error: {}", e)))?;
        Ok(Self { model })
    }
}

impl ProbabilityModel for BaggedForest {
    fn name(&self) -> &'static str {
        "bagging"
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let x_matrix = DenseMatrix::from_2d_vec(&x.to_vec())
            .map_err(|e| OracleError::Model(format!("Matrix error: {}", e)))?;
        let predictions: Vec<f64> = self
            .model
            .predict(&x_matrix)
            .map_err(|e| OracleError::Model(format!("Predict error: {}", e)))?;
        Ok(predictions.into_iter().map(|p| p.clamp(0.0, 1.0)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_separates_obvious_classes() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let v = i as f64 / 40.0;
            x.push(vec![v, 1.0 - v]);
            y.push(u8::from(i >= 20));
        }
        let config = ForestConfig {
            n_trees: 10,
            max_depth: 4,
            min_samples_split: 2,
        };
        let forest = BaggedForest::fit(&x, &y, &config, 11).unwrap();
        let p = forest
            .predict_proba(&[vec![0.05, 0.95], vec![0.95, 0.05]])
            .unwrap();
        assert!(p[0] < 0.5);
        assert!(p[1] > 0.5);
    }
}
