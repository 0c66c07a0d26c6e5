//! Gradient-boosted regression trees
//!
//! Squared-error boosting: the ensemble starts from the label mean and each
//! round fits a depth-limited tree to the current residuals, with leaf values
//! shrunk by the L2 penalty and scaled by the learning rate.

use super::tree::{RegressionTree, TreeParams};
use super::{check_rows, DemandModel, FittedModel, TrainingSet};
use crate::error::{ForecastError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sales_math::stats::mean;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Loss minimized by the booster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostingObjective {
    SquaredError,
}

/// Boosted ensemble hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Number of boosting rounds (trees)
    pub n_rounds: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// L2 penalty on leaf values
    pub l2_regularization: f64,
    /// Minimum samples required in a leaf node
    pub min_samples_leaf: usize,
    pub objective: BoostingObjective,
    /// Random seed
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_rounds: 250,
            max_depth: 6,
            learning_rate: 0.05,
            l2_regularization: 1.0,
            min_samples_leaf: 1,
            objective: BoostingObjective::SquaredError,
            seed: 42,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_rounds == 0 {
            return Err(ForecastError::ConfigError(
                "boosted.n_rounds must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::ConfigError(
                "boosted.max_depth must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ForecastError::ConfigError(
                "boosted.learning_rate must be in (0, 1]".to_string(),
            ));
        }
        if !(self.l2_regularization >= 0.0 && self.l2_regularization.is_finite()) {
            return Err(ForecastError::ConfigError(
                "boosted.l2_regularization must be a non-negative number".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::ConfigError(
                "boosted.min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: Some(self.max_depth),
            min_samples_split: 2,
            min_samples_leaf: self.min_samples_leaf,
            max_features: None,
            l2_regularization: self.l2_regularization,
        }
    }
}

/// Untrained boosted ensemble
#[derive(Debug, Clone)]
pub struct BoostedTrees {
    name: String,
    params: BoostingParams,
}

/// Trained boosted ensemble
#[derive(Debug, Clone)]
pub struct FittedBoosting {
    name: String,
    n_features: usize,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedTrees {
    pub fn new(params: BoostingParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: format!(
                "Boosted Trees (rounds={}, depth={}, eta={})",
                params.n_rounds, params.max_depth, params.learning_rate
            ),
            params,
        })
    }
}

impl DemandModel for BoostedTrees {
    type Fitted = FittedBoosting;

    fn fit(&self, data: &TrainingSet) -> Result<Self::Fitted> {
        let labels = data.labels();
        let base_score = mean(labels)?;
        let tree_params = self.params.tree_params();
        let indices: Vec<usize> = (0..data.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);

        debug!(
            rounds = self.params.n_rounds,
            samples = data.n_samples(),
            base_score,
            "Fitting boosted trees"
        );

        let mut predictions = vec![base_score; labels.len()];
        let mut trees = Vec::with_capacity(self.params.n_rounds);
        for _ in 0..self.params.n_rounds {
            let residuals: Vec<f64> = labels
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();

            let tree = RegressionTree::fit(
                data.features(),
                &residuals,
                &indices,
                &tree_params,
                &mut rng,
            );
            for (pred, row) in predictions.iter_mut().zip(data.features()) {
                *pred += self.params.learning_rate * tree.predict_one(row);
            }
            trees.push(tree);
        }

        Ok(FittedBoosting {
            name: self.name.clone(),
            n_features: data.n_features(),
            base_score,
            learning_rate: self.params.learning_rate,
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedBoosting {
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        self.base_score
            + self.learning_rate * self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>()
    }
}

impl FittedModel for FittedBoosting {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        check_rows(rows, self.n_features)?;
        Ok(rows.iter().map(|row| self.predict_one(row)).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
