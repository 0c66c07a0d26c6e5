//! Bagged regression forest
//!
//! Each tree is grown on its own bootstrap sample. Trees are built in
//! parallel, but every tree owns a generator seeded from `seed + index` and
//! the trees are collected in index order, so the fitted forest does not
//! depend on thread scheduling.

use super::tree::{RegressionTree, TreeParams};
use super::{check_rows, DemandModel, FittedModel, TrainingSet};
use crate::error::{ForecastError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bagged forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ForecastError::ConfigError(
                "bagged.n_trees must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::ConfigError(
                "bagged.min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::ConfigError(
                "bagged.min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(ForecastError::ConfigError(
                "bagged.max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            l2_regularization: 0.0,
        }
    }
}

/// Untrained bagged forest
#[derive(Debug, Clone)]
pub struct BaggedForest {
    name: String,
    params: ForestParams,
}

/// Trained bagged forest
#[derive(Debug, Clone)]
pub struct FittedForest {
    name: String,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl BaggedForest {
    pub fn new(params: ForestParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: format!("Bagged Forest (trees={})", params.n_trees),
            params,
        })
    }
}

impl DemandModel for BaggedForest {
    type Fitted = FittedForest;

    fn fit(&self, data: &TrainingSet) -> Result<Self::Fitted> {
        let n = data.n_samples();
        let tree_params = self.params.tree_params();
        debug!(
            trees = self.params.n_trees,
            samples = n,
            features = data.n_features(),
            "Fitting bagged forest"
        );

        let trees: Vec<RegressionTree> = (0..self.params.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed.wrapping_add(i as u64));
                let indices: Vec<usize> = if self.params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(
                    data.features(),
                    data.labels(),
                    &indices,
                    &tree_params,
                    &mut rng,
                )
            })
            .collect();

        Ok(FittedForest {
            name: self.name.clone(),
            n_features: data.n_features(),
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Average of the tree predictions for one row
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / self.trees.len() as f64
    }
}

impl FittedModel for FittedForest {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        check_rows(rows, self.n_features)?;
        Ok(rows.iter().map(|row| self.predict_one(row)).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_set() -> TrainingSet {
        let features: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let labels: Vec<f64> = (0..30).map(|i| 3.0 * i as f64 + 5.0).collect();
        TrainingSet::new(features, labels, vec!["x".to_string(), "m".to_string()]).unwrap()
    }

    #[test]
    fn test_forest_is_deterministic() {
        let data = linear_set();
        let forest = BaggedForest::new(ForestParams {
            n_trees: 25,
            ..Default::default()
        })
        .unwrap();

        let rows = vec![vec![3.5, 1.0], vec![12.0, 0.0], vec![40.0, 2.0]];
        let first = forest.fit(&data).unwrap().predict(&rows).unwrap();
        let second = forest.fit(&data).unwrap().predict(&rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_forest_tracks_trend() {
        let data = linear_set();
        let fitted = BaggedForest::new(ForestParams::default())
            .unwrap()
            .fit(&data)
            .unwrap();
        assert_eq!(fitted.n_trees(), 200);

        let low = fitted.predict_one(&[2.0, 2.0]);
        let high = fitted.predict_one(&[27.0, 3.0]);
        assert!(low < 30.0, "low prediction {}", low);
        assert!(high > 70.0, "high prediction {}", high);
    }

    #[test]
    fn test_without_bootstrap_matches_single_tree() {
        let data = linear_set();
        let fitted = BaggedForest::new(ForestParams {
            n_trees: 3,
            bootstrap: false,
            ..Default::default()
        })
        .unwrap()
        .fit(&data)
        .unwrap();
        // unlimited depth on the full sample reproduces the labels
        assert_eq!(fitted.predict_one(&[10.0, 2.0]), 35.0);
    }

    #[test]
    fn test_rejects_bad_params_and_rows() {
        assert!(BaggedForest::new(ForestParams {
            n_trees: 0,
            ..Default::default()
        })
        .is_err());

        let fitted = BaggedForest::new(ForestParams {
            n_trees: 2,
            ..Default::default()
        })
        .unwrap()
        .fit(&linear_set())
        .unwrap();
        assert!(fitted.predict(&[vec![1.0]]).is_err());
        assert!(fitted.predict(&[vec![1.0, f64::NAN]]).is_err());
    }
}
