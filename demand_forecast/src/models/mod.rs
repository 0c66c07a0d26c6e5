//! Regression models for weekly demand
//!
//! A [`DemandModel`] is an untrained configuration; fitting it on a
//! [`TrainingSet`] gives a [`FittedModel`] that predicts quantities for new
//! rows. The forecaster combines two models through [`blend::BlendedModel`].

use crate::error::{ForecastError, Result};
use std::fmt::Debug;

pub mod blend;
pub mod boosting;
pub mod forest;
pub mod tree;

/// Feature matrix and labels a model is fitted on
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
    feature_names: Vec<String>,
}

impl TrainingSet {
    /// Build a training set, rejecting matrices no model can be fitted on
    pub fn new(
        features: Vec<Vec<f64>>,
        labels: Vec<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(ForecastError::TrainingError(
                "Training matrix has no rows".to_string(),
            ));
        }
        if features.len() != labels.len() {
            return Err(ForecastError::TrainingError(format!(
                "Training matrix has {} rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if feature_names.is_empty() {
            return Err(ForecastError::TrainingError(
                "Training matrix has no feature columns".to_string(),
            ));
        }
        check_rows(&features, feature_names.len())?;
        if let Some(pos) = labels.iter().position(|l| !l.is_finite()) {
            return Err(ForecastError::TrainingError(format!(
                "Label in row {} is not finite",
                pos
            )));
        }

        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Reject rows of the wrong width or with non-finite values
pub fn check_rows(rows: &[Vec<f64>], n_features: usize) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForecastError::TrainingError(format!(
                "Row {} has {} features, expected {}",
                i,
                row.len(),
                n_features
            )));
        }
        if let Some(col) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::TrainingError(format!(
                "Row {} has a non-finite value in feature {}",
                i, col
            )));
        }
    }
    Ok(())
}

/// Trained model that can predict quantities
pub trait FittedModel: Debug + Send + Sync {
    /// Predict one value per row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Model configuration that can be fitted on a training set
pub trait DemandModel: Debug + Send + Sync {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model on a training set
    fn fit(&self, data: &TrainingSet) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_training_set_rejects_degenerate_input() {
        assert!(TrainingSet::new(vec![], vec![], names(1)).is_err());
        assert!(TrainingSet::new(vec![vec![1.0]], vec![1.0, 2.0], names(1)).is_err());
        assert!(TrainingSet::new(vec![vec![1.0, 2.0]], vec![1.0], names(1)).is_err());
        assert!(TrainingSet::new(vec![vec![f64::INFINITY]], vec![1.0], names(1)).is_err());
        assert!(TrainingSet::new(vec![vec![1.0]], vec![f64::NAN], names(1)).is_err());
        assert!(TrainingSet::new(vec![vec![]], vec![1.0], vec![]).is_err());
    }

    #[test]
    fn test_training_set_accessors() {
        let set = TrainingSet::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![5.0, 6.0], names(2))
            .unwrap();
        assert_eq!(set.n_samples(), 2);
        assert_eq!(set.n_features(), 2);
        assert_eq!(set.labels(), &[5.0, 6.0]);
        assert_eq!(set.feature_names()[1], "f1");
    }
}
