//! Weekly demand forecasting
//!
//! For a target week `W` the engine trains on the trailing window of
//! enhanced weeks before `W`, then predicts every row stored for `W`.
//! Each call is independent: nothing learned survives the call.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::blend::BlendedModel;
use crate::models::boosting::BoostedTrees;
use crate::models::forest::BaggedForest;
use crate::models::{DemandModel, FittedModel};
use crate::preprocess::Preprocessor;
use crate::records::{EnhancedWeeklyRecord, PredictionResult};
use crate::store::SalesStore;
use std::ops::RangeInclusive;
use tracing::{debug, info};

/// Forecaster blending two regressors
#[derive(Debug, Clone)]
pub struct ForecastEngine<A = BaggedForest, B = BoostedTrees> {
    window_size: u32,
    model: BlendedModel<A, B>,
}

impl ForecastEngine {
    /// Engine with the bagged forest and boosted trees from `config`
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        config.validate()?;
        let forest = BaggedForest::new(config.bagged.clone())?;
        let boosted = BoostedTrees::new(config.boosted.clone())?;
        Ok(Self::with_models(config, forest, boosted))
    }
}

impl<A: DemandModel, B: DemandModel> ForecastEngine<A, B> {
    /// Engine blending two caller-supplied models
    pub fn with_models(config: &ForecastConfig, first: A, second: B) -> Self {
        Self {
            window_size: config.window_size,
            model: BlendedModel::new(first, second),
        }
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Weeks used to train a forecast of `target_week`
    pub fn training_window(&self, target_week: u32) -> Result<RangeInclusive<u32>> {
        if target_week <= 1 {
            return Err(ForecastError::InsufficientHistory { target_week });
        }
        let start = target_week.saturating_sub(self.window_size).max(1);
        Ok(start..=target_week - 1)
    }

    /// Forecast every product stored for `target_week`
    pub fn forecast<S: SalesStore + ?Sized>(
        &self,
        store: &S,
        target_week: u32,
    ) -> Result<Vec<PredictionResult>> {
        let window = self.training_window(target_week)?;
        debug!(
            target_week,
            start = *window.start(),
            end = *window.end(),
            "Fetching forecast inputs"
        );

        let training = store.enhanced_in_weeks(window)?;
        let target = store.enhanced_in_weeks(target_week..=target_week)?;
        self.forecast_from_records(&training, &target, target_week)
    }

    /// Forecast from already fetched training and target rows
    pub fn forecast_from_records(
        &self,
        training: &[EnhancedWeeklyRecord],
        target: &[EnhancedWeeklyRecord],
        target_week: u32,
    ) -> Result<Vec<PredictionResult>> {
        if target.is_empty() {
            return Err(ForecastError::NoTargetData(target_week));
        }
        if training.is_empty() {
            return Err(ForecastError::InsufficientHistory { target_week });
        }

        let preprocessor = Preprocessor::fit(training);
        let data = preprocessor.training_set(training)?;
        let fitted = self.model.fit(&data)?;

        let rows = preprocessor.transform(target);
        let predictions = fitted.predict(&rows)?;

        info!(
            target_week,
            training_rows = training.len(),
            products = target.len(),
            model = fitted.name(),
            "Forecast complete"
        );

        Ok(target
            .iter()
            .zip(predictions)
            .map(|(record, predicted)| PredictionResult {
                product_name: record.product_name.clone(),
                quantity_bought: record.quantity_bought,
                predicted_qty: predicted as i64,
            })
            .collect())
    }
}
