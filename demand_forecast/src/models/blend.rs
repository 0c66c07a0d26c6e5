//! Two-model blend
//!
//! Both members are fitted on the same training set. At prediction time each
//! member's output is rounded to whole units on its own, and the blended
//! quantity is the rounded mean of those two integers. All rounding is
//! half-to-even.

use super::{DemandModel, FittedModel, TrainingSet};
use crate::error::{ForecastError, Result};
use sales_math::stats::{round_half_even, round_to_units};
use tracing::debug;

/// Per-row outputs of a fitted blend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendedPrediction {
    /// First member's rounded prediction
    pub first: i64,
    /// Second member's rounded prediction
    pub second: i64,
    /// Rounded mean of the two
    pub blended: i64,
}

impl BlendedPrediction {
    /// Combine two raw member predictions
    pub fn combine(first: f64, second: f64) -> Result<Self> {
        let first = round_to_units(first)
            .map_err(|e| ForecastError::TrainingError(format!("first model: {}", e)))?;
        let second = round_to_units(second)
            .map_err(|e| ForecastError::TrainingError(format!("second model: {}", e)))?;
        // average in f64 so two large members cannot overflow the sum
        let blended = round_half_even((first as f64 + second as f64) / 2.0) as i64;

        Ok(Self {
            first,
            second,
            blended,
        })
    }
}

/// Untrained pair of models
#[derive(Debug, Clone)]
pub struct BlendedModel<A, B> {
    name: String,
    first: A,
    second: B,
}

/// Fitted pair of models
#[derive(Debug, Clone)]
pub struct FittedBlend<FA, FB> {
    name: String,
    first: FA,
    second: FB,
}

impl<A: DemandModel, B: DemandModel> BlendedModel<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            name: format!("Blend({} + {})", first.name(), second.name()),
            first,
            second,
        }
    }
}

impl<A: DemandModel, B: DemandModel> DemandModel for BlendedModel<A, B> {
    type Fitted = FittedBlend<A::Fitted, B::Fitted>;

    fn fit(&self, data: &TrainingSet) -> Result<Self::Fitted> {
        // members are independent; fit them side by side
        let (first, second) = rayon::join(|| self.first.fit(data), || self.second.fit(data));
        let first = first?;
        let second = second?;
        debug!(first = first.name(), second = second.name(), "Fitted blend members");

        Ok(FittedBlend {
            name: self.name.clone(),
            first,
            second,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<FA: FittedModel, FB: FittedModel> FittedBlend<FA, FB> {
    /// Predict with both members and blend, keeping the member outputs
    pub fn predict_components(&self, rows: &[Vec<f64>]) -> Result<Vec<BlendedPrediction>> {
        let first = self.first.predict(rows)?;
        let second = self.second.predict(rows)?;
        if first.len() != rows.len() || second.len() != rows.len() {
            return Err(ForecastError::TrainingError(format!(
                "members returned {} and {} predictions for {} rows",
                first.len(),
                second.len(),
                rows.len()
            )));
        }

        first
            .into_iter()
            .zip(second)
            .map(|(a, b)| BlendedPrediction::combine(a, b))
            .collect()
    }
}

impl<FA: FittedModel, FB: FittedModel> FittedModel for FittedBlend<FA, FB> {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(self
            .predict_components(rows)?
            .into_iter()
            .map(|p| p.blended as f64)
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
