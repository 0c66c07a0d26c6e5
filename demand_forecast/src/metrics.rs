//! Metrics for evaluating forecast accuracy once actual sales are known

use crate::error::{ForecastError, Result};
use crate::records::{EnhancedWeeklyRecord, PredictionResult};
use serde::Serialize;
use std::collections::HashMap;

/// Compare predictions with the actual Quantity_Sold of the target week.
///
/// Predictions and actual rows are matched by product name; every
/// prediction needs exactly one actual row.
pub fn evaluate_predictions(
    predictions: &[PredictionResult],
    actual: &[EnhancedWeeklyRecord],
) -> Result<ForecastAccuracy> {
    if predictions.is_empty() || predictions.len() != actual.len() {
        return Err(ForecastError::InvalidParameter(
            "Predictions and actual rows must have the same non-zero length".to_string(),
        ));
    }

    let mut sold: HashMap<&str, f64> = HashMap::with_capacity(actual.len());
    for record in actual {
        if sold
            .insert(record.product_name.as_str(), record.quantity_sold)
            .is_some()
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Product {} appears more than once in the actual rows",
                record.product_name
            )));
        }
    }

    let mut forecast = Vec::with_capacity(predictions.len());
    let mut observed = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        let actual_qty = sold.get(prediction.product_name.as_str()).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "No actual sales for product {}",
                prediction.product_name
            ))
        })?;
        forecast.push(prediction.predicted_qty as f64);
        observed.push(*actual_qty);
    }

    Ok(ForecastAccuracy::from_series(&forecast, &observed))
}

/// Accuracy of one week's forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Number of products compared
    pub n: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (zero actuals skipped)
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl ForecastAccuracy {
    fn from_series(forecast: &[f64], actual: &[f64]) -> Self {
        let n = forecast.len() as f64;
        let errors: Vec<f64> = forecast
            .iter()
            .zip(actual)
            .map(|(f, a)| a - f)
            .collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

        let mape = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| **a != 0.0)
            .map(|(a, e)| e.abs() / a.abs() * 100.0)
            .sum::<f64>()
            / n;

        let smape = actual
            .iter()
            .zip(forecast)
            .map(|(a, f)| {
                let denom = a.abs() + f.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    200.0 * (a - f).abs() / denom
                }
            })
            .sum::<f64>()
            / n;

        Self {
            n: forecast.len(),
            mae,
            mse,
            rmse: mse.sqrt(),
            mape,
            smape,
        }
    }
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy ({} products):", self.n)?;
        writeln!(f, "  MAE:     {:.4}", self.mae)?;
        writeln!(f, "  MSE:     {:.4}", self.mse)?;
        writeln!(f, "  RMSE:    {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:    {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE:   {:.4}%", self.smape)?;
        Ok(())
    }
}
