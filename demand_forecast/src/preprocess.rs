//! Turning enhanced records into model matrices
//!
//! The [`Preprocessor`] is fitted on the training window only. Target rows
//! go through exactly the same column layout: a product never seen in
//! training gets an all-zero indicator block instead of being rejected.

use crate::error::Result;
use crate::models::TrainingSet;
use crate::records::EnhancedWeeklyRecord;
use std::collections::BTreeSet;

/// Numeric feature columns, in matrix order
pub const NUMERIC_FEATURES: [&str; 8] = [
    "Price_Bought",
    "Price_Sold",
    "Quantity_Bought",
    "Discount_Rate",
    "CAGR_Units_Sold",
    "Price_Elasticity",
    "Promo_Flag",
    "Stockout_Flag",
];

/// Categorical column expanded into indicators
pub const CATEGORICAL_FEATURE: &str = "Product_Name";

/// Label column
pub const LABEL: &str = "Quantity_Sold";

/// Value substituted for missing numeric features
pub const FILL_VALUE: f64 = 0.0;

/// Column layout learned from a training window
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    categories: Vec<String>,
}

impl Preprocessor {
    /// Learn the product categories of the training rows (sorted)
    pub fn fit(training: &[EnhancedWeeklyRecord]) -> Self {
        let categories: BTreeSet<&str> = training
            .iter()
            .map(|r| r.product_name.as_str())
            .collect();

        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    /// Product categories with an indicator column
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Total number of matrix columns
    pub fn n_features(&self) -> usize {
        NUMERIC_FEATURES.len() + self.categories.len()
    }

    /// Column names in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        NUMERIC_FEATURES
            .iter()
            .map(|name| name.to_string())
            .chain(
                self.categories
                    .iter()
                    .map(|c| format!("{}_{}", CATEGORICAL_FEATURE, c)),
            )
            .collect()
    }

    /// Matrix rows for the given records
    pub fn transform(&self, rows: &[EnhancedWeeklyRecord]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_one(r)).collect()
    }

    fn transform_one(&self, record: &EnhancedWeeklyRecord) -> Vec<f64> {
        let numeric = [
            Some(record.price_bought),
            Some(record.price_sold),
            Some(record.quantity_bought),
            Some(record.discount_rate),
            record.cagr_units_sold,
            record.price_elasticity,
            Some(f64::from(record.promo_flag)),
            Some(f64::from(record.stockout_flag)),
        ];

        let mut row = Vec::with_capacity(self.n_features());
        row.extend(numeric.into_iter().map(impute));
        let position = self
            .categories
            .binary_search_by(|c| c.as_str().cmp(record.product_name.as_str()))
            .ok();
        row.extend((0..self.categories.len()).map(|i| if Some(i) == position { 1.0 } else { 0.0 }));
        row
    }

    /// Training matrix and labels for the window rows
    pub fn training_set(&self, training: &[EnhancedWeeklyRecord]) -> Result<TrainingSet> {
        TrainingSet::new(
            self.transform(training),
            training.iter().map(|r| r.quantity_sold).collect(),
            self.feature_names(),
        )
    }
}

/// Missing values and NaN are both treated as missing.
///
/// Infinite values are kept; the models reject them.
fn impute(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => FILL_VALUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(product: &str, week: u32, cagr: Option<f64>) -> EnhancedWeeklyRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        EnhancedWeeklyRecord {
            week,
            product_name: product.to_string(),
            price_bought: 1.0,
            quantity_bought: 50.0,
            price_sold: 1.2,
            quantity_sold: 40.0,
            start_date: date,
            end_date: date,
            discount_rate: 0.2,
            promo_flag: 1,
            stockout_flag: 0,
            qty_base: 40.0,
            week_index: week,
            cagr_units_sold: cagr,
            lag_qty: None,
            lag_price: None,
            price_elasticity: None,
        }
    }

    #[test]
    fn test_categories_sorted_and_named() {
        let pre = Preprocessor::fit(&[
            record("Milk", 1, None),
            record("Bread", 1, None),
            record("Milk", 2, Some(0.1)),
        ]);
        assert_eq!(pre.categories(), &["Bread".to_string(), "Milk".to_string()]);
        assert_eq!(pre.n_features(), 10);
        assert_eq!(pre.feature_names()[8], "Product_Name_Bread");
        assert_eq!(pre.feature_names()[9], "Product_Name_Milk");
    }

    #[test]
    fn test_missing_values_are_zero() {
        let pre = Preprocessor::fit(&[record("Milk", 1, None)]);
        let rows = pre.transform(&[record("Milk", 1, None), record("Milk", 2, Some(f64::NAN))]);
        assert_eq!(
            rows[0],
            vec![1.0, 1.2, 50.0, 0.2, 0.0, 0.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(rows[1][4], 0.0);
    }

    #[test]
    fn test_unseen_product_gets_zero_indicators() {
        let pre = Preprocessor::fit(&[record("Milk", 1, None), record("Bread", 1, None)]);
        let rows = pre.transform(&[record("Cheese", 4, Some(0.3))]);
        assert_eq!(&rows[0][8..], &[0.0, 0.0]);
        assert_eq!(rows[0][4], 0.3);
    }

    #[test]
    fn test_infinite_discount_fails_training() {
        let mut bad = record("Milk", 1, None);
        bad.discount_rate = f64::INFINITY;
        let pre = Preprocessor::fit(&[bad.clone()]);
        assert!(pre.training_set(&[bad]).is_err());
    }
}
