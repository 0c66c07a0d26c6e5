//! Feature derivation for weekly sales
//!
//! [`FeatureEngine::enhance`] turns the full raw history into the enhanced
//! table. It is a pure function of its input: the same raw rows always give
//! the same enhanced rows, in `(Product_Name, Week)` order.

use crate::config::ForecastConfig;
use crate::records::{EnhancedWeeklyRecord, RawWeeklyRecord};
use sales_math::growth::{compound_growth, discount_rate, elasticity, pct_change};
use std::collections::BTreeMap;
use tracing::debug;

/// Derives discount, promotion, stockout, growth, lag and elasticity fields
#[derive(Debug, Clone)]
pub struct FeatureEngine {
    promo_threshold: f64,
}

impl FeatureEngine {
    /// Create an engine using the configured promotion threshold
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            promo_threshold: config.promo_threshold,
        }
    }

    /// Enhance the complete raw history.
    ///
    /// Output has exactly one record per input record. Records of a product
    /// are ranked by ascending week; the first one carries no growth, lag or
    /// elasticity values.
    pub fn enhance(&self, raw: &[RawWeeklyRecord]) -> Vec<EnhancedWeeklyRecord> {
        let mut by_product: BTreeMap<&str, Vec<&RawWeeklyRecord>> = BTreeMap::new();
        for record in raw {
            by_product
                .entry(record.product_name.as_str())
                .or_default()
                .push(record);
        }

        let mut enhanced = Vec::with_capacity(raw.len());
        for (product, mut history) in by_product {
            // stable, so duplicate weeks keep their arrival order
            history.sort_by_key(|r| r.week);
            debug!(product, weeks = history.len(), "Enhancing product history");

            let qty_base = history[0].quantity_sold;
            let mut previous: Option<&RawWeeklyRecord> = None;

            for (position, record) in history.into_iter().enumerate() {
                let week_index = position as u32 + 1;
                enhanced.push(self.derive(record, qty_base, week_index, previous));
                previous = Some(record);
            }
        }

        enhanced
    }

    fn derive(
        &self,
        record: &RawWeeklyRecord,
        qty_base: f64,
        week_index: u32,
        previous: Option<&RawWeeklyRecord>,
    ) -> EnhancedWeeklyRecord {
        let discount = discount_rate(record.price_bought, record.price_sold);
        let promo_flag = u8::from(discount >= self.promo_threshold);
        let stockout_flag = u8::from(record.quantity_sold == record.quantity_bought);

        let cagr_units_sold = compound_growth(record.quantity_sold, qty_base, week_index - 1);
        let lag_qty = previous.map(|p| p.quantity_sold);
        let lag_price = previous.map(|p| p.price_sold);
        let pct_qty = lag_qty.map(|lag| pct_change(record.quantity_sold, lag));
        let pct_price = lag_price.map(|lag| pct_change(record.price_sold, lag));
        let price_elasticity = elasticity(pct_qty, pct_price);

        EnhancedWeeklyRecord {
            week: record.week,
            product_name: record.product_name.clone(),
            price_bought: record.price_bought,
            quantity_bought: record.quantity_bought,
            price_sold: record.price_sold,
            quantity_sold: record.quantity_sold,
            start_date: record.start_date,
            end_date: record.end_date,
            discount_rate: discount,
            promo_flag,
            stockout_flag,
            qty_base,
            week_index,
            cagr_units_sold,
            lag_qty,
            lag_price,
            price_elasticity,
        }
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use rstest::rstest;

    fn raw(
        product: &str,
        week: u32,
        price_bought: f64,
        qty_bought: f64,
        price_sold: f64,
        qty_sold: f64,
    ) -> RawWeeklyRecord {
        let start =
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::weeks(i64::from(week) - 1);
        RawWeeklyRecord {
            week,
            product_name: product.to_string(),
            price_bought,
            quantity_bought: qty_bought,
            price_sold,
            quantity_sold: qty_sold,
            start_date: start,
            end_date: start + Duration::days(6),
        }
    }

    #[test]
    fn test_milk_growth_chain() {
        let engine = FeatureEngine::default();
        let rows = vec![
            raw("Milk", 3, 1.0, 150.0, 1.2, 121.0),
            raw("Milk", 1, 1.0, 150.0, 1.2, 100.0),
            raw("Milk", 2, 1.0, 150.0, 1.2, 110.0),
        ];

        let out = engine.enhance(&rows);
        assert_eq!(out.len(), 3);
        assert_eq!(out.iter().map(|r| r.week).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(out.iter().map(|r| r.week_index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(out.iter().all(|r| r.qty_base == 100.0));

        assert_eq!(out[0].cagr_units_sold, None);
        assert_relative_eq!(out[1].cagr_units_sold.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(out[2].cagr_units_sold.unwrap(), 0.1, epsilon = 1e-12);

        assert_eq!(out[2].lag_qty, Some(110.0));
        assert_eq!(out[2].lag_price, Some(1.2));
    }

    #[rstest]
    #[case(10.0, 11.5, 1)]
    #[case(10.0, 10.5, 0)]
    #[case(10.0, 11.0, 1)]
    #[case(10.0, 8.0, 0)]
    fn test_promo_flag(#[case] bought: f64, #[case] sold: f64, #[case] expected: u8) {
        let out = FeatureEngine::default().enhance(&[raw("Tea", 1, bought, 10.0, sold, 5.0)]);
        assert_eq!(out[0].promo_flag, expected);
    }

    #[test]
    fn test_stockout_flag() {
        let out = FeatureEngine::default().enhance(&[
            raw("Eggs", 1, 2.0, 60.0, 2.4, 60.0),
            raw("Eggs", 2, 2.0, 60.0, 2.4, 59.0),
        ]);
        assert_eq!(out[0].stockout_flag, 1);
        assert_eq!(out[1].stockout_flag, 0);
    }

    #[test]
    fn test_zero_price_bought_propagates() {
        let out = FeatureEngine::default().enhance(&[raw("Sample", 1, 0.0, 5.0, 1.0, 5.0)]);
        assert!(out[0].discount_rate.is_infinite());
        assert_eq!(out[0].promo_flag, 1);
    }

    #[test]
    fn test_elasticity_with_zero_lags() {
        // last week sold nothing at price zero: both denominators fall back to 1
        let out = FeatureEngine::default().enhance(&[
            raw("Gum", 1, 0.5, 10.0, 0.0, 0.0),
            raw("Gum", 2, 0.5, 10.0, 0.6, 4.0),
        ]);
        assert_relative_eq!(out[1].price_elasticity.unwrap(), 4.0 / 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_products_are_independent() {
        let out = FeatureEngine::default().enhance(&[
            raw("Milk", 2, 1.0, 100.0, 1.2, 90.0),
            raw("Bread", 2, 2.0, 40.0, 2.5, 30.0),
            raw("Milk", 1, 1.0, 100.0, 1.2, 80.0),
        ]);

        assert_eq!(out[0].product_name, "Bread");
        assert_eq!(out[0].week_index, 1);
        assert_eq!(out[0].lag_qty, None);
        assert_eq!(out[2].product_name, "Milk");
        assert_eq!(out[2].week_index, 2);
        assert_eq!(out[2].lag_qty, Some(80.0));
    }
}
